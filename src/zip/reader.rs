//! Read-back of in-memory ZIP archives.
//!
//! Used to list archives and to verify what the encoder produced. Only the
//! single-disk, non-ZIP64 layout is understood, and only STORED entries can
//! be read; other methods are listed but refused on read.
//!
//! ## Parsing Strategy
//!
//! 1. Find the End of Central Directory (EOCD) at the buffer's end
//! 2. Walk the Central Directory to get metadata for all entries
//! 3. For reads, resolve each entry's Local File Header to locate its data

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use anyhow::{Result, bail};

use super::crc32::crc32;
use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: usize = 65535;

/// Reader over a complete archive held in memory.
pub struct ArchiveReader<'a> {
    data: &'a [u8],
}

impl<'a> ArchiveReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Handles both the common case (no comment) and archives with a
    /// trailing comment by searching backwards for the signature.
    ///
    /// # Returns
    ///
    /// A tuple of (EOCD record, offset of EOCD in the buffer).
    pub fn find_eocd(&self) -> Result<(EndOfCentralDirectory, usize)> {
        let size = self.data.len();
        if size < EndOfCentralDirectory::SIZE {
            bail!("Not a valid ZIP file");
        }

        // Fast path: no comment, EOCD is the last 22 bytes.
        let offset = size - EndOfCentralDirectory::SIZE;
        let tail = &self.data[offset..];
        if &tail[0..4] == EndOfCentralDirectory::SIGNATURE && tail[20..22] == [0u8, 0u8] {
            return Ok((EndOfCentralDirectory::from_bytes(tail)?, offset));
        }

        // Search backwards; the comment length must account for every
        // remaining byte or the signature is part of some other data.
        let search_start = size.saturating_sub(MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE);
        let buf = &self.data[search_start..];

        for i in (0..=buf.len() - EndOfCentralDirectory::SIZE).rev() {
            if &buf[i..i + 4] == EndOfCentralDirectory::SIGNATURE {
                let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;
                if comment_len == buf.len() - i - EndOfCentralDirectory::SIZE {
                    let eocd = EndOfCentralDirectory::from_bytes(&buf[i..])?;
                    return Ok((eocd, search_start + i));
                }
            }
        }

        bail!("Not a valid ZIP file")
    }

    /// List all entries recorded in the Central Directory.
    pub fn list_files(&self) -> Result<Vec<ZipFileEntry>> {
        let (eocd, eocd_offset) = self.find_eocd()?;
        if eocd.has_saturated_fields() && self.has_zip64_locator(eocd_offset) {
            bail!("ZIP64 archives are not supported");
        }

        let cd_start = eocd.cd_offset as usize;
        let cd_end = cd_start + eocd.cd_size as usize;
        if cd_end > eocd_offset {
            bail!("Central Directory extends past the End of Central Directory");
        }

        let mut cursor = Cursor::new(&self.data[cd_start..cd_end]);
        let mut entries = Vec::with_capacity(eocd.total_entries as usize);
        for _ in 0..eocd.total_entries {
            entries.push(parse_cdfh(&mut cursor)?);
        }

        Ok(entries)
    }

    fn has_zip64_locator(&self, eocd_offset: usize) -> bool {
        eocd_offset
            .checked_sub(EndOfCentralDirectory::ZIP64_LOCATOR_SIZE)
            .and_then(|start| self.data.get(start..start + 4))
            .is_some_and(|sig| sig == EndOfCentralDirectory::ZIP64_LOCATOR_SIGNATURE)
    }

    /// Offset of the first data byte of `entry`.
    ///
    /// The Local File Header's name and extra field lengths can differ from
    /// the Central Directory's, so they are read from the local header.
    pub fn data_offset(&self, entry: &ZipFileEntry) -> Result<usize> {
        let start = entry.lfh_offset as usize;
        let Some(header) = self.data.get(start..) else {
            bail!("Local File Header offset out of range");
        };
        let (local, extra_len) = LocalFileHeader::from_bytes(header)?;
        Ok(start + local.encoded_len() + extra_len)
    }

    /// Borrow the data of a STORED entry after checking its CRC-32.
    pub fn read(&self, entry: &ZipFileEntry) -> Result<&'a [u8]> {
        if entry.compression_method != CompressionMethod::Stored {
            bail!(
                "Unsupported compression method: {} (only STORED/uncompressed is supported)",
                entry.compression_method.as_u16()
            );
        }

        let start = self.data_offset(entry)?;
        let end = start + entry.uncompressed_size as usize;
        let Some(data) = self.data.get(start..end) else {
            bail!("Entry data for {} is truncated", entry.file_name);
        };

        let actual = crc32(data);
        if actual != entry.crc32 {
            bail!(
                "CRC mismatch for {}: expected {:08x}, got {:08x}",
                entry.file_name,
                entry.crc32,
                actual
            );
        }

        Ok(data)
    }

    /// Read every entry, failing on the first one that does not check out.
    ///
    /// Returns the number of entries verified.
    pub fn verify(&self) -> Result<usize> {
        let entries = self.list_files()?;
        for entry in &entries {
            self.read(entry)?;
        }
        Ok(entries.len())
    }
}

/// Parse one Central Directory File Header, leaving the cursor after it.
fn parse_cdfh(cursor: &mut Cursor<&[u8]>) -> Result<ZipFileEntry> {
    let mut sig = [0u8; 4];
    cursor.read_exact(&mut sig)?;
    if sig != CentralDirectoryHeader::SIGNATURE {
        bail!("Invalid Central Directory File Header");
    }

    let _version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let _flags = cursor.read_u16::<LittleEndian>()?;
    let compression_method = cursor.read_u16::<LittleEndian>()?;
    let last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let crc32 = cursor.read_u32::<LittleEndian>()?;
    let compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let file_name_length = cursor.read_u16::<LittleEndian>()?;
    let extra_field_length = cursor.read_u16::<LittleEndian>()?;
    let file_comment_length = cursor.read_u16::<LittleEndian>()?;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let _external_attrs = cursor.read_u32::<LittleEndian>()?;
    let lfh_offset = cursor.read_u32::<LittleEndian>()? as u64;

    let mut file_name_bytes = vec![0u8; file_name_length as usize];
    cursor.read_exact(&mut file_name_bytes)?;
    // Use lossy conversion to handle non-UTF8 filenames gracefully
    let file_name = String::from_utf8_lossy(&file_name_bytes).to_string();
    let is_directory = file_name.ends_with('/');

    // Skip extra field and comment
    cursor.set_position(
        cursor.position() + extra_field_length as u64 + file_comment_length as u64,
    );

    Ok(ZipFileEntry {
        file_name,
        compression_method: CompressionMethod::from_u16(compression_method),
        compressed_size,
        uncompressed_size,
        crc32,
        lfh_offset,
        last_mod_time,
        last_mod_date,
        is_directory,
    })
}
