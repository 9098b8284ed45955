use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor, Read, Write};

use anyhow::{Result, bail};

/// ZIP "version needed to extract" / "version made by" for store-only
/// archives (1.0, MS-DOS host).
pub const VERSION_STORE: u16 = 10;

/// General purpose flag bit 11: file name is UTF-8.
pub const FLAG_UTF8: u16 = 1 << 11;

/// Fixed DOS timestamp (1980-01-01 00:00:00) so identical input always
/// produces identical archive bytes.
pub const DOS_EPOCH_TIME: u16 = 0;
pub const DOS_EPOCH_DATE: u16 = (1 << 5) | 1;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// Local File Header (LFH) - 30 bytes plus file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileHeader {
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name: Vec<u8>,
}

impl LocalFileHeader {
    pub const SIGNATURE: &'static [u8] = b"PK\x03\x04";
    pub const SIZE: usize = 30;

    /// Header for an uncompressed entry.
    pub fn stored(file_name: Vec<u8>, flags: u16, crc32: u32, size: u32) -> Self {
        Self {
            version_needed: VERSION_STORE,
            flags,
            compression_method: CompressionMethod::Stored,
            last_mod_time: DOS_EPOCH_TIME,
            last_mod_date: DOS_EPOCH_DATE,
            crc32,
            compressed_size: size,
            uncompressed_size: size,
            file_name,
        }
    }

    /// Bytes this record occupies, file name included.
    pub fn encoded_len(&self) -> usize {
        Self::SIZE + self.file_name.len()
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(Self::SIGNATURE)?;
        out.write_u16::<LittleEndian>(self.version_needed)?;
        out.write_u16::<LittleEndian>(self.flags)?;
        out.write_u16::<LittleEndian>(self.compression_method.as_u16())?;
        out.write_u16::<LittleEndian>(self.last_mod_time)?;
        out.write_u16::<LittleEndian>(self.last_mod_date)?;
        out.write_u32::<LittleEndian>(self.crc32)?;
        out.write_u32::<LittleEndian>(self.compressed_size)?;
        out.write_u32::<LittleEndian>(self.uncompressed_size)?;
        out.write_u16::<LittleEndian>(name_len(&self.file_name)?)?;
        out.write_u16::<LittleEndian>(0)?; // extra field length
        out.write_all(&self.file_name)
    }

    /// Parse the fixed part and file name. Returns the header and the
    /// length of the extra field that follows the name.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            bail!("Invalid Local File Header");
        }

        let mut cursor = Cursor::new(&data[4..]);
        let version_needed = cursor.read_u16::<LittleEndian>()?;
        let flags = cursor.read_u16::<LittleEndian>()?;
        let compression_method = CompressionMethod::from_u16(cursor.read_u16::<LittleEndian>()?);
        let last_mod_time = cursor.read_u16::<LittleEndian>()?;
        let last_mod_date = cursor.read_u16::<LittleEndian>()?;
        let crc32 = cursor.read_u32::<LittleEndian>()?;
        let compressed_size = cursor.read_u32::<LittleEndian>()?;
        let uncompressed_size = cursor.read_u32::<LittleEndian>()?;
        let file_name_length = cursor.read_u16::<LittleEndian>()? as usize;
        let extra_field_length = cursor.read_u16::<LittleEndian>()? as usize;

        let mut file_name = vec![0u8; file_name_length];
        cursor.read_exact(&mut file_name)?;

        Ok((
            Self {
                version_needed,
                flags,
                compression_method,
                last_mod_time,
                last_mod_date,
                crc32,
                compressed_size,
                uncompressed_size,
                file_name,
            },
            extra_field_length,
        ))
    }
}

/// Central Directory File Header (CDFH) - 46 bytes plus file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirectoryHeader {
    pub version_made_by: u16,
    pub local: LocalFileHeader,
    pub external_attrs: u32,
    pub lfh_offset: u32,
}

impl CentralDirectoryHeader {
    pub const SIGNATURE: &'static [u8] = b"PK\x01\x02";
    pub const SIZE: usize = 46;

    /// Central record mirroring `local`, which starts at `lfh_offset`.
    pub fn for_local(local: LocalFileHeader, lfh_offset: u32) -> Self {
        Self {
            version_made_by: VERSION_STORE,
            local,
            external_attrs: 0,
            lfh_offset,
        }
    }

    pub fn encoded_len(&self) -> usize {
        Self::SIZE + self.local.file_name.len()
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let local = &self.local;
        out.write_all(Self::SIGNATURE)?;
        out.write_u16::<LittleEndian>(self.version_made_by)?;
        out.write_u16::<LittleEndian>(local.version_needed)?;
        out.write_u16::<LittleEndian>(local.flags)?;
        out.write_u16::<LittleEndian>(local.compression_method.as_u16())?;
        out.write_u16::<LittleEndian>(local.last_mod_time)?;
        out.write_u16::<LittleEndian>(local.last_mod_date)?;
        out.write_u32::<LittleEndian>(local.crc32)?;
        out.write_u32::<LittleEndian>(local.compressed_size)?;
        out.write_u32::<LittleEndian>(local.uncompressed_size)?;
        out.write_u16::<LittleEndian>(name_len(&local.file_name)?)?;
        out.write_u16::<LittleEndian>(0)?; // extra field length
        out.write_u16::<LittleEndian>(0)?; // file comment length
        out.write_u16::<LittleEndian>(0)?; // disk number start
        out.write_u16::<LittleEndian>(0)?; // internal attributes
        out.write_u32::<LittleEndian>(self.external_attrs)?;
        out.write_u32::<LittleEndian>(self.lfh_offset)?;
        out.write_all(&local.file_name)
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    /// Single-disk EOCD without a comment.
    pub fn new(entries: u16, cd_size: u32, cd_offset: u32) -> Self {
        Self {
            disk_number: 0,
            disk_with_cd: 0,
            disk_entries: entries,
            total_entries: entries,
            cd_size,
            cd_offset,
            comment_len: 0,
        }
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            bail!("Invalid End of Central Directory");
        }

        // Verify signature
        if &data[0..4] != Self::SIGNATURE {
            bail!("Invalid End of Central Directory");
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>()?,
            disk_with_cd: cursor.read_u16::<LittleEndian>()?,
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(Self::SIGNATURE)?;
        out.write_u16::<LittleEndian>(self.disk_number)?;
        out.write_u16::<LittleEndian>(self.disk_with_cd)?;
        out.write_u16::<LittleEndian>(self.disk_entries)?;
        out.write_u16::<LittleEndian>(self.total_entries)?;
        out.write_u32::<LittleEndian>(self.cd_size)?;
        out.write_u32::<LittleEndian>(self.cd_offset)?;
        out.write_u16::<LittleEndian>(self.comment_len)
    }

    /// Signature of the ZIP64 EOCD locator, which sits directly before the
    /// EOCD in ZIP64 archives.
    pub const ZIP64_LOCATOR_SIGNATURE: &'static [u8] = b"PK\x06\x07";
    pub const ZIP64_LOCATOR_SIZE: usize = 20;

    /// Whether any field is saturated. A saturated field only defers to a
    /// ZIP64 record when a ZIP64 locator is also present; 65535 entries is
    /// a legal plain count.
    pub fn has_saturated_fields(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }
}

fn name_len(name: &[u8]) -> io::Result<u16> {
    u16::try_from(name.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "file name longer than 65535 bytes"))
}

/// Parsed ZIP file entry information
#[derive(Debug, Clone)]
pub struct ZipFileEntry {
    pub file_name: String,
    pub compression_method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
    pub lfh_offset: u64,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub is_directory: bool,
}

impl ZipFileEntry {
    /// Parse modification date to (year, month, day)
    pub fn mod_date(&self) -> (u16, u8, u8) {
        let day = (self.last_mod_date & 0x1F) as u8;
        let month = ((self.last_mod_date >> 5) & 0x0F) as u8;
        let year = ((self.last_mod_date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Parse modification time to (hour, minute, second)
    pub fn mod_time(&self) -> (u8, u8, u8) {
        let second = ((self.last_mod_time & 0x1F) * 2) as u8;
        let minute = ((self.last_mod_time >> 5) & 0x3F) as u8;
        let hour = ((self.last_mod_time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }
}
