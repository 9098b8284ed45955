//! Store-only ZIP archive encoder.
//!
//! The whole archive is assembled in memory and returned only once every
//! record has been written, so callers never observe a partial archive.
//!
//! ## Layout
//!
//! ```text
//! [LFH 1][name 1][data 1] ... [LFH n][name n][data n]
//! [CDFH 1][name 1] ... [CDFH n][name n]
//! [EOCD]
//! ```
//!
//! No timestamps or other environment-dependent values are embedded, so the
//! same input always produces byte-identical output.

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::progress::{Progress, ProgressSink};

use super::crc32::crc32;
use super::structures::{
    CentralDirectoryHeader, EndOfCentralDirectory, FLAG_UTF8, LocalFileHeader,
};

/// Folder name used when a group name sanitizes to nothing.
pub const UNTITLED: &str = "Untitled";

/// Characters that cannot appear in a path component on common file systems.
const RESERVED_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// One file to store: its name inside the group folder and its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// A named folder of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveGroup {
    pub name: String,
    pub entries: Vec<ArchiveEntry>,
}

impl ArchiveGroup {
    pub fn new(name: impl Into<String>, entries: Vec<ArchiveEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }
}

/// Archive building options.
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Report progress after every this many entries. Zero disables the
    /// periodic reports; the final report is always sent.
    pub progress_interval: usize,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            progress_interval: 10,
        }
    }
}

/// Make `name` safe to use as a single path component.
///
/// Path separators, reserved characters and control characters become `_`,
/// surrounding whitespace is trimmed, and names that would be empty or
/// refer to `.`/`..` fall back to [`UNTITLED`].
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if RESERVED_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        UNTITLED.to_string()
    } else {
        cleaned
    }
}

/// Serialize `groups` into a store-only ZIP archive.
///
/// Entries are written in group order, then entry order within each group,
/// at `<sanitized group name>/<sanitized file name>`.
///
/// # Errors
///
/// Returns [`Error::ArchiveBuild`] when an entry path does not fit the
/// 16-bit name length, or an entry or the archive as a whole does not fit
/// the 32-bit size and offset fields of a non-ZIP64 archive.
/// Entry counts of 65536 or more wrap in the EOCD record and are only
/// logged.
pub fn build_archive(
    groups: &[ArchiveGroup],
    options: &ArchiveOptions,
    progress: &mut dyn ProgressSink,
) -> Result<Vec<u8>> {
    let total: usize = groups.iter().map(|g| g.entries.len()).sum();
    let mut out = Vec::with_capacity(estimate_len(groups));
    let mut central = Vec::new();
    let mut processed = 0usize;

    for group in groups {
        let folder = sanitize_component(&group.name);

        for entry in &group.entries {
            let path = format!("{}/{}", folder, sanitize_component(&entry.file_name));
            if path.len() > u16::MAX as usize {
                return Err(Error::archive_build(format!(
                    "entry path of {} bytes exceeds the 65535-byte ZIP limit",
                    path.len()
                )));
            }
            let offset = to_u32(out.len(), "archive offset")?;
            let size = to_u32(entry.bytes.len(), "entry size")?;
            let flags = if path.is_ascii() { 0 } else { FLAG_UTF8 };

            let local = LocalFileHeader::stored(path.into_bytes(), flags, crc32(&entry.bytes), size);
            local.write_to(&mut out)?;
            out.extend_from_slice(&entry.bytes);

            CentralDirectoryHeader::for_local(local, offset).write_to(&mut central)?;

            processed += 1;
            if options.progress_interval > 0 && processed % options.progress_interval == 0 {
                progress.report(Progress::new(
                    processed,
                    total,
                    format!("Zipping {}/{}", processed, total),
                ));
            }
        }
    }

    let cd_offset = to_u32(out.len(), "central directory offset")?;
    let cd_size = to_u32(central.len(), "central directory size")?;
    if total > u16::MAX as usize {
        warn!("{} entries exceed the 16-bit EOCD count; count will wrap", total);
    }

    out.extend_from_slice(&central);
    EndOfCentralDirectory::new(total as u16, cd_size, cd_offset).write_to(&mut out)?;

    debug!("Built archive: {} entries, {} bytes", total, out.len());
    progress.report(Progress::new(total, total, "Archive complete"));

    Ok(out)
}

fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        Error::archive_build(format!("{} {} exceeds the 4 GiB ZIP limit", what, value))
    })
}

// Upper bound used only to size the output buffer up front.
fn estimate_len(groups: &[ArchiveGroup]) -> usize {
    let records = LocalFileHeader::SIZE + CentralDirectoryHeader::SIZE;
    groups
        .iter()
        .flat_map(|g| {
            let folder_len = g.name.len() + 1;
            g.entries
                .iter()
                .map(move |e| records + 2 * (folder_len + e.file_name.len()) + e.bytes.len())
        })
        .sum::<usize>()
        + EndOfCentralDirectory::SIZE
}
