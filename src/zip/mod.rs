//! Store-only ZIP archive writing and read-back.
//!
//! ## Architecture
//!
//! - [`crc32`]: CRC-32 with a compile-time lookup table
//! - [`structures`]: one value type per ZIP record (local header, central
//!   directory header, EOCD), each able to serialize itself
//! - [`writer`]: assembles records into a complete archive
//! - [`reader`]: lists and verifies archives held in memory
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and file data for each entry
//! 2. Central Directory with metadata for all entries
//! 3. End of Central Directory (EOCD) record at the end
//!
//! ## Limitations
//!
//! - STORED (method 0) only, no compression is ever applied
//! - No encryption, no ZIP64, no multi-disk archives
//! - Entry counts of 65536 or more wrap in the EOCD record

pub mod crc32;
mod reader;
mod structures;
mod writer;

pub use reader::ArchiveReader;
pub use structures::*;
pub use writer::{
    ArchiveEntry, ArchiveGroup, ArchiveOptions, UNTITLED, build_archive, sanitize_component,
};
