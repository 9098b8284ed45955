//! # mhtzip
//!
//! Turn saved web pages (MHTML) into plain image archives.
//!
//! This library recovers the images embedded in MHTML files and packs them
//! into store-only ZIP archives (CBZ-friendly), one folder per source file.
//! Both halves work directly on byte buffers and tolerate malformed input:
//! a broken part is skipped, a file without a multipart boundary is
//! reported, and nothing panics on bad data.
//!
//! ## Features
//!
//! - Binary-safe multipart splitting; payloads are never decoded as text
//! - base64 and quoted-printable transfer decoding
//! - Chapter-aware group names (`Series Chapter 12` -> `Chapter 12 Series`)
//! - ZIP writer with no compression library, deterministic output
//! - Read-back and CRC verification of store-only archives
//! - Background [`Engine`] with request/response messaging and progress
//!
//! ## Example
//!
//! ```no_run
//! use mhtzip::mhtml::{ExtractOptions, extract_one};
//! use mhtzip::progress::NoProgress;
//! use mhtzip::zip::{ArchiveGroup, ArchiveOptions, build_archive};
//!
//! fn main() -> anyhow::Result<()> {
//!     let data = std::fs::read("My Manga Chapter 3.mhtml")?;
//!
//!     let mut groups = Vec::new();
//!     if let Some(group) = extract_one(&data, "My Manga Chapter 3.mhtml", &ExtractOptions::default())? {
//!         groups.push(ArchiveGroup::from(group));
//!     }
//!
//!     let archive = build_archive(&groups, &ArchiveOptions::default(), &mut NoProgress)?;
//!     std::fs::write("out.cbz", archive)?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod engine;
pub mod error;
pub mod filter;
pub mod mhtml;
pub mod progress;
pub mod util;
pub mod zip;

pub use cli::Cli;
pub use engine::{Engine, ExtractResponse, RequestId};
pub use error::{Error, ErrorKind, Result};
pub use filter::{FilterOptions, Selection, select};
pub use mhtml::{ExtractOptions, Group, ImageAsset, extract_one};
pub use progress::{Progress, ProgressSink};
pub use crate::zip::{ArchiveEntry, ArchiveGroup, ArchiveOptions, ArchiveReader, build_archive};
