//! MHTML image extraction.
//!
//! An MHTML file is a MIME `multipart/related` message: the saved page plus
//! every resource it embeds, each in its own part. This module recovers the
//! image parts as decoded bytes, in document order.
//!
//! ## Pipeline
//!
//! 1. [`boundary`]: find the multipart delimiter near the start of the file
//! 2. [`splitter`]: cut the raw bytes at each delimiter and separate each
//!    part's headers from its body, without decoding payloads as text
//! 3. [`part`]: classify parts by their headers and pick an extension
//! 4. [`decode`]: undo base64 or quoted-printable transfer encoding
//! 5. [`naming`]: derive the group name from the file name
//!
//! Only one level of multipart nesting is understood.

pub mod boundary;
pub mod decode;
mod extractor;
pub mod naming;
pub mod part;
pub mod splitter;

pub use extractor::{ExtractOptions, Group, ImageAsset, extract_one, page_file_name};
pub use naming::group_name;
