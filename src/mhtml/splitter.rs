//! Binary-safe multipart splitting.
//!
//! Parts are located by scanning the raw buffer for the delimiter bytes, so
//! payloads are never decoded as text and raw binary bodies survive intact.

use crate::util::{find_all, find_within};

/// One part between two delimiter occurrences, split into headers and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MimePart<'a> {
    /// Position among all parts of the document, starting at 0.
    pub index: usize,
    pub header: &'a [u8],
    pub body: &'a [u8],
}

impl MimePart<'_> {
    /// Header span decoded as text. Header bytes are expected to be ASCII;
    /// anything else is replaced rather than rejected.
    pub fn header_text(&self) -> String {
        String::from_utf8_lossy(self.header).into_owned()
    }
}

/// Split `data` on `--<boundary>` into raw part ranges.
///
/// Each pair of consecutive delimiter occurrences encloses one part; bytes
/// before the first and after the last occurrence are not parts. The
/// returned slices start right after the delimiter and run up to the next.
pub fn split_raw<'a>(data: &'a [u8], boundary: &str) -> Vec<&'a [u8]> {
    let delimiter = format!("--{}", boundary).into_bytes();
    let offsets = find_all(data, &delimiter);

    offsets
        .windows(2)
        .map(|pair| &data[pair[0] + delimiter.len()..pair[1]])
        .collect()
}

/// Separate a raw part into its header and body spans.
///
/// The separator is the first blank line (`\r\n\r\n`, or `\n\n` for
/// LF-only files) starting within `window` bytes. Returns `None` when no
/// separator is found there. The line break that belongs to the following
/// delimiter is removed from the body.
pub fn split_part(raw: &[u8], index: usize, window: usize) -> Option<MimePart<'_>> {
    let (header_end, sep_len) = find_within(raw, b"\r\n\r\n", window)
        .map(|i| (i, 4))
        .or_else(|| find_within(raw, b"\n\n", window).map(|i| (i, 2)))?;

    let header = trim_leading_newline(&raw[..header_end]);
    let body = trim_trailing_newline(&raw[header_end + sep_len..]);

    Some(MimePart {
        index,
        header,
        body,
    })
}

fn trim_leading_newline(s: &[u8]) -> &[u8] {
    s.strip_prefix(b"\r\n")
        .or_else(|| s.strip_prefix(b"\n"))
        .unwrap_or(s)
}

fn trim_trailing_newline(s: &[u8]) -> &[u8] {
    s.strip_suffix(b"\r\n")
        .or_else(|| s.strip_suffix(b"\n"))
        .unwrap_or(s)
}
