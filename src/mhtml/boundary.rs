//! Multipart boundary discovery.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// `boundary="..."` or `boundary=...` in a Content-Type header.
static BOUNDARY_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)boundary="?([^";\s]+)"?"#).expect("valid boundary regex")
});

/// A delimiter line: `--` followed by a token of hex digits and hyphens.
static DELIMITER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^--([0-9A-Fa-f-]*[0-9A-Fa-f][0-9A-Fa-f-]*)\r?$").expect("valid delimiter regex")
});

/// Find the multipart boundary in the first `window` bytes of `data`.
///
/// The header region is decoded lossily as text. A `boundary=` parameter
/// wins; failing that, the first line that looks like a bare delimiter is
/// used. The returned string excludes the leading `--`.
pub fn find_boundary(data: &[u8], window: usize) -> Result<String> {
    let head = String::from_utf8_lossy(&data[..data.len().min(window)]);

    BOUNDARY_PARAM
        .captures(&head)
        .or_else(|| DELIMITER_LINE.captures(&head))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|b| !b.is_empty())
        .ok_or(Error::BoundaryNotFound)
}
