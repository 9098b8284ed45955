//! Content-Transfer-Encoding decoders.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::error::{Error, Result};

use super::part::TransferEncoding;

/// Standard alphabet, tolerant of missing padding and stray trailing bits,
/// both of which show up in files saved by real browsers.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode a part body according to its transfer encoding.
pub fn decode_body(body: &[u8], encoding: &TransferEncoding) -> Result<Vec<u8>> {
    match encoding {
        TransferEncoding::Identity => Ok(body.to_vec()),
        TransferEncoding::Base64 => decode_base64(body),
        TransferEncoding::QuotedPrintable => decode_quoted_printable(body),
        TransferEncoding::Unsupported(name) => Err(Error::part_decode(format!(
            "unsupported transfer encoding {:?}",
            name
        ))),
    }
}

/// Decode base64 text, ignoring all ASCII whitespace (line breaks included).
pub fn decode_base64(body: &[u8]) -> Result<Vec<u8>> {
    let compact: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    BASE64
        .decode(&compact)
        .map_err(|e| Error::part_decode(format!("invalid base64: {}", e)))
}

/// Decode quoted-printable text.
///
/// Soft line breaks (`=` at the end of a line, optionally followed by
/// trailing whitespace) are removed first, then every `=XX` escape becomes
/// the byte it names. All other bytes pass through unchanged.
pub fn decode_quoted_printable(body: &[u8]) -> Result<Vec<u8>> {
    let joined = remove_soft_breaks(body);
    let mut out = Vec::with_capacity(joined.len());
    let mut i = 0;

    while i < joined.len() {
        if joined[i] != b'=' {
            out.push(joined[i]);
            i += 1;
            continue;
        }

        let escape = joined.get(i + 1..i + 3);
        match escape.and_then(|hex| Some((hex_value(hex[0])?, hex_value(hex[1])?))) {
            Some((hi, lo)) => {
                out.push(hi << 4 | lo);
                i += 3;
            }
            None => {
                return Err(Error::part_decode(format!(
                    "invalid quoted-printable escape at byte {}",
                    i
                )));
            }
        }
    }

    Ok(out)
}

fn remove_soft_breaks(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len());
    let mut i = 0;

    while i < body.len() {
        if body[i] == b'=' {
            let rest = &body[i + 1..];
            let ws = rest.iter().take_while(|&&b| b == b' ' || b == b'\t').count();
            let after = &rest[ws..];
            if after.starts_with(b"\r\n") {
                i += 1 + ws + 2;
                continue;
            }
            if after.starts_with(b"\n") {
                i += 1 + ws + 1;
                continue;
            }
        }
        out.push(body[i]);
        i += 1;
    }

    out
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_ignores_line_breaks() {
        let decoded = decode_base64(b"aGVs\r\nbG8g\n d29y bGQ=\r\n").unwrap();
        assert_eq!(decoded, b"hello world");
    }

    #[test]
    fn base64_tolerates_missing_padding() {
        assert_eq!(decode_base64(b"aGVsbG8").unwrap(), b"hello");
    }

    #[test]
    fn base64_rejects_garbage() {
        let err = decode_base64(b"not*base64!").unwrap_err();
        assert!(matches!(err, Error::PartDecode { .. }));
    }

    #[test]
    fn quoted_printable_escapes_and_soft_breaks() {
        let decoded = decode_quoted_printable(b"caf=C3=A9 =3D ok=\r\n joined=  \nend").unwrap();
        assert_eq!(decoded, "café = ok joinedend".as_bytes());
    }

    #[test]
    fn quoted_printable_keeps_hard_breaks() {
        assert_eq!(decode_quoted_printable(b"a\r\nb").unwrap(), b"a\r\nb");
    }

    #[test]
    fn quoted_printable_escape_split_by_soft_break() {
        assert_eq!(decode_quoted_printable(b"=4=\r\n1").unwrap(), b"A");
    }

    #[test]
    fn quoted_printable_rejects_bad_escapes() {
        assert!(decode_quoted_printable(b"bad =ZZ").is_err());
        assert!(decode_quoted_printable(b"truncated =4").is_err());
        assert!(decode_quoted_printable(b"dangling =").is_err());
    }

    #[test]
    fn identity_and_unsupported() {
        assert_eq!(decode_body(b"\x00\xff", &TransferEncoding::Identity).unwrap(), b"\x00\xff");
        let err = decode_body(b"x", &TransferEncoding::Unsupported("x-uue".into())).unwrap_err();
        assert!(matches!(err, Error::PartDecode { .. }));
    }
}
