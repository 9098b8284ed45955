use log::{debug, info};

use crate::error::Result;
use crate::util::natural_cmp;

use super::boundary::find_boundary;
use super::decode::decode_body;
use super::naming::group_name;
use super::part::PartHeaders;
use super::splitter::{split_part, split_raw};

/// Extraction limits.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Bytes from the start of the file searched for the boundary.
    pub boundary_window: usize,
    /// Bytes from the start of each part searched for the header/body separator.
    pub header_window: usize,
    /// Decoded bodies shorter than this are treated as corrupt and dropped.
    pub min_body_len: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            boundary_window: 4096,
            header_window: 2000,
            min_body_len: 10,
        }
    }
}

/// One decoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Position among the file's images, in document order, from 0.
    pub sequence_index: usize,
    /// Lowercase extension without the dot (`jpg`, `png`, ...).
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl ImageAsset {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// `001.jpg`, `002.png`, ...: 1-based and zero padded to three digits.
    pub fn file_name(&self) -> String {
        page_file_name(self.sequence_index, &self.extension)
    }
}

/// File name for the page at 0-based `index`.
pub fn page_file_name(index: usize, extension: &str) -> String {
    format!("{:03}.{}", index + 1, extension)
}

/// The images recovered from one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub images: Vec<ImageAsset>,
}

struct Candidate {
    key: String,
    extension: String,
    bytes: Vec<u8>,
}

/// Extract the images embedded in one MHTML file.
///
/// Returns `Ok(None)` when the file has a boundary but no usable image
/// parts. Parts that fail to decode are dropped individually; only a
/// missing boundary fails the whole file.
///
/// # Errors
///
/// [`Error::BoundaryNotFound`](crate::Error::BoundaryNotFound) when no
/// boundary appears in the first `boundary_window` bytes.
pub fn extract_one(data: &[u8], file_name: &str, options: &ExtractOptions) -> Result<Option<Group>> {
    let boundary = find_boundary(data, options.boundary_window)?;
    let raw_parts = split_raw(data, &boundary);
    debug!("{}: boundary {:?}, {} parts", file_name, boundary, raw_parts.len());

    let mut candidates = Vec::new();
    for (index, raw) in raw_parts.into_iter().enumerate() {
        let Some(part) = split_part(raw, index, options.header_window) else {
            debug!("{}: part {} has no header separator, skipped", file_name, index);
            continue;
        };

        let headers = PartHeaders::parse(&part.header_text());
        if !headers.is_image() {
            continue;
        }

        let bytes = match decode_body(part.body, &headers.encoding()) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("{}: part {} discarded: {}", file_name, index, e);
                continue;
            }
        };
        if bytes.len() < options.min_body_len {
            debug!("{}: part {} too short ({} bytes), discarded", file_name, index, bytes.len());
            continue;
        }

        candidates.push(Candidate {
            key: format!("{:06}", part.index),
            extension: headers.extension(),
            bytes,
        });
    }

    if candidates.is_empty() {
        info!("{}: no images found", file_name);
        return Ok(None);
    }

    candidates.sort_by(|a, b| natural_cmp(&a.key, &b.key));

    let images: Vec<ImageAsset> = candidates
        .into_iter()
        .enumerate()
        .map(|(sequence_index, c)| ImageAsset {
            sequence_index,
            extension: c.extension,
            bytes: c.bytes,
        })
        .collect();

    let name = group_name(file_name);
    info!("{}: {} images -> {:?}", file_name, images.len(), name);

    Ok(Some(Group { name, images }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    fn part(headers: &str, body: &[u8]) -> Vec<u8> {
        let mut out = format!("--BOUND\r\n{}\r\n\r\n", headers).into_bytes();
        out.extend_from_slice(body);
        out.extend_from_slice(b"\r\n");
        out
    }

    fn document(parts: &[Vec<u8>]) -> Vec<u8> {
        let mut out = b"MIME-Version: 1.0\r\nContent-Type: multipart/related; boundary=\"BOUND\"\r\n\r\n".to_vec();
        for p in parts {
            out.extend_from_slice(p);
        }
        out.extend_from_slice(b"--BOUND--\r\n");
        out
    }

    fn extract(data: &[u8]) -> Result<Option<Group>> {
        extract_one(data, "Series Chapter 3.mhtml", &ExtractOptions::default())
    }

    #[test]
    fn extracts_images_in_document_order() {
        let png = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR".to_vec();
        let jpg = vec![0xFFu8, 0xD8, 0xFF, 0xE0, 1, 2, 3, 4, 5, 6, 7, 8];
        let encoded = STANDARD.encode(&jpg);
        let data = document(&[
            part("Content-Type: text/html\r\nContent-Location: https://example.com/", b"<html></html>"),
            part("Content-Type: image/png\r\nContent-Location: https://example.com/b.png", &png),
            part(
                "Content-Type: image/jpeg\r\nContent-Transfer-Encoding: base64",
                encoded.as_bytes(),
            ),
        ]);

        let group = extract(&data).unwrap().unwrap();
        assert_eq!(group.name, "Chapter 3 Series");
        assert_eq!(group.images.len(), 2);
        assert_eq!(group.images[0].sequence_index, 0);
        assert_eq!(group.images[0].extension, "png");
        assert_eq!(group.images[0].bytes, png);
        assert_eq!(group.images[1].sequence_index, 1);
        assert_eq!(group.images[1].extension, "jpg");
        assert_eq!(group.images[1].bytes, jpg);
        assert_eq!(group.images[1].file_name(), "002.jpg");
        assert_eq!(group.images[1].size(), 12);
    }

    #[test]
    fn bad_parts_are_skipped_not_fatal() {
        let good = vec![7u8; 64];
        let data = document(&[
            part("Content-Type: image/gif\r\nContent-Transfer-Encoding: base64", b"!!!not base64!!!"),
            part("Content-Type: image/png\r\nContent-Transfer-Encoding: quoted-printable", b"=ZZbroken"),
            part("Content-Type: image/png", b"tiny"),
            part("Content-Type: image/webp", &good),
        ]);

        let group = extract(&data).unwrap().unwrap();
        assert_eq!(group.images.len(), 1);
        assert_eq!(group.images[0].sequence_index, 0);
        assert_eq!(group.images[0].extension, "webp");
        assert_eq!(group.images[0].bytes, good);
    }

    #[test]
    fn no_image_parts_yields_no_group() {
        let data = document(&[
            part("Content-Type: text/html", b"<html><body>hello world</body></html>"),
            part("Content-Type: text/css", b"body { color: red; }"),
        ]);
        assert_eq!(extract(&data).unwrap(), None);
    }

    #[test]
    fn missing_boundary_fails_the_file() {
        let err = extract(b"just some bytes, no multipart here").unwrap_err();
        assert!(matches!(err, Error::BoundaryNotFound));
    }

    #[test]
    fn short_base64_payload_is_discarded() {
        let data = document(&[part(
            "Content-Type: image/jpeg\r\nContent-Transfer-Encoding: base64",
            STANDARD.encode(b"short").as_bytes(),
        )]);
        assert_eq!(extract(&data).unwrap(), None);
    }

    #[test]
    fn page_names_are_padded() {
        assert_eq!(page_file_name(0, "jpg"), "001.jpg");
        assert_eq!(page_file_name(998, "png"), "999.png");
        assert_eq!(page_file_name(999, "png"), "1000.png");
    }
}
