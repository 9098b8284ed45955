//! MIME part header parsing and image classification.

/// Extension used when neither the content type nor the location names one.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Body encoding named by `Content-Transfer-Encoding`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEncoding {
    /// Absent, `binary`, `8bit` or `7bit`: the body is used as is.
    Identity,
    Base64,
    QuotedPrintable,
    Unsupported(String),
}

impl TransferEncoding {
    pub fn parse(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return TransferEncoding::Identity;
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "binary" | "8bit" | "7bit" => TransferEncoding::Identity,
            "base64" => TransferEncoding::Base64,
            "quoted-printable" => TransferEncoding::QuotedPrintable,
            other => TransferEncoding::Unsupported(other.to_string()),
        }
    }
}

/// The headers of a part that matter for extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartHeaders {
    pub content_type: Option<String>,
    pub content_location: Option<String>,
    pub transfer_encoding: Option<String>,
}

impl PartHeaders {
    /// Parse a header block. Folded continuation lines are joined, names
    /// are matched case-insensitively, and the first occurrence of each
    /// header wins.
    pub fn parse(text: &str) -> Self {
        let mut headers = PartHeaders::default();

        for line in unfold(text) {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            let slot = match name.trim().to_ascii_lowercase().as_str() {
                "content-type" => &mut headers.content_type,
                "content-location" => &mut headers.content_location,
                "content-transfer-encoding" => &mut headers.transfer_encoding,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }

        headers
    }

    /// Media type without parameters, lowercased (`image/png`).
    pub fn mime_type(&self) -> Option<String> {
        self.content_type.as_deref().map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }

    /// Whether this part carries an image.
    ///
    /// An `image/*` content type qualifies. A part without any content type
    /// qualifies when it has a `Content-Location`; parts that declare some
    /// other type (the HTML page, stylesheets) do not.
    pub fn is_image(&self) -> bool {
        match self.mime_type() {
            Some(mime) => mime.starts_with("image/"),
            None => self.content_location.is_some(),
        }
    }

    pub fn encoding(&self) -> TransferEncoding {
        TransferEncoding::parse(self.transfer_encoding.as_deref())
    }

    /// File extension for the image: the content subtype, else the
    /// location's extension, else [`DEFAULT_EXTENSION`].
    pub fn extension(&self) -> String {
        let from_type = self
            .mime_type()
            .and_then(|mime| mime.strip_prefix("image/").map(str::to_string))
            .map(|subtype| subtype.split('+').next().unwrap_or_default().to_string())
            .filter(|ext| is_plausible_extension(ext));

        from_type
            .or_else(|| {
                self.content_location
                    .as_deref()
                    .and_then(location_extension)
                    .filter(|ext| is_plausible_extension(ext))
            })
            .map(|ext| normalize_extension(&ext))
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
    }
}

/// Join RFC 5322 folded lines: a line starting with whitespace continues
/// the previous one.
fn unfold(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.starts_with([' ', '\t']) {
            if let Some(last) = lines.last_mut() {
                last.push(' ');
                last.push_str(line.trim());
                continue;
            }
        }
        lines.push(line.to_string());
    }
    lines
}

fn location_extension(location: &str) -> Option<String> {
    let path = location.split(['?', '#']).next().unwrap_or_default();
    let file = path.rsplit(['/', '\\']).next().unwrap_or_default();
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn is_plausible_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

fn normalize_extension(ext: &str) -> String {
    match ext.to_ascii_lowercase().as_str() {
        "jpeg" | "pjpeg" | "jpe" => "jpg".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(text: &str) -> PartHeaders {
        PartHeaders::parse(text)
    }

    #[test]
    fn parses_relevant_headers() {
        let h = headers(
            "Content-Type: image/jpeg\r\nContent-Transfer-Encoding: base64\r\nContent-Location: https://cdn.example.com/p/01.jpg",
        );
        assert_eq!(h.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(h.encoding(), TransferEncoding::Base64);
        assert_eq!(
            h.content_location.as_deref(),
            Some("https://cdn.example.com/p/01.jpg")
        );
        assert!(h.is_image());
        assert_eq!(h.extension(), "jpg");
    }

    #[test]
    fn header_names_are_case_insensitive_and_folded() {
        let h = headers("content-type: image/PNG;\r\n\tname=\"a.png\"\r\nCONTENT-TRANSFER-ENCODING: Quoted-Printable");
        assert_eq!(h.content_type.as_deref(), Some("image/PNG; name=\"a.png\""));
        assert_eq!(h.mime_type().as_deref(), Some("image/png"));
        assert_eq!(h.extension(), "png");
        assert_eq!(h.encoding(), TransferEncoding::QuotedPrintable);
    }

    #[test]
    fn non_image_types_do_not_qualify() {
        let html = headers("Content-Type: text/html\r\nContent-Location: https://example.com/");
        assert!(!html.is_image());
        assert!(!headers("Content-ID: <x>").is_image());
    }

    #[test]
    fn location_alone_qualifies() {
        let h = headers("Content-Location: https://example.com/img/page_07.webp?w=800");
        assert!(h.is_image());
        assert_eq!(h.extension(), "webp");
    }

    #[test]
    fn extension_fallbacks() {
        assert_eq!(headers("Content-Type: image/svg+xml").extension(), "svg");
        assert_eq!(headers("Content-Location: https://example.com/image").extension(), "jpg");
        assert_eq!(headers("Content-Location: https://x.com/a.JPEG").extension(), "jpg");
        assert_eq!(headers("Content-Location: https://x.com/.hidden").extension(), "jpg");
        assert_eq!(headers("Content-Type: image/").extension(), "jpg");
    }

    #[test]
    fn transfer_encodings() {
        assert_eq!(TransferEncoding::parse(None), TransferEncoding::Identity);
        assert_eq!(TransferEncoding::parse(Some("8bit")), TransferEncoding::Identity);
        assert_eq!(TransferEncoding::parse(Some(" BINARY ")), TransferEncoding::Identity);
        assert_eq!(
            TransferEncoding::parse(Some("x-uuencode")),
            TransferEncoding::Unsupported("x-uuencode".into())
        );
    }
}
