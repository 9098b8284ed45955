//! Shared helpers for building MHTML fixtures in tests.

#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub const BOUNDARY: &str = "----MultipartBoundary--Zm9vYmFy----";

/// How a fixture part's body is written.
#[derive(Debug, Clone, Copy)]
pub enum Body {
    Raw,
    Base64,
    QuotedPrintable,
}

/// Builder for multipart/related documents shaped like browser-saved pages.
pub struct MhtmlBuilder {
    out: Vec<u8>,
}

impl MhtmlBuilder {
    pub fn new() -> Self {
        let header = format!(
            "From: <Saved by Blink>\r\n\
             Snapshot-Content-Location: https://example.com/read/1\r\n\
             Subject: Reader\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: multipart/related;\r\n\
             \ttype=\"text/html\";\r\n\
             \tboundary=\"{}\"\r\n\r\n\r\n",
            BOUNDARY
        );
        Self {
            out: header.into_bytes(),
        }
    }

    pub fn html(self, html: &str) -> Self {
        self.part(
            "Content-Type: text/html\r\nContent-Location: https://example.com/read/1",
            Body::QuotedPrintable,
            html.as_bytes(),
        )
    }

    pub fn image(self, mime: &str, location: &str, body: Body, data: &[u8]) -> Self {
        let headers = format!("Content-Type: {}\r\nContent-Location: {}", mime, location);
        self.part(&headers, body, data)
    }

    pub fn part(mut self, headers: &str, body: Body, data: &[u8]) -> Self {
        let encoding = match body {
            Body::Raw => "binary",
            Body::Base64 => "base64",
            Body::QuotedPrintable => "quoted-printable",
        };
        self.out.extend_from_slice(
            format!(
                "--{}\r\n{}\r\nContent-Transfer-Encoding: {}\r\n\r\n",
                BOUNDARY, headers, encoding
            )
            .as_bytes(),
        );
        match body {
            Body::Raw => self.out.extend_from_slice(data),
            Body::Base64 => self.out.extend_from_slice(base64_lines(data).as_bytes()),
            Body::QuotedPrintable => self.out.extend_from_slice(&qp_encode(data)),
        }
        self.out.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.out
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.out
    }
}

/// Base64 wrapped at 76 columns with CRLF, as mail and MHTML writers do.
pub fn base64_lines(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    encoded
        .as_bytes()
        .chunks(76)
        .map(|c| std::str::from_utf8(c).unwrap())
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Quoted-printable encoding of arbitrary bytes with soft line breaks every
/// 72 output columns. Everything but printable ASCII other than `=` is escaped.
pub fn qp_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut column = 0;
    for &b in data {
        let token = if (b'!'..=b'~').contains(&b) && b != b'=' {
            vec![b]
        } else {
            format!("={:02X}", b).into_bytes()
        };
        if column + token.len() > 72 {
            out.extend_from_slice(b"=\r\n");
            column = 0;
        }
        column += token.len();
        out.extend_from_slice(&token);
    }
    out
}

/// Bytes that look like the start of a JPEG followed by `len - 4` filler bytes.
pub fn fake_jpeg(len: usize, seed: u8) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.extend((0..len.saturating_sub(4)).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)));
    data
}
