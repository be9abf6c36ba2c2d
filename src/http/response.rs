//! Response construction and wire encoding.
//!
//! # Responsibilities
//! - Carry handler output (status, content type, body)
//! - Apply the negotiated content coding
//! - Frame the status line and header block
//!
//! # Design Decisions
//! - Header order is fixed: Content-Type, Content-Encoding, Content-Length
//! - Content-Length is computed from the bytes actually sent
//! - A compression failure downgrades the whole response to a bare 500

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

use super::headers::{ContentType, Encoding};
use super::status::Status;

/// Protocol version written on every status line.
pub const VERSION: &str = "HTTP/1.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: Status,
    content_type: Option<ContentType>,
    encoding: Option<Encoding>,
    body: Option<Vec<u8>>,
}

impl Response {
    /// A response made of the status line alone.
    pub fn empty(status: Status) -> Self {
        Self {
            status,
            content_type: None,
            encoding: None,
            body: None,
        }
    }

    /// `200 OK` with a `text/plain` body.
    pub fn text(body: impl Into<String>) -> Self {
        Self::with_body(Status::Ok, ContentType::PlainText, body.into().into_bytes())
    }

    /// `200 OK` with an `application/octet-stream` body.
    pub fn octet_stream(body: impl Into<Vec<u8>>) -> Self {
        Self::with_body(Status::Ok, ContentType::OctetStream, body.into())
    }

    pub fn with_body(status: Status, content_type: ContentType, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: Some(content_type),
            encoding: None,
            body: Some(body),
        }
    }

    pub fn not_found() -> Self {
        Self::empty(Status::NotFound)
    }

    pub fn bad_request() -> Self {
        Self::empty(Status::BadRequest)
    }

    pub fn internal_error() -> Self {
        Self::empty(Status::InternalServerError)
    }

    /// Compress the body with `encoding` when the response is encoded.
    pub fn with_encoding(mut self, encoding: Option<Encoding>) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn content_type(&self) -> Option<ContentType> {
        self.content_type
    }

    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Serialize into the exact bytes to put on the wire.
    pub fn encode(self) -> Vec<u8> {
        self.encode_with(compress_gzip)
    }

    /// Like [`encode`](Self::encode), with `gzip` producing the compressed body.
    ///
    /// A compressor error replaces the whole response with a bare 500.
    pub fn encode_with<C>(self, gzip: C) -> Vec<u8>
    where
        C: FnOnce(&[u8]) -> std::io::Result<Vec<u8>>,
    {
        let Some(body) = self.body else {
            return status_only(self.status);
        };

        let payload = match self.encoding {
            Some(Encoding::Gzip) => match gzip(&body) {
                Ok(compressed) => compressed,
                Err(e) => {
                    tracing::error!(error = %e, status = %self.status, "Gzip compression failed");
                    return status_only(Status::InternalServerError);
                }
            },
            None => body,
        };

        let mut head = format!("{VERSION} {}\r\n", self.status);
        if let Some(content_type) = self.content_type {
            head.push_str(&format!("Content-Type: {content_type}\r\n"));
        }
        if let Some(encoding) = self.encoding {
            head.push_str(&format!("Content-Encoding: {encoding}\r\n"));
        }
        head.push_str(&format!("Content-Length: {}\r\n\r\n", payload.len()));

        let mut out = head.into_bytes();
        out.extend_from_slice(&payload);
        out
    }
}

fn status_only(status: Status) -> Vec<u8> {
    format!("{VERSION} {status}\r\n\r\n").into_bytes()
}

/// Compress `data` into a standard gzip container.
pub fn compress_gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn split_head(bytes: &[u8]) -> (String, Vec<u8>) {
        let end = bytes
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("head terminator");
        (
            String::from_utf8(bytes[..end].to_vec()).unwrap(),
            bytes[end + 4..].to_vec(),
        )
    }

    #[test]
    fn encodes_text_body() {
        let bytes = Response::text("abc123").encode();
        assert_eq!(
            bytes,
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 6\r\n\r\nabc123"
        );
    }

    #[test]
    fn no_body_responses_have_no_headers() {
        assert_eq!(Response::empty(Status::Ok).encode(), b"HTTP/1.1 200 OK\r\n\r\n");
        assert_eq!(
            Response::empty(Status::Created).encode(),
            b"HTTP/1.1 201 Created\r\n\r\n"
        );
        assert_eq!(Response::not_found().encode(), b"HTTP/1.1 404 Not Found\r\n\r\n");
        assert_eq!(
            Response::not_found()
                .with_encoding(Some(Encoding::Gzip))
                .encode(),
            b"HTTP/1.1 404 Not Found\r\n\r\n"
        );
    }

    #[test]
    fn empty_body_still_carries_length() {
        let bytes = Response::octet_stream(Vec::new()).encode();
        assert_eq!(
            bytes,
            b"HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: 0\r\n\r\n"
        );
    }

    #[test]
    fn compression_failure_becomes_bare_500() {
        let bytes = Response::text("abc")
            .with_encoding(Some(Encoding::Gzip))
            .encode_with(|_| Err(std::io::Error::other("encoder broke")));
        assert_eq!(bytes, b"HTTP/1.1 500 Internal Server Error\r\n\r\n");

        // Identity responses never reach the compressor.
        let bytes = Response::text("abc").encode_with(|_| unreachable!());
        assert!(bytes.ends_with(b"Content-Length: 3\r\n\r\nabc"));
    }

    #[test]
    fn gzip_body_round_trips_and_length_matches() {
        let original = "the quick brown fox ".repeat(20);
        let bytes = Response::text(original.clone())
            .with_encoding(Some(Encoding::Gzip))
            .encode();
        let (head, body) = split_head(&bytes);

        let length_line = format!("Content-Length: {}", body.len());
        let lines: Vec<&str> = head.split("\r\n").collect();
        assert_eq!(
            lines,
            vec![
                "HTTP/1.1 200 OK",
                "Content-Type: text/plain",
                "Content-Encoding: gzip",
                length_line.as_str(),
            ]
        );
        assert_ne!(body, original.as_bytes());

        let mut decoded = String::new();
        GzDecoder::new(&body[..]).read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, original);
    }
}
