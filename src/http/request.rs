//! Request reader.
//!
//! # Responsibilities
//! - Read the request line and header block up to the first bare CRLF
//! - Map the fixed header vocabulary into typed [`Headers`]
//! - Read exactly `Content-Length` body bytes
//!
//! # Design Decisions
//! - One request per connection, so the reader never loops
//! - Head and body sizes are bounded before anything is buffered
//! - Chunked bodies are not supported

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use super::error::ParseError;
use super::headers::Headers;
use super::method::Method;

static REQUEST_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\w+)\s+(/\S*)\s+(HTTP/\d+\.\d+)$").expect("request line pattern is valid")
});

/// Size limits applied while reading a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadLimits {
    /// Maximum bytes in the request line plus headers, terminator included.
    pub max_head_bytes: usize,
    /// Maximum accepted `Content-Length`.
    pub max_body_bytes: usize,
}

impl Default for ReadLimits {
    fn default() -> Self {
        Self {
            max_head_bytes: 8 * 1024,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// A parsed request. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    protocol: String,
    headers: Headers,
    body: Vec<u8>,
}

impl Request {
    pub fn method(&self) -> Method {
        self.method
    }

    /// Request target with any query string removed.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Protocol token from the request line, e.g. `HTTP/1.1`.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Read one request from `reader`.
pub async fn read_request<R>(reader: &mut R, limits: &ReadLimits) -> Result<Request, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let lines = read_head(reader, limits).await?;
    let mut lines = lines.into_iter();

    let request_line = lines.next().ok_or(ParseError::MissingRequestLine)?;
    let captures = REQUEST_LINE
        .captures(&request_line)
        .ok_or_else(|| ParseError::InvalidRequestLine(request_line.clone()))?;

    let method = captures[1]
        .parse::<Method>()
        .map_err(ParseError::UnsupportedMethod)?;
    let (path, query) = match captures[2].split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (captures[2].to_string(), None),
    };
    let protocol = captures[3].to_string();

    let mut headers = Headers::default();
    for line in lines {
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| ParseError::MalformedHeader(line.clone()))?;
        let value = value.strip_prefix(' ').unwrap_or(value);
        if !headers.insert(key, value)? {
            tracing::debug!(header = %key, "Ignoring unrecognized header");
        }
    }

    let body = match headers.content_length {
        Some(declared) if declared > limits.max_body_bytes => {
            return Err(ParseError::BodyTooLarge {
                declared,
                limit: limits.max_body_bytes,
            });
        }
        Some(declared) if declared > 0 => {
            let mut body = vec![0u8; declared];
            reader.read_exact(&mut body).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    ParseError::UnexpectedEof
                } else {
                    ParseError::Io(e)
                }
            })?;
            body
        }
        _ => Vec::new(),
    };

    Ok(Request {
        method,
        path,
        query,
        protocol,
        headers,
        body,
    })
}

/// Collect CRLF-terminated lines until the blank line that ends the head.
async fn read_head<R>(reader: &mut R, limits: &ReadLimits) -> Result<Vec<String>, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = Vec::new();
    let mut consumed = 0usize;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        // One byte past the budget is enough to tell "exactly full" from "over".
        let budget = (limits.max_head_bytes - consumed) as u64 + 1;
        let n = (&mut *reader).take(budget).read_until(b'\n', &mut buf).await?;

        consumed += n;
        if consumed > limits.max_head_bytes {
            return Err(ParseError::HeadTooLarge {
                limit: limits.max_head_bytes,
            });
        }
        if n == 0 || buf.last() != Some(&b'\n') {
            return Err(ParseError::UnexpectedEof);
        }

        let Some(content) = buf.strip_suffix(b"\r\n") else {
            let line = String::from_utf8_lossy(&buf).trim_end().to_string();
            return Err(ParseError::MissingCarriageReturn(line));
        };
        if content.is_empty() {
            return Ok(lines);
        }
        let line = std::str::from_utf8(content).map_err(|_| ParseError::InvalidUtf8)?;
        lines.push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn parse(raw: &[u8]) -> Result<Request, ParseError> {
        let mut reader = BufReader::new(raw);
        read_request(&mut reader, &ReadLimits::default()).await
    }

    #[tokio::test]
    async fn parses_request_line_and_known_headers() {
        let raw = b"GET /echo/abc123 HTTP/1.1\r\nHost: localhost:4221\r\nUser-Agent: curl/7.64.1\r\nAccept: */*\r\nX-Trace: skipped\r\n\r\n";
        let request = parse(raw).await.unwrap();

        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.path(), "/echo/abc123");
        assert_eq!(request.query(), None);
        assert_eq!(request.protocol(), "HTTP/1.1");
        assert_eq!(request.headers().host.as_deref(), Some("localhost:4221"));
        assert_eq!(request.headers().user_agent.as_deref(), Some("curl/7.64.1"));
        assert_eq!(request.headers().accept.as_deref(), Some("*/*"));
        assert!(request.body().is_empty());
    }

    #[tokio::test]
    async fn reads_exactly_content_length_bytes() {
        let raw = b"POST /files/a HTTP/1.1\r\nContent-Type: application/octet-stream\r\nContent-Length: 5\r\n\r\nhello trailing";
        let request = parse(raw).await.unwrap();

        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.headers().content_length, Some(5));
        assert_eq!(
            request.headers().content_type.as_deref(),
            Some("application/octet-stream")
        );
        assert_eq!(request.body(), b"hello");
    }

    #[tokio::test]
    async fn only_the_separator_space_is_trimmed() {
        let raw = b"GET / HTTP/1.1\r\nUser-Agent:  padded value \r\n\r\n";
        let request = parse(raw).await.unwrap();
        assert_eq!(
            request.headers().user_agent.as_deref(),
            Some(" padded value ")
        );
    }

    #[tokio::test]
    async fn query_string_is_split_from_path() {
        let request = parse(b"GET /echo/hi?x=1 HTTP/1.1\r\n\r\n").await.unwrap();
        assert_eq!(request.path(), "/echo/hi");
        assert_eq!(request.query(), Some("x=1"));
    }

    #[tokio::test]
    async fn rejects_malformed_request_lines() {
        assert!(matches!(
            parse(b"GET /missing-protocol\r\n\r\n").await,
            Err(ParseError::InvalidRequestLine(_))
        ));
        assert!(matches!(
            parse(b"GET relative HTTP/1.1\r\n\r\n").await,
            Err(ParseError::InvalidRequestLine(_))
        ));
        assert!(matches!(
            parse(b"\r\n").await,
            Err(ParseError::MissingRequestLine)
        ));
        assert!(matches!(
            parse(b"DELETE /x HTTP/1.1\r\n\r\n").await,
            Err(ParseError::UnsupportedMethod(m)) if m == "DELETE"
        ));
    }

    #[tokio::test]
    async fn rejects_header_without_colon() {
        let err = parse(b"GET / HTTP/1.1\r\nNoColonHere\r\n\r\n").await.unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader(line) if line == "NoColonHere"));
    }

    #[tokio::test]
    async fn truncated_streams_are_eof() {
        assert!(matches!(
            parse(b"GET / HTTP/1.1\r\nHost: x\r\n").await,
            Err(ParseError::UnexpectedEof)
        ));
        assert!(matches!(
            parse(b"POST /files/a HTTP/1.1\r\nContent-Length: 10\r\n\r\nshort").await,
            Err(ParseError::UnexpectedEof)
        ));
    }

    #[tokio::test]
    async fn invalid_utf8_is_rejected_not_replaced() {
        assert!(matches!(
            parse(b"GET /echo/\xff HTTP/1.1\r\n\r\n").await,
            Err(ParseError::InvalidUtf8)
        ));
        assert!(matches!(
            parse(b"GET / HTTP/1.1\r\nUser-Agent: a\xfeb\r\n\r\n").await,
            Err(ParseError::InvalidUtf8)
        ));
    }

    #[tokio::test]
    async fn lines_must_end_in_crlf() {
        let err = parse(b"GET /echo/a HTTP/1.1\r\nHost: x\n\r\n").await.unwrap_err();
        assert!(matches!(err, ParseError::MissingCarriageReturn(line) if line == "Host: x"));

        assert!(matches!(
            parse(b"GET / HTTP/1.1\n\n").await,
            Err(ParseError::MissingCarriageReturn(_))
        ));
    }

    #[tokio::test]
    async fn enforces_limits() {
        let limits = ReadLimits {
            max_head_bytes: 32,
            max_body_bytes: 4,
        };

        let raw = b"GET / HTTP/1.1\r\nUser-Agent: a-very-long-agent-string\r\n\r\n";
        let mut reader = BufReader::new(&raw[..]);
        assert!(matches!(
            read_request(&mut reader, &limits).await,
            Err(ParseError::HeadTooLarge { limit: 32 })
        ));

        let limits = ReadLimits {
            max_head_bytes: 1024,
            ..limits
        };
        let raw = b"POST /a HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let mut reader = BufReader::new(&raw[..]);
        assert!(matches!(
            read_request(&mut reader, &limits).await,
            Err(ParseError::BodyTooLarge { declared: 5, limit: 4 })
        ));
    }
}
