//! Error types for the HTTP engine.

use thiserror::Error;

/// Failure to turn connection bytes into a [`Request`](super::Request).
///
/// Always fatal to the connection.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The stream closed before a complete request arrived.
    #[error("connection closed before the request was complete")]
    UnexpectedEof,

    /// Underlying socket read failed.
    #[error("I/O error while reading request: {0}")]
    Io(#[from] std::io::Error),

    /// Head block ended before any request line was seen.
    #[error("request is missing its request line")]
    MissingRequestLine,

    /// Request line does not match `METHOD SP PATH SP PROTOCOL`.
    #[error("invalid request line: {0:?}")]
    InvalidRequestLine(String),

    /// Well-formed request line with a method this engine does not serve.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Header line without a `:` separator.
    #[error("malformed header line: {0:?}")]
    MalformedHeader(String),

    /// `Content-Length` is not a decimal integer.
    #[error("invalid Content-Length: {0:?}")]
    InvalidContentLength(String),

    /// Request line or header bytes are not valid UTF-8.
    #[error("request head is not valid UTF-8")]
    InvalidUtf8,

    /// Head line terminated by a bare `\n` instead of CRLF.
    #[error("line not terminated by CRLF: {0:?}")]
    MissingCarriageReturn(String),

    /// Head block exceeded the configured limit.
    #[error("request head exceeds {limit} bytes")]
    HeadTooLarge { limit: usize },

    /// Declared body exceeded the configured limit.
    #[error("request body of {declared} bytes exceeds {limit} bytes")]
    BodyTooLarge { declared: usize, limit: usize },
}

impl ParseError {
    /// True when the failure came from the transport rather than the bytes.
    ///
    /// Only non-I/O failures get a best-effort `400 Bad Request`.
    pub fn is_io(&self) -> bool {
        matches!(self, ParseError::Io(_) | ParseError::UnexpectedEof)
    }
}

/// A handler asked the [`RequestContext`](super::RequestContext) for a value
/// that was never recorded for this request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("{0} not found")]
    Missing(String),

    #[error("encoding {0} is not supported")]
    UnsupportedEncoding(String),

    #[error("invalid content-length {0:?}")]
    InvalidContentLength(String),
}

/// Failure while serving one connection.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Writing the response failed; the connection is abandoned.
    #[error("failed to write response: {0}")]
    Write(std::io::Error),
}

/// Result type for context lookups.
pub type ContextResult<T> = Result<T, ContextError>;
