//! The fixed header vocabulary understood by the engine.

use std::fmt;
use std::str::FromStr;

use super::error::ParseError;

/// Request headers the engine recognizes. Everything else is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    pub host: Option<String>,
    pub user_agent: Option<String>,
    pub accept: Option<String>,
    pub content_type: Option<String>,
    pub content_length: Option<usize>,
    pub accept_encoding: Option<String>,
}

impl Headers {
    /// Record one header. Keys are matched case-sensitively.
    ///
    /// Returns `Ok(false)` for keys outside the vocabulary.
    pub fn insert(&mut self, key: &str, value: &str) -> Result<bool, ParseError> {
        match key {
            "Host" => self.host = Some(value.to_string()),
            "User-Agent" => self.user_agent = Some(value.to_string()),
            "Accept" => self.accept = Some(value.to_string()),
            "Content-Type" => self.content_type = Some(value.to_string()),
            "Content-Length" => {
                let length = parse_decimal(value)
                    .ok_or_else(|| ParseError::InvalidContentLength(value.to_string()))?;
                self.content_length = Some(length);
            }
            "Accept-Encoding" => self.accept_encoding = Some(value.to_string()),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// The response encoding selected from `Accept-Encoding`, if any.
    ///
    /// Tokens are compared literally after stripping parameters, so
    /// `gzip;q=1.0` counts and `x-gzip` does not.
    pub fn negotiated_encoding(&self) -> Option<Encoding> {
        let value = self.accept_encoding.as_deref()?;
        value
            .split(',')
            .map(|token| token.split(';').next().unwrap_or("").trim())
            .find_map(|token| token.parse::<Encoding>().ok())
    }
}

/// Parse a Content-Length value: ASCII digits only, surrounding whitespace ignored.
///
/// `str::parse` alone would also accept a leading `+`.
pub(crate) fn parse_decimal(text: &str) -> Option<usize> {
    let digits = text.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Content codings the encoder can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Gzip,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Gzip => "gzip",
        }
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gzip" => Ok(Encoding::Gzip),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media types handlers attach to response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    PlainText,
    OctetStream,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::PlainText => "text/plain",
            ContentType::OctetStream => "application/octet-stream",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
