//! Per-request context handed to handlers.
//!
//! A context lives for exactly one request/response cycle. It is built by
//! the dispatcher, moved into the handler, and dropped when the handler
//! returns. Every getter reports a missing value as an error rather than a
//! default, so handlers decide which status a gap maps to.

use super::error::{ContextError, ContextResult};
use super::headers::{parse_decimal, Encoding};

#[derive(Debug, Default)]
pub struct RequestContext {
    /// Path parameters in placeholder declaration order.
    params: Vec<(String, String)>,
    user_agent: Option<String>,
    content_type: Option<String>,
    content_length: Option<usize>,
    request_body: Option<Vec<u8>>,
    /// Raw token as recorded; validated on read.
    encoding: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a path parameter. A repeated name overwrites the earlier value.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
    }

    pub fn param(&self, name: &str) -> ContextResult<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| ContextError::Missing(format!("param {name}")))
    }

    /// All path parameters in declaration order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = Some(user_agent.into());
    }

    pub fn user_agent(&self) -> ContextResult<&str> {
        self.user_agent
            .as_deref()
            .ok_or_else(|| ContextError::Missing("user-agent".into()))
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = Some(content_type.into());
    }

    pub fn content_type(&self) -> ContextResult<&str> {
        self.content_type
            .as_deref()
            .ok_or_else(|| ContextError::Missing("content-type".into()))
    }

    pub fn set_content_length(&mut self, length: usize) {
        self.content_length = Some(length);
    }

    /// Record a content length from raw header text.
    pub fn set_content_length_text(&mut self, text: &str) -> ContextResult<()> {
        let length = parse_decimal(text)
            .ok_or_else(|| ContextError::InvalidContentLength(text.to_string()))?;
        self.content_length = Some(length);
        Ok(())
    }

    pub fn content_length(&self) -> ContextResult<usize> {
        self.content_length
            .ok_or_else(|| ContextError::Missing("content-length".into()))
    }

    pub fn set_request_body(&mut self, body: impl Into<Vec<u8>>) {
        self.request_body = Some(body.into());
    }

    pub fn request_body(&self) -> ContextResult<&[u8]> {
        self.request_body
            .as_deref()
            .ok_or_else(|| ContextError::Missing("request-body".into()))
    }

    pub fn set_encoding(&mut self, encoding: impl Into<String>) {
        self.encoding = Some(encoding.into());
    }

    /// The negotiated response encoding.
    ///
    /// Fails when nothing was recorded and when the recorded token is
    /// anything other than `gzip`.
    pub fn encoding(&self) -> ContextResult<Encoding> {
        let token = self
            .encoding
            .as_deref()
            .ok_or_else(|| ContextError::Missing("encoding".into()))?;
        token
            .parse::<Encoding>()
            .map_err(ContextError::UnsupportedEncoding)
    }
}
