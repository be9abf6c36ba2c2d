//! Route table and lookup.
//!
//! # Responsibilities
//! - Compile patterns once, at registration
//! - Look up the endpoint for a method and path
//! - Return matched endpoint with captured parameters, or explicit no-match
//!
//! # Design Decisions
//! - Immutable after `build()` (shared across tasks without locks)
//! - O(n) scan in registration order; first match wins
//! - Method filter applied before any pattern is tested

use std::fmt;
use std::sync::Arc;

use crate::http::Method;
use crate::routing::handler::Handler;
use crate::routing::pattern::{PathPattern, PatternError};

/// A registered (method, pattern, handler) entry.
pub struct Endpoint {
    method: Method,
    pattern: PathPattern,
    handler: Arc<dyn Handler>,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub endpoint: &'a Endpoint,
    /// Captured values paired with their placeholder names, in declaration order.
    pub params: Vec<(&'a str, String)>,
}

/// Ordered, immutable route table.
#[derive(Debug, Default)]
pub struct Router {
    endpoints: Vec<Endpoint>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// Find the first endpoint registered for `method` whose pattern matches `path`.
    pub fn match_route(&self, method: Method, path: &str) -> Option<RouteMatch<'_>> {
        self.endpoints
            .iter()
            .filter(|endpoint| endpoint.method == method)
            .find_map(|endpoint| {
                let values = endpoint.pattern.captures(path)?;
                let params = endpoint
                    .pattern
                    .param_names()
                    .iter()
                    .map(String::as_str)
                    .zip(values)
                    .collect();
                Some(RouteMatch { endpoint, params })
            })
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// Collects endpoints before the table is frozen.
#[derive(Default)]
pub struct RouterBuilder {
    endpoints: Vec<Endpoint>,
}

impl RouterBuilder {
    /// Register `handler` for `method` and `pattern`.
    ///
    /// Registration order is match precedence.
    pub fn route<H: Handler>(
        mut self,
        method: Method,
        pattern: &str,
        handler: H,
    ) -> Result<Self, PatternError> {
        let pattern = PathPattern::compile(pattern)?;
        tracing::debug!(
            method = %method,
            pattern = %pattern.as_str(),
            params = ?pattern.param_names(),
            "Route registered"
        );
        self.endpoints.push(Endpoint {
            method,
            pattern,
            handler: Arc::new(handler),
        });
        Ok(self)
    }

    pub fn get<H: Handler>(self, pattern: &str, handler: H) -> Result<Self, PatternError> {
        self.route(Method::Get, pattern, handler)
    }

    pub fn post<H: Handler>(self, pattern: &str, handler: H) -> Result<Self, PatternError> {
        self.route(Method::Post, pattern, handler)
    }

    pub fn build(self) -> Router {
        Router {
            endpoints: self.endpoints,
        }
    }
}
