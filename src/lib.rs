//! Minimal HTTP/1.1 server engine.
//!
//! One request per connection: read and parse the request, match it against
//! a route table of `{name}` patterns, run the handler with a populated
//! [`RequestContext`](http::RequestContext), and write one encoded response
//! (gzip when the client accepts it).

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod routing;

// Application
pub mod handlers;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ServerConfig;
pub use http::{Dispatcher, HttpServer, RequestContext, Response, Status};
pub use lifecycle::Shutdown;
pub use routing::Router;
