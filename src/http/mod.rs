//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (request line, fixed header vocabulary, body)
//!     → dispatcher.rs (route lookup, context population, handler call)
//!     → response.rs (framing, optional gzip)
//!     → single write back to the connection
//! ```
//!
//! server.rs owns the accept loop and spawns one dispatcher task per
//! connection.

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod headers;
pub mod method;
pub mod request;
pub mod response;
pub mod server;
pub mod status;

pub use context::RequestContext;
pub use dispatcher::{DispatchState, Dispatcher};
pub use error::{ContextError, DispatchError, ParseError};
pub use headers::{ContentType, Encoding, Headers};
pub use method::Method;
pub use request::{read_request, ReadLimits, Request};
pub use response::Response;
pub use server::HttpServer;
pub use status::Status;
