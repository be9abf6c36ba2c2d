//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     (method, "/echo/{message}", handler)
//!     → pattern.rs (escape literals, capture placeholders, anchor)
//!     → router.rs (append Endpoint, registration order = precedence)
//!     → Freeze as immutable Router
//!
//! Incoming Request (method, path)
//!     → router.rs (filter by method, first pattern match)
//!     → Return: Endpoint + captured params, or no match
//! ```
//!
//! # Design Decisions
//! - Patterns compiled at registration, never per request
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod handler;
pub mod pattern;
pub mod router;

pub use handler::Handler;
pub use pattern::{PathPattern, PatternError};
pub use router::{Endpoint, RouteMatch, Router, RouterBuilder};
