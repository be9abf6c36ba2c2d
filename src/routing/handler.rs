//! The handler capability stored in each endpoint.

use std::future::Future;

use futures_util::future::{BoxFuture, FutureExt};

use crate::http::{RequestContext, Response};

/// Turns a request context into a response.
///
/// Implemented for any `Fn(RequestContext) -> impl Future<Output = Response>`,
/// so plain `async fn`s and capturing closures can be registered directly.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: RequestContext) -> BoxFuture<'static, Response>;
}

impl<F, Fut> Handler for F
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, ctx: RequestContext) -> BoxFuture<'static, Response> {
        (self)(ctx).boxed()
    }
}
