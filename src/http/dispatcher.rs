//! Per-connection request dispatch.
//!
//! # Responsibilities
//! - Read one request from the connection
//! - Match it against the route table
//! - Populate a fresh [`RequestContext`] and run the handler
//! - Encode the handler's response and write it once
//!
//! # State Machine
//! ```text
//! Idle → Reading → Matching → Handling → Done
//!          │          │
//!          │          └─ no route → 404 → Done
//!          └─ parse error → Failed
//! ```
//!
//! # Design Decisions
//! - Exactly one request per connection; no further reads after Done/Failed
//! - Handlers return a value; the dispatcher owns the single socket write
//! - Closing the connection is left to the accept loop

use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use super::context::RequestContext;
use super::error::DispatchError;
use super::method::Method;
use super::request::{read_request, ReadLimits, Request};
use super::response::Response;
use super::status::Status;
use crate::observability::metrics;
use crate::routing::{RouteMatch, Router};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Reading,
    Matching,
    Handling,
    Done,
    Failed,
}

/// Serves single-request connections against a shared route table.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
    limits: ReadLimits,
}

impl Dispatcher {
    pub fn new(router: Arc<Router>, limits: ReadLimits) -> Self {
        Self { router, limits }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Serve one request on `stream` and return the status written.
    pub async fn serve<S>(&self, stream: &mut S) -> Result<Status, DispatchError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let start = Instant::now();
        let mut state = DispatchState::Idle;

        advance(&mut state, DispatchState::Reading);
        let parsed = {
            let mut reader = BufReader::new(&mut *stream);
            read_request(&mut reader, &self.limits).await
        };
        let request = match parsed {
            Ok(request) => request,
            Err(e) => {
                advance(&mut state, DispatchState::Failed);
                metrics::record_parse_error();
                if e.is_io() {
                    tracing::debug!(error = %e, "Connection dropped before a full request");
                } else {
                    tracing::warn!(error = %e, "Rejecting unparseable request");
                    // Best effort; the connection is abandoned either way.
                    let _ = write_response(stream, Response::bad_request()).await;
                }
                return Err(e.into());
            }
        };

        let method = request.method();
        tracing::debug!(method = %method, path = %request.path(), "Request received");

        let response = self.dispatch(&request, &mut state).await;
        let status = response.status();

        if let Err(e) = write_response(stream, response).await {
            advance(&mut state, DispatchState::Failed);
            tracing::warn!(error = %e, "Failed to write response");
            return Err(DispatchError::Write(e));
        }
        advance(&mut state, DispatchState::Done);

        tracing::info!(
            method = %method,
            path = %request.path(),
            status = status.code(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Request served"
        );
        metrics::record_request(method.as_str(), status.code(), start);
        Ok(status)
    }

    /// Route an already-parsed request and produce its response.
    pub async fn respond(&self, request: &Request) -> Response {
        let mut state = DispatchState::Reading;
        self.dispatch(request, &mut state).await
    }

    async fn dispatch(&self, request: &Request, state: &mut DispatchState) -> Response {
        advance(state, DispatchState::Matching);
        let Some(route) = self.router.match_route(request.method(), request.path()) else {
            tracing::debug!(method = %request.method(), path = %request.path(), "No route matched");
            return Response::not_found();
        };

        advance(state, DispatchState::Handling);
        let ctx = build_context(request, &route);
        let negotiated = ctx.encoding().ok();
        route
            .endpoint
            .handler()
            .call(ctx)
            .await
            .with_encoding(negotiated)
    }
}

/// Fill a fresh context from the parsed request and the route captures.
fn build_context(request: &Request, route: &RouteMatch<'_>) -> RequestContext {
    let mut ctx = RequestContext::new();
    for (name, value) in &route.params {
        ctx.set_param(*name, value.clone());
    }

    let headers = request.headers();
    if let Some(user_agent) = &headers.user_agent {
        ctx.set_user_agent(user_agent.clone());
    }
    if request.method() == Method::Post {
        if let Some(content_type) = &headers.content_type {
            ctx.set_content_type(content_type.clone());
        }
        if let Some(length) = headers.content_length {
            ctx.set_content_length(length);
        }
        ctx.set_request_body(request.body().to_vec());
    }
    if let Some(encoding) = headers.negotiated_encoding() {
        ctx.set_encoding(encoding.as_str());
    }
    ctx
}

async fn write_response<W>(stream: &mut W, response: Response) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    stream.write_all(&response.encode()).await?;
    stream.flush().await
}

fn advance(state: &mut DispatchState, next: DispatchState) {
    tracing::trace!(from = ?state, to = ?next, "Dispatch state");
    *state = next;
}
