//! Stateless handlers: ping, echo and user-agent.

use crate::http::{ContextError, RequestContext, Response, Status};

/// `GET /` answers with a bare 200.
pub async fn ping(_ctx: RequestContext) -> Response {
    Response::empty(Status::Ok)
}

/// `GET /echo/{message}` answers with the captured message.
pub async fn echo(ctx: RequestContext) -> Response {
    match ctx.param("message") {
        Ok(message) => Response::text(message),
        // The route always captures it, so a miss is a registration bug.
        Err(e) => {
            tracing::error!(error = %e, "Echo handler registered without a message param");
            Response::internal_error()
        }
    }
}

/// `GET /user-agent` answers with the client's User-Agent header.
pub async fn user_agent(ctx: RequestContext) -> Response {
    match ctx.user_agent() {
        Ok(agent) => Response::text(agent),
        Err(ContextError::Missing(_)) => Response::bad_request(),
        Err(e) => {
            tracing::error!(error = %e, "Unexpected context error");
            Response::internal_error()
        }
    }
}
