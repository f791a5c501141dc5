//! Request dispatch.
//!
//! # Responsibilities
//! - Build the per-request context
//! - Run the chain in registration order, then route matching
//! - Translate handled failures into plaintext responses
//!
//! # Design Decisions
//! - Strictly sequential per request; no stage runs concurrently with another
//! - A handled failure (`Error::Http`) never leaves `dispatch`; its response
//!   carries every header accumulated on the context so far
//! - Any other failure is returned to the caller untouched
//! - No retries; one pass per request

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::error::{Error, Result};
use crate::http::context::Context;
use crate::http::response::{not_found, send_text};
use crate::pipeline::middleware::{BoxFuture, Next, RouteTable};
use crate::routing::router::Router;

/// Dispatch `request` through `router` with `ext` as the context extension.
pub async fn dispatch<T: Send + 'static>(
    router: &Router<T>,
    request: Request<Body>,
    ext: T,
) -> Result<Response> {
    let mut ctx = Context::new(request, ext);

    let result = Next::new(router.chain(), router.routes())
        .run(&mut ctx)
        .await;

    match result {
        Ok(response) => Ok(response),
        Err(Error::Http { message, status }) => {
            tracing::warn!(
                method = %ctx.method(),
                path = %ctx.uri().path(),
                status = status.as_u16(),
                message = %message,
                "Request failed"
            );
            Ok(send_text(&mut ctx, message, status))
        }
        Err(err) => {
            tracing::error!(
                method = %ctx.method(),
                path = %ctx.uri().path(),
                error = %err,
                "Unhandled failure during dispatch"
            );
            Err(err)
        }
    }
}

/// Final chain step: match `method + path` and run the handler, or 404.
pub(crate) fn route<'a, T: Send + 'static>(
    routes: &'a RouteTable<T>,
    ctx: &'a mut Context<T>,
) -> BoxFuture<'a, Result<Response>> {
    Box::pin(async move {
        let key = format!("{}{}", ctx.method(), ctx.uri().path());

        match routes.lookup(&key) {
            Some(matched) => {
                tracing::debug!(route = %key, parameters = matched.parameters.len(), "Route matched");
                ctx.set_parameters(matched.parameters);
                matched.value.call(ctx).await
            }
            None => {
                tracing::debug!(route = %key, "No route matched");
                Ok(not_found(ctx))
            }
        }
    })
}
