//! Response construction from a request context.
//!
//! # Responsibilities
//! - Build status + body responses for handlers and middleware
//! - Attach every header accumulated on the context
//!
//! # Design Decisions
//! - Content-Type is set on the context first, so it also survives into
//!   any later response built from the same context
//! - Bodies are opaque; no streaming beyond what `Body` already does

use axum::body::Body;
use axum::http::header::{self, HeaderValue};
use axum::http::StatusCode;
use axum::response::Response;
use serde::Serialize;

use crate::error::Result;
use crate::http::context::Context;

/// Redirect status accepted by [`send_redirect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Redirect {
    MovedPermanently,
    #[default]
    Found,
}

impl From<Redirect> for StatusCode {
    fn from(redirect: Redirect) -> Self {
        match redirect {
            Redirect::MovedPermanently => StatusCode::MOVED_PERMANENTLY,
            Redirect::Found => StatusCode::FOUND,
        }
    }
}

fn build<T>(ctx: &Context<T>, status: StatusCode, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = ctx.headers().clone();
    response
}

/// Plaintext response.
pub fn send_text<T>(ctx: &mut Context<T>, text: impl Into<String>, status: StatusCode) -> Response {
    ctx.headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    build(ctx, status, Body::from(text.into()))
}

/// JSON response.
pub fn send_json<T, V>(ctx: &mut Context<T>, value: &V, status: StatusCode) -> Result<Response>
where
    V: Serialize + ?Sized,
{
    let body = serde_json::to_vec(value)?;
    ctx.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Ok(build(ctx, status, Body::from(body)))
}

/// Empty-bodied redirect to `location`.
pub fn send_redirect<T>(ctx: &mut Context<T>, location: &str, redirect: Redirect) -> Result<Response> {
    ctx.headers_mut()
        .insert(header::LOCATION, HeaderValue::from_str(location)?);
    Ok(build(ctx, redirect.into(), Body::empty()))
}

/// 204 with no body.
pub fn send_no_content<T>(ctx: &mut Context<T>) -> Response {
    build(ctx, StatusCode::NO_CONTENT, Body::empty())
}

/// The response dispatch produces when no route matches.
pub fn not_found<T>(ctx: &mut Context<T>) -> Response {
    send_text(ctx, "Not Found", StatusCode::NOT_FOUND)
}
