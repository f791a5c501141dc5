//! Chain elements and the continuation that links them.
//!
//! # Responsibilities
//! - Define route handlers (`Handler`) and chain elements (`Middleware`)
//! - Provide `Next`, the bound "rest of the chain" a middleware may await
//! - Adapt short-circuit pre-handlers into chain elements
//!
//! # Design Decisions
//! - Every element borrows the request context mutably for its own duration;
//!   after `next.run(ctx)` returns, the caller owns the context again and can
//!   post-process the response
//! - `Next` is a slice cursor, so the chain is never rebuilt per request
//! - Closures get blanket impls; structs implement the traits directly

use std::sync::Arc;

use axum::response::Response;
pub use futures_util::future::BoxFuture;

use crate::error::Result;
use crate::http::context::Context;
use crate::pipeline::dispatch;
use crate::routing::trie::Trie;

/// Terminal handler for a matched route.
pub trait Handler<T>: Send + Sync + 'static {
    fn call<'a>(&'a self, ctx: &'a mut Context<T>) -> BoxFuture<'a, Result<Response>>;
}

impl<T, F> Handler<T> for F
where
    F: for<'a> Fn(&'a mut Context<T>) -> BoxFuture<'a, Result<Response>> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, ctx: &'a mut Context<T>) -> BoxFuture<'a, Result<Response>> {
        self(ctx)
    }
}

/// Element of the dispatch chain.
///
/// Returning without calling `next` short-circuits everything after this
/// element, route matching included.
pub trait Middleware<T>: Send + Sync + 'static {
    fn handle<'a>(
        &'a self,
        ctx: &'a mut Context<T>,
        next: Next<'a, T>,
    ) -> BoxFuture<'a, Result<Response>>;
}

impl<T, F> Middleware<T> for F
where
    F: for<'a> Fn(&'a mut Context<T>, Next<'a, T>) -> BoxFuture<'a, Result<Response>>
        + Send
        + Sync
        + 'static,
{
    fn handle<'a>(
        &'a self,
        ctx: &'a mut Context<T>,
        next: Next<'a, T>,
    ) -> BoxFuture<'a, Result<Response>> {
        self(ctx, next)
    }
}

pub(crate) type RouteTable<T> = Trie<Arc<dyn Handler<T>>>;
pub(crate) type Chain<T> = Vec<Arc<dyn Middleware<T>>>;

/// The remainder of the chain after the current element.
pub struct Next<'a, T> {
    chain: &'a [Arc<dyn Middleware<T>>],
    routes: &'a RouteTable<T>,
}

impl<'a, T: Send + 'static> Next<'a, T> {
    pub(crate) fn new(chain: &'a [Arc<dyn Middleware<T>>], routes: &'a RouteTable<T>) -> Self {
        Self { chain, routes }
    }

    /// Run the rest of the chain, ending with route matching.
    pub fn run<'b>(self, ctx: &'b mut Context<T>) -> BoxFuture<'b, Result<Response>>
    where
        'a: 'b,
    {
        match self.chain.split_first() {
            Some((head, rest)) => head.handle(
                ctx,
                Next {
                    chain: rest,
                    routes: self.routes,
                },
            ),
            None => dispatch::route(self.routes, ctx),
        }
    }

    /// Elements still ahead, not counting route matching.
    pub fn remaining(&self) -> usize {
        self.chain.len()
    }
}

/// Pre-handler adapter: `Some(response)` short-circuits, `None` continues.
pub(crate) struct Before<F>(pub(crate) F);

impl<T, F> Middleware<T> for Before<F>
where
    T: Send + 'static,
    F: for<'a> Fn(&'a mut Context<T>) -> BoxFuture<'a, Result<Option<Response>>>
        + Send
        + Sync
        + 'static,
{
    fn handle<'a>(
        &'a self,
        ctx: &'a mut Context<T>,
        next: Next<'a, T>,
    ) -> BoxFuture<'a, Result<Response>> {
        Box::pin(async move {
            if let Some(response) = (self.0)(ctx).await? {
                return Ok(response);
            }
            next.run(ctx).await
        })
    }
}
