//! Route registration and composition.
//!
//! # Responsibilities
//! - Register handlers under method + path patterns
//! - Register pre-handlers and wrapping middleware in order
//! - Mount one router into another
//!
//! # Design Decisions
//! - Built once at startup, immutable while serving (shared via Arc, no locks)
//! - Path patterns are used verbatim: `/`-delimited, `:name` captures, nothing else
//! - Re-registering a route replaces the previous handler
//! - Mounting merges tries with the mounted router winning on conflicts, and
//!   appends the mounted chain after the host's

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;

use crate::error::Result;
use crate::http::context::Context;
use crate::pipeline::dispatch::dispatch;
use crate::pipeline::middleware::{
    Before, BoxFuture, Chain, Handler, Middleware, Next, RouteTable,
};

/// Routing table plus the ordered chain run before it.
///
/// Name the extension type when constructing, so closures registered
/// afterwards see a concrete `Context<T>`:
///
/// ```
/// use axum::http::StatusCode;
/// use switchyard::{http::send_text, Router};
///
/// let router = Router::<u32>::new().get("/count", |ctx| {
///     Box::pin(async move {
///         let body = ctx.to_string();
///         Ok(send_text(ctx, &body, StatusCode::OK))
///     })
/// });
/// assert_eq!(router.route_keys(), vec!["GET/count"]);
/// ```
pub struct Router<T> {
    routes: RouteTable<T>,
    chain: Chain<T>,
}

impl<T: Send + 'static> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Router<T> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.clone(),
            chain: self.chain.clone(),
        }
    }
}

impl<T: Send + 'static> Router<T> {
    pub fn new() -> Self {
        Self {
            routes: RouteTable::new(),
            chain: Vec::new(),
        }
    }

    /// Register any [`Handler`] implementation.
    pub fn insert<H: Handler<T>>(mut self, method: Method, path: &str, handler: H) -> Self {
        self.insert_shared(&method, path, Arc::new(handler));
        self
    }

    fn insert_shared(&mut self, method: &Method, path: &str, handler: Arc<dyn Handler<T>>) {
        let key = format!("{method}{path}");
        tracing::trace!(route = %key, "Registering route");
        self.routes.insert(&key, handler);
    }

    /// Register a closure handler for one method.
    pub fn route<F>(self, method: Method, path: &str, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<T>) -> BoxFuture<'a, Result<Response>>
            + Send
            + Sync
            + 'static,
    {
        self.insert(method, path, handler)
    }

    /// Register one handler for several methods.
    pub fn on<F>(mut self, methods: &[Method], path: &str, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<T>) -> BoxFuture<'a, Result<Response>>
            + Send
            + Sync
            + 'static,
    {
        let handler: Arc<dyn Handler<T>> = Arc::new(handler);
        for method in methods {
            self.insert_shared(method, path, handler.clone());
        }
        self
    }

    pub fn get<F>(self, path: &str, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<T>) -> BoxFuture<'a, Result<Response>>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::GET, path, handler)
    }

    pub fn head<F>(self, path: &str, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<T>) -> BoxFuture<'a, Result<Response>>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::HEAD, path, handler)
    }

    pub fn post<F>(self, path: &str, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<T>) -> BoxFuture<'a, Result<Response>>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::POST, path, handler)
    }

    pub fn put<F>(self, path: &str, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<T>) -> BoxFuture<'a, Result<Response>>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::PUT, path, handler)
    }

    pub fn delete<F>(self, path: &str, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<T>) -> BoxFuture<'a, Result<Response>>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::DELETE, path, handler)
    }

    pub fn connect<F>(self, path: &str, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<T>) -> BoxFuture<'a, Result<Response>>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::CONNECT, path, handler)
    }

    pub fn options<F>(self, path: &str, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<T>) -> BoxFuture<'a, Result<Response>>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::OPTIONS, path, handler)
    }

    pub fn patch<F>(self, path: &str, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<T>) -> BoxFuture<'a, Result<Response>>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::PATCH, path, handler)
    }

    /// Append a pre-handler. Returning `Some(response)` ends dispatch with that
    /// response; `None` continues with the next element.
    pub fn before<F>(self, handler: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<T>) -> BoxFuture<'a, Result<Option<Response>>>
            + Send
            + Sync
            + 'static,
    {
        self.layer(Before(handler))
    }

    /// Append a closure middleware that receives the rest of the chain.
    pub fn wrap<F>(self, middleware: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context<T>, Next<'a, T>) -> BoxFuture<'a, Result<Response>>
            + Send
            + Sync
            + 'static,
    {
        self.layer(middleware)
    }

    /// Append any [`Middleware`] implementation.
    pub fn layer<M: Middleware<T>>(mut self, middleware: M) -> Self {
        self.chain.push(Arc::new(middleware));
        self
    }

    /// Mount `other` into this router.
    ///
    /// Routes are merged with `other` overriding equal keys; `other`'s chain
    /// runs after this router's chain.
    pub fn mount(mut self, other: Router<T>) -> Self {
        self.routes = self.routes.merge(&other.routes);
        self.chain.extend(other.chain);
        self
    }

    /// Dispatch a request through this router.
    pub async fn handle(&self, request: Request<Body>, ext: T) -> Result<Response> {
        dispatch(self, request, ext).await
    }

    /// Registered route keys, e.g. `GET/users/:id`.
    pub fn route_keys(&self) -> Vec<String> {
        self.routes.routes()
    }

    pub(crate) fn routes(&self) -> &RouteTable<T> {
        &self.routes
    }

    pub(crate) fn chain(&self) -> &[Arc<dyn Middleware<T>>] {
        &self.chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::send_text;
    use axum::http::StatusCode;

    fn ok<'a>(ctx: &'a mut Context<()>) -> BoxFuture<'a, Result<Response>> {
        Box::pin(async move { Ok(send_text(ctx, "ok", StatusCode::OK)) })
    }

    #[test]
    fn test_method_wrappers_register_keys() {
        let router = Router::<()>::new()
            .get("/r", ok)
            .head("/r", ok)
            .post("/r", ok)
            .put("/r", ok)
            .delete("/r", ok)
            .connect("/r", ok)
            .options("/r", ok)
            .patch("/r", ok);

        assert_eq!(
            router.route_keys(),
            vec![
                "CONNECT/r", "DELETE/r", "GET/r", "HEAD/r", "OPTIONS/r", "PATCH/r", "POST/r",
                "PUT/r",
            ]
        );
    }

    #[test]
    fn test_on_registers_each_method() {
        let router = Router::<()>::new().on(&[Method::GET, Method::POST], "/items/:id", ok);
        assert_eq!(router.route_keys(), vec!["GET/items/:id", "POST/items/:id"]);
    }

    #[test]
    fn test_mount_merges_routes_and_chain() {
        let host = Router::<()>::new()
            .get("/a", ok)
            .before(|_ctx| Box::pin(async move { Ok(None) }));
        let child = Router::<()>::new()
            .get("/b", ok)
            .before(|_ctx| Box::pin(async move { Ok(None) }));

        let mounted = host.mount(child);
        assert_eq!(mounted.route_keys(), vec!["GET/a", "GET/b"]);
        assert_eq!(mounted.chain().len(), 2);
    }
}
