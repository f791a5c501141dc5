//! CORS middleware.
//! Sets the Access-Control-* response headers and answers preflight requests.

use std::sync::Arc;

use axum::http::Method;
use axum::response::Response;

use crate::config::CorsConfig;
use crate::error::Result;
use crate::http::context::Context;
use crate::http::response::send_no_content;
use crate::pipeline::middleware::{BoxFuture, Middleware, Next};

type OriginFn<T> = Arc<dyn Fn(&Context<T>) -> String + Send + Sync>;

enum Origin<T> {
    Static(String),
    Dynamic(OriginFn<T>),
}

/// CORS policy applied to every request passing through the chain.
pub struct Cors<T> {
    origin: Origin<T>,
    allow_methods: Vec<String>,
    allow_headers: Vec<String>,
    expose_headers: Vec<String>,
    credentials: bool,
    max_age: Option<u64>,
}

impl<T> Default for Cors<T> {
    fn default() -> Self {
        Self {
            origin: Origin::Static("*".to_string()),
            allow_methods: ["GET", "HEAD", "PUT", "POST", "DELETE", "PATCH"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            allow_headers: Vec::new(),
            expose_headers: Vec::new(),
            credentials: false,
            max_age: None,
        }
    }
}

impl<T> Cors<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `[cors]` config section.
    pub fn from_config(config: &CorsConfig) -> Self {
        Self {
            origin: Origin::Static(config.origin.clone()),
            allow_methods: config.allow_methods.clone(),
            allow_headers: config.allow_headers.clone(),
            expose_headers: config.expose_headers.clone(),
            credentials: config.credentials,
            max_age: config.max_age_secs,
        }
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Origin::Static(origin.into());
        self
    }

    /// Compute the allowed origin per request.
    pub fn origin_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<T>) -> String + Send + Sync + 'static,
    {
        self.origin = Origin::Dynamic(Arc::new(f));
        self
    }

    pub fn allow_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn allow_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    pub fn expose_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expose_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    pub fn credentials(mut self, credentials: bool) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn max_age(mut self, secs: u64) -> Self {
        self.max_age = Some(secs);
        self
    }

    fn resolve_origin(&self, ctx: &Context<T>) -> String {
        match &self.origin {
            Origin::Static(origin) => origin.clone(),
            Origin::Dynamic(f) => f(ctx),
        }
    }
}

impl<T: Send + 'static> Middleware<T> for Cors<T> {
    fn handle<'a>(
        &'a self,
        ctx: &'a mut Context<T>,
        next: Next<'a, T>,
    ) -> BoxFuture<'a, Result<Response>> {
        Box::pin(async move {
            // 1. Headers sent on every response
            let origin = self.resolve_origin(ctx);
            ctx.set_header("Access-Control-Allow-Origin", &origin)?;

            if !self.expose_headers.is_empty() {
                ctx.set_header(
                    "Access-Control-Expose-Headers",
                    &self.expose_headers.join(", "),
                )?;
            }

            if self.credentials {
                ctx.set_header("Access-Control-Allow-Credentials", "true")?;
            }

            // 2. Preflight: answer here, never reaches routing
            if ctx.method() == Method::OPTIONS {
                if !self.allow_headers.is_empty() {
                    ctx.set_header("Access-Control-Allow-Headers", &self.allow_headers.join(", "))?;
                }
                if !self.allow_methods.is_empty() {
                    ctx.set_header("Access-Control-Allow-Methods", &self.allow_methods.join(", "))?;
                }
                if let Some(max_age) = self.max_age {
                    ctx.set_header("Access-Control-Max-Age", &max_age.to_string())?;
                }
                return Ok(send_no_content(ctx));
            }

            next.run(ctx).await
        })
    }
}
