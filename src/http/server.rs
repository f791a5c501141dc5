//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Host a `Router` on axum/hyper (HTTP/1.1 and HTTP/2)
//! - Wire up tower-http layers (tracing, timeout, body limit)
//! - Install the configured CORS policy ahead of the application chain
//! - Hand every request to the dispatch pipeline
//! - Convert unhandled failures into 500 so the connection is always answered
//!
//! # Design Decisions
//! - The route table is frozen before the listener accepts anything
//! - Each request gets a fresh clone of the initial extension state

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::middleware::Cors;
use crate::lifecycle::shutdown;
use crate::pipeline::dispatch;
use crate::routing::Router;

/// HTTP server hosting a router.
pub struct HttpServer<T> {
    router: Arc<Router<T>>,
    config: ServerConfig,
    state: T,
}

impl<T> HttpServer<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a server for `router`; `state` seeds every request's context.
    pub fn new(config: ServerConfig, router: Router<T>, state: T) -> Self {
        let router = if config.cors.enabled {
            Router::<T>::new()
                .layer(Cors::<T>::from_config(&config.cors))
                .mount(router)
        } else {
            router
        };

        Self {
            router: Arc::new(router),
            config,
            state,
        }
    }

    /// Build the axum application with all middleware layers.
    #[allow(deprecated)]
    pub fn app(&self) -> axum::Router {
        let router = self.router.clone();
        let state = self.state.clone();

        axum::Router::new()
            .fallback(move |request: Request<Body>| {
                let router = router.clone();
                let state = state.clone();
                async move { forward(router, request, state).await }
            })
            .layer(RequestBodyLimitLayer::new(self.config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.timeouts.request_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let routes = self.router.route_keys();
        tracing::info!(
            address = %addr,
            routes = routes.len(),
            "HTTP server starting"
        );
        for route in &routes {
            tracing::debug!(route = %route, "Route registered");
        }

        axum::serve(listener, self.app())
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

async fn forward<T: Send + 'static>(
    router: Arc<Router<T>>,
    request: Request<Body>,
    state: T,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match dispatch(&router, request, state).await {
        Ok(response) => {
            tracing::debug!(
                method = %method,
                path = %path,
                status = response.status().as_u16(),
                "Request served"
            );
            response
        }
        Err(e) => {
            tracing::error!(method = %method, path = %path, error = %e, "Unhandled failure");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
