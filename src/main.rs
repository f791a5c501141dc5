//! Switchyard demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum/hyper ──▶ tower-http layers ──▶ dispatch
//!                                                           │
//!                          ┌────────────────────────────────┘
//!                          ▼
//!                 ┌──────────────────┐   short-circuit   ┌──────────┐
//!                 │ middleware chain │ ─────────────────▶│ response │
//!                 │ (cors, timing,   │                   └──────────┘
//!                 │  auth)           │
//!                 └────────┬─────────┘
//!                          ▼
//!                 ┌──────────────────┐   no match        ┌──────────┐
//!                 │   route trie     │ ─────────────────▶│   404    │
//!                 └────────┬─────────┘                   └──────────┘
//!                          ▼
//!                      handler
//! ```

use std::path::PathBuf;
use std::time::Instant;

use axum::http::{HeaderValue, StatusCode};
use clap::Parser;
use serde::Serialize;
use tokio::net::TcpListener;

use switchyard::config::{self, ServerConfig};
use switchyard::http::{send_json, send_text};
use switchyard::lifecycle::{signals, Shutdown};
use switchyard::observability::logging;
use switchyard::{create_error, HttpServer, Router};

#[derive(Debug, Parser)]
#[command(name = "switchyard", version, about = "Switchyard demo HTTP server")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

/// Extension state cloned into every request context.
#[derive(Clone)]
struct AppState {
    api_key: Option<String>,
}

#[derive(Serialize)]
struct Status {
    version: &'static str,
    status: &'static str,
}

fn api_router() -> Router<AppState> {
    Router::<AppState>::new()
        .before(|ctx| {
            Box::pin(async move {
                if !ctx.uri().path().starts_with("/admin") {
                    return Ok(None);
                }
                let Some(expected) = ctx.api_key.clone() else {
                    return Ok(None);
                };
                match ctx.request_header("authorization") {
                    Some(value) if value == format!("Bearer {expected}") => Ok(None),
                    _ => Err(create_error("Unauthorized", StatusCode::UNAUTHORIZED)),
                }
            })
        })
        .get("/admin/status", |ctx| {
            Box::pin(async move {
                let status = Status {
                    version: env!("CARGO_PKG_VERSION"),
                    status: "operational",
                };
                send_json(ctx, &status, StatusCode::OK)
            })
        })
}

fn app() -> Router<AppState> {
    Router::<AppState>::new()
        .wrap(|ctx, next| {
            Box::pin(async move {
                let started = Instant::now();
                let mut response = next.run(ctx).await?;
                let elapsed = format!("{}us", started.elapsed().as_micros());
                if let Ok(value) = HeaderValue::from_str(&elapsed) {
                    response.headers_mut().insert("x-response-time", value);
                }
                Ok(response)
            })
        })
        .get("/", |ctx| {
            Box::pin(async move { Ok(send_text(ctx, "switchyard", StatusCode::OK)) })
        })
        .get("/health", |ctx| {
            Box::pin(async move { send_json(ctx, &serde_json::json!({ "status": "ok" }), StatusCode::OK) })
        })
        .get("/hello/:name", |ctx| {
            Box::pin(async move {
                let name = ctx.param("name").unwrap_or("world").to_string();
                Ok(send_text(ctx, format!("Hello, {name}!"), StatusCode::OK))
            })
        })
        .mount(api_router())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.logging)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        cors = config.cors.enabled,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let state = AppState {
        api_key: std::env::var("SWITCHYARD_API_KEY").ok(),
    };
    let server = HttpServer::new(config, app(), state);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
