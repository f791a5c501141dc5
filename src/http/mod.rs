//! HTTP-facing pieces of the router.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum/hyper, tower-http layers)
//!     → pipeline::dispatch
//!         context.rs (per-request state: params, outgoing headers, extension)
//!         cookie.rs (Cookie / Set-Cookie codec)
//!         middleware/ (CORS)
//!     → response.rs (status + context headers + body)
//!     → Send to client
//! ```

pub mod context;
pub mod cookie;
pub mod middleware;
pub mod response;
pub mod server;

pub use context::Context;
pub use response::{not_found, send_json, send_no_content, send_redirect, send_text, Redirect};
pub use server::HttpServer;
