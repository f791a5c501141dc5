//! Switchyard: a small HTTP router and middleware-dispatch core.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod routing;

pub use config::ServerConfig;
pub use error::{create_error, Error, Result};
pub use http::{Context, HttpServer};
pub use lifecycle::Shutdown;
pub use pipeline::{dispatch, BoxFuture, Handler, Middleware, Next};
pub use routing::Router;
