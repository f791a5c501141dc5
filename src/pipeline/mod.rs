//! Dispatch pipeline.
//!
//! # Data Flow
//! ```text
//! Request + initial extension state
//!     → dispatch.rs (build Context)
//!     → middleware.rs chain, in registration order
//!         each element: short-circuit, or await next and post-process
//!     → route matching (routing::trie)
//!         → matched handler, or 404 from the same Context
//!     → handled failures become text responses; others go back to the caller
//! ```

pub mod dispatch;
pub mod middleware;

pub use dispatch::dispatch;
pub use middleware::{BoxFuture, Handler, Middleware, Next};
