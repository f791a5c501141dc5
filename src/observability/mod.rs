//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatch / server / startup produce:
//!     → tracing events with method, path, status fields
//!     → logging.rs subscriber (stdout, text or JSON)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Handled failures log at warn, unhandled at error, matching at debug

pub mod logging;
