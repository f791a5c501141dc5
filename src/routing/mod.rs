//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     router.rs (method + path pattern, handler)
//!     → trie.rs insert under "METHOD/seg/:param"
//!     → mount: trie merge + chain concatenation
//!     → Freeze as immutable Router
//!
//! Incoming request (method, path):
//!     → trie.rs lookup (greedy, literal before parameter)
//!     → Return: handler + captured parameters, or no match
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path; one hash lookup per segment
//! - Deterministic: same input always matches same route
//! - Last registration wins for identical keys

pub mod router;
pub mod trie;

pub use router::Router;
pub use trie::{Match, Trie};
