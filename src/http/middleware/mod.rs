//! Middleware shipped with the crate.

pub mod cors;

pub use cors::Cors;
