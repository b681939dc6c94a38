//! # Observability
//!
//! Structured logging for the serving loop and fault diagnostics.

pub mod logger;

pub use logger::{Logger, Severity};
