//! # Invocation
//!
//! One schedulable unit of work pulled from the invocation source. Consumed
//! exactly once by the loop and discarded after its outcome is reported.

/// A unit of work handed out by the invocation API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Opaque identifier assigned by the invocation source
    pub id: String,

    /// Raw payload bytes
    pub payload: Vec<u8>,
}

impl Invocation {
    /// Create an invocation
    pub fn new(id: impl Into<String>, payload: Vec<u8>) -> Self {
        Self { id: id.into(), payload }
    }
}
