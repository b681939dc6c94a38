//! # Signature Descriptor
//!
//! Describes the shape of a registered function: how many logical arguments
//! it takes and whether the first one is the invocation context. Descriptors
//! are computed once at registration time and are immutable afterward, so a
//! malformed shape fails fast before any traffic is served.

use serde::{Deserialize, Serialize};

use super::errors::{FunctionError, FunctionResult};

/// Maximum number of logical arguments a function may take
pub const MAX_ARITY: u8 = 2;

/// The analyzed shape of a registered function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Declared argument count: 0, 1, or 2
    arity: u8,

    /// Whether the first argument is the invocation context
    takes_context: bool,
}

impl Signature {
    /// Validate and build a descriptor.
    ///
    /// Rejects more than two arguments, and a context flag on a function
    /// that declares no arguments at all.
    pub fn new(arity: u8, takes_context: bool) -> FunctionResult<Self> {
        if arity > MAX_ARITY {
            return Err(FunctionError::Signature(format!(
                "handlers may not take more than two arguments, but handler takes {}",
                arity
            )));
        }
        if takes_context && arity == 0 {
            return Err(FunctionError::Signature(
                "handler takes no arguments but claims a context".to_string(),
            ));
        }
        if arity == 2 && !takes_context {
            return Err(FunctionError::Signature(
                "handler takes two arguments, but the first is not the invocation context"
                    .to_string(),
            ));
        }
        Ok(Self { arity, takes_context })
    }

    /// Shape `() -> ...`
    pub fn nullary() -> Self {
        Self { arity: 0, takes_context: false }
    }

    /// Shape `(payload) -> ...`
    pub fn payload_only() -> Self {
        Self { arity: 1, takes_context: false }
    }

    /// Shape `(context, payload) -> ...`
    pub fn context_and_payload() -> Self {
        Self { arity: 2, takes_context: true }
    }

    /// Declared argument count
    pub fn arity(&self) -> u8 {
        self.arity
    }

    /// Whether the first argument is the invocation context
    pub fn takes_context(&self) -> bool {
        self.takes_context
    }

    /// Whether a payload value must be decoded before the call
    pub fn takes_payload(&self) -> bool {
        (self.arity == 1 && !self.takes_context) || self.arity == 2
    }
}
