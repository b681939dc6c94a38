//! # Function Errors

use thiserror::Error;

use super::guard::Phase;

/// Result type for function operations
pub type FunctionResult<T> = Result<T, FunctionError>;

/// Status label reported for decode failures and abnormal terminations
pub const CRASH_STATUS: &str = "crash";

/// Status label for ordinary execution errors
pub const ERROR_STATUS: &str = "error";

/// Errors produced while adapting or invoking a function
#[derive(Debug, Error)]
pub enum FunctionError {
    /// Malformed function shape, rejected at registration time
    #[error("invalid function signature: {0}")]
    Signature(String),

    /// No function registered under the requested name
    #[error("function not found: {0}")]
    NotFound(String),

    /// A function with this name is already registered
    #[error("function already registered: {0}")]
    AlreadyExists(String),

    /// Malformed input payload; a client error, never a panic
    #[error("error while decoding payload: {0}")]
    Decode(String),

    /// The user function returned an error
    #[error("function error: {0}")]
    Execution(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The response value could not be encoded and is not a raw stream
    #[error("error while encoding response: {0}")]
    Encode(String),

    /// Abnormal termination caught by the fault isolation guard.
    ///
    /// The display text is deliberately generic; the full diagnostic only
    /// goes to the process log stream.
    #[error("a failure occurred during {phase}, see logs for details")]
    Crash {
        /// What was happening when the panic was encountered
        phase: Phase,
    },

    /// Registry misuse or other internal failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl FunctionError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            FunctionError::Decode(_) => 400,
            FunctionError::NotFound(_) => 404,
            FunctionError::AlreadyExists(_) => 409,
            FunctionError::Signature(_)
            | FunctionError::Execution(_)
            | FunctionError::Encode(_)
            | FunctionError::Crash { .. }
            | FunctionError::Internal(_) => 500,
        }
    }

    /// Get the failure-class label set on the status header
    ///
    /// Decode failures and abnormal terminations are classified as `crash`;
    /// an error the user function returned on purpose is classified `error`.
    pub fn status_label(&self) -> &'static str {
        match self {
            FunctionError::Execution(_) => ERROR_STATUS,
            _ => CRASH_STATUS,
        }
    }

    /// Build an execution error from a user function's error value
    pub fn execution<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        FunctionError::Execution(err.into())
    }
}
