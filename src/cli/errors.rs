//! CLI errors

use thiserror::Error;

use crate::functions::FunctionError;
use crate::serve::ServeError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors surfaced at the process top level
#[derive(Debug, Error)]
pub enum CliError {
    /// Function registration failed before serving began
    #[error("registration failed: {0}")]
    Registration(#[from] FunctionError),

    /// The async runtime could not be created
    #[error("runtime initialization failed: {0}")]
    Runtime(#[from] std::io::Error),

    /// The serving phase ended with a fatal failure
    #[error(transparent)]
    Serve(#[from] ServeError),
}
