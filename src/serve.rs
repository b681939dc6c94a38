//! # Serving Entry
//!
//! Resolves which function a frozen registry serves and drives it through
//! the invocation source the configuration selects: the pull loop when a
//! target function is named, the HTTP server otherwise.

use std::io;

use thiserror::Error;

use crate::config::{RuntimeConfig, ServeMode};
use crate::functions::{FunctionError, FunctionRegistry, RegisteredFunction};
use crate::http_server::HttpServer;
use crate::observability::Logger;
use crate::runtime_api::{InvocationLoop, LoopError, RuntimeApiClient};

/// Failures that end the serving phase
#[derive(Debug, Error)]
pub enum ServeError {
    /// No serveable function could be resolved
    #[error(transparent)]
    Function(#[from] FunctionError),

    /// The invocation loop hit a fatal transport failure
    #[error(transparent)]
    Loop(#[from] LoopError),

    /// The HTTP server failed to bind or serve
    #[error("http server error: {0}")]
    Io(#[from] io::Error),
}

/// Resolve the function this process serves.
///
/// With a target name: exact match, else the last unnamed fallback. Without
/// one: a lone registered function serves, else the last unnamed fallback.
pub fn resolve_serving_function<'a>(
    registry: &'a FunctionRegistry,
    target: Option<&str>,
) -> Result<&'a RegisteredFunction, FunctionError> {
    match target {
        Some(name) => registry.resolve_target(name),
        None => {
            if registry.len() == 1 {
                Ok(&registry.list()[0])
            } else {
                registry
                    .last_unnamed()
                    .ok_or_else(|| FunctionError::NotFound("<unnamed>".to_string()))
            }
        }
    }
}

/// Serve a frozen registry until a fatal failure.
///
/// Pull-loop mode never returns `Ok`: the loop runs until a fetch or report
/// failure, which is fatal and propagates here without retry.
pub async fn start(registry: &FunctionRegistry, config: &RuntimeConfig) -> Result<(), ServeError> {
    let function = resolve_serving_function(registry, config.target.as_deref())?.clone();

    match config.mode() {
        ServeMode::PullLoop => {
            Logger::info(
                "WORKER_STARTING",
                &[
                    ("api", &config.runtime_api),
                    ("target", function.name().unwrap_or("<unnamed>")),
                ],
            );
            let client = RuntimeApiClient::new(&config.runtime_api);
            let worker = InvocationLoop::new(client, function);
            Err(ServeError::Loop(worker.run().await))
        }
        ServeMode::Http => {
            let server = HttpServer::new(config.http.clone(), function, config.flush_logs);
            server.start().await?;
            Ok(())
        }
    }
}
