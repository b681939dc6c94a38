//! # Invocation Loop
//!
//! Drives the uniform handler against the pull-based invocation source. The
//! loop has two states: polling, where it blocks on the next unit of work and
//! processes it to completion, and terminated, which it enters only when a
//! fetch or report against the source fails. Those transport failures are
//! never retried; the error is returned to the caller, which should exit the
//! process non-zero.
//!
//! One invocation is fully processed (decoded, executed, reported, released)
//! before the next is fetched. Fault isolation is per invocation: a panic in
//! user code is logged, reported as a failed invocation, and the loop keeps
//! polling.

use thiserror::Error;

use crate::functions::{
    isolate, resolve_content_type, FunctionError, InvocationContext, Phase, RegisteredFunction,
};
use crate::observability::Logger;

use super::client::{InvocationApi, InvocationErrorReport, TransportError};
use super::invocation::Invocation;

/// Fatal loop failures; both terminate the loop immediately
#[derive(Debug, Error)]
pub enum LoopError {
    /// Fetching the next invocation failed
    #[error("failed to fetch the next invocation: {0}")]
    Fetch(#[source] TransportError),

    /// Reporting an outcome to the source failed
    #[error("failed to report an invocation outcome: {0}")]
    Report(#[source] TransportError),
}

/// The invocation loop bound to one registered function
pub struct InvocationLoop<A: InvocationApi> {
    api: A,
    function: RegisteredFunction,
}

impl<A: InvocationApi> InvocationLoop<A> {
    /// Bind a function to an invocation source
    pub fn new(api: A, function: RegisteredFunction) -> Self {
        Self { api, function }
    }

    /// Poll and process invocations until a fatal transport failure.
    ///
    /// The returned error is the single fatal condition; execution errors,
    /// decode errors, and crashes inside user code are reported to the
    /// source as failed invocations and do not end the loop.
    pub async fn run(&self) -> LoopError {
        loop {
            let invocation = match self.api.next().await {
                Ok(invocation) => invocation,
                Err(err) => {
                    Logger::error("INVOCATION_FETCH_FAILED", &[("error", &err.to_string())]);
                    return LoopError::Fetch(err);
                }
            };

            if let Err(fatal) = self.handle(invocation).await {
                Logger::error("INVOCATION_REPORT_FAILED", &[("error", &fatal.to_string())]);
                return fatal;
            }
        }
    }

    /// Process one invocation and report its outcome
    async fn handle(&self, invocation: Invocation) -> Result<(), LoopError> {
        let ctx = InvocationContext::with_id(
            invocation.id.clone(),
            self.function.name().map(str::to_string),
        );

        let outcome = isolate(Phase::Execution, || {
            self.function.function().invoke(ctx, &invocation.payload)
        });

        match outcome {
            Ok(response) => {
                let content_type = resolve_content_type(&response).to_string();
                // Drain the response before reporting; the stream behind it is
                // dropped at the end of this scope whether or not the report
                // succeeds, so nothing leaks into the next invocation.
                let body = match response.body.into_bytes() {
                    Ok(body) => body,
                    Err(err) => {
                        let failure =
                            FunctionError::Internal(format!("unreadable response stream: {}", err));
                        return self.report_failure(&invocation.id, &failure).await;
                    }
                };

                self.api
                    .report_success(&invocation.id, body, &content_type)
                    .await
                    .map_err(LoopError::Report)?;

                Logger::info("INVOCATION_COMPLETED", &[("id", &invocation.id)]);
                Ok(())
            }
            Err(err) => self.report_failure(&invocation.id, &err).await,
        }
    }

    /// Report a failed invocation; only a transport failure is fatal
    async fn report_failure(&self, id: &str, err: &FunctionError) -> Result<(), LoopError> {
        let report = InvocationErrorReport::from_function_error(err);
        Logger::error(
            "INVOCATION_FAILED",
            &[
                ("id", id),
                ("error", &report.error_message),
                ("error_type", &report.error_type),
            ],
        );
        self.api
            .report_failure(id, &report)
            .await
            .map_err(LoopError::Report)
    }
}
