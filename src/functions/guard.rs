//! # Fault Isolation Guard
//!
//! Per-invocation boundary that converts an abnormal termination inside user
//! code into a structured error. The full diagnostic (panic payload and
//! backtrace) goes to the process error stream; callers only ever see the
//! generic crash message, so internals never leak into a response body or an
//! invocation report.

use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::observability::Logger;

use super::errors::{FunctionError, FunctionResult};

/// What a guarded call was doing when a fault occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Registering a function, before any traffic is served
    Registration,

    /// Running a user function for one invocation
    Execution,
}

impl Phase {
    /// Human-readable phase label used in diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Registration => "function registration",
            Phase::Execution => "user function execution",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Run a fallible call inside the isolation boundary.
///
/// Expected failures (`Err` returns) pass through untouched; only a panic is
/// intercepted, logged in full, and converted to [`FunctionError::Crash`] so
/// the surrounding loop or server can keep going.
pub fn isolate<T>(phase: Phase, f: impl FnOnce() -> FunctionResult<T>) -> FunctionResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let backtrace = Backtrace::force_capture();
            Logger::error(
                "FUNCTION_PANIC",
                &[
                    ("phase", phase.as_str()),
                    ("panic_message", &panic_message(payload.as_ref())),
                    ("stack_trace", &backtrace.to_string()),
                ],
            );
            Err(FunctionError::Crash { phase })
        }
    }
}

/// Best-effort text of a panic payload
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_passes_through() {
        let result = isolate(Phase::Execution, || Ok(41 + 1));
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_expected_errors_pass_through() {
        let result: FunctionResult<()> =
            isolate(Phase::Execution, || Err(FunctionError::Decode("bad".into())));
        assert!(matches!(result.unwrap_err(), FunctionError::Decode(_)));
    }

    #[test]
    fn test_panic_becomes_crash() {
        let result: FunctionResult<()> =
            isolate(Phase::Execution, || panic!("secret internal detail"));
        let err = result.unwrap_err();
        assert!(matches!(err, FunctionError::Crash { phase: Phase::Execution }));
        // The caller-visible message must not leak the panic text.
        assert!(!err.to_string().contains("secret internal detail"));
    }

    #[test]
    fn test_boundary_is_reusable_after_a_crash() {
        let _ = isolate(Phase::Execution, || -> FunctionResult<()> { panic!("first") });
        let result = isolate(Phase::Execution, || Ok("still serving"));
        assert_eq!(result.unwrap(), "still serving");
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(Phase::Registration.as_str(), "function registration");
        assert_eq!(Phase::Execution.as_str(), "user function execution");
    }
}
