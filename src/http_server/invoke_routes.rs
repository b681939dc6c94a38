//! Invocation HTTP Routes
//!
//! Serves one resolved function: any request, at `/` or below, becomes an
//! invocation whose payload is the raw request body. Outcomes map to HTTP as
//! follows: decode failure is 400 `crash`, an error returned by the function
//! is 500 `error`, an abnormal termination is 500 `crash` with a generic body.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};

use crate::functions::{
    isolate, resolve_content_type, InvocationContext, Phase, RegisteredFunction, CRASH_STATUS,
};

/// Response header naming the failure class of an invocation
pub const FUNCTION_STATUS_HEADER: &str = "x-function-status";

/// State shared by the invocation routes
pub struct InvokeState {
    /// The function being served
    pub function: RegisteredFunction,

    /// Flush stdout/stderr before writing an error response.
    ///
    /// Keeps log lines grouped with the response under log-aggregation
    /// systems that collect by process lifecycle.
    pub flush_logs: bool,
}

/// Create the invocation routes for one function
pub fn invoke_routes(state: Arc<InvokeState>) -> Router {
    Router::new()
        .route("/", any(invoke_function_handler))
        .fallback(invoke_function_handler)
        .with_state(state)
}

async fn invoke_function_handler(
    State(state): State<Arc<InvokeState>>,
    body: Bytes,
) -> Response {
    let ctx = InvocationContext::new(state.function.name().map(str::to_string));

    let outcome = isolate(Phase::Execution, || {
        state.function.function().invoke(ctx, &body)
    });

    match outcome {
        Ok(response) => {
            let content_type = resolve_content_type(&response).to_string();
            match response.body.into_bytes() {
                Ok(bytes) => {
                    ([(header::CONTENT_TYPE, content_type)], bytes).into_response()
                }
                Err(err) => write_http_error(
                    state.flush_logs,
                    500,
                    CRASH_STATUS,
                    format!("unreadable response stream: {}", err),
                ),
            }
        }
        Err(err) => write_http_error(
            state.flush_logs,
            err.status_code(),
            err.status_label(),
            err.to_string(),
        ),
    }
}

/// Write an HTTP error response with the failure-class status header.
///
/// The message also goes to stderr; logs must end with a newline or they are
/// grouped incorrectly by line-based collectors.
fn write_http_error(flush_logs: bool, status: u16, label: &str, mut msg: String) -> Response {
    if !msg.ends_with('\n') {
        msg.push('\n');
    }
    eprint!("{}", msg);

    // Extra flush of both streams before the response goes out, so collected
    // logs land ahead of the response under managed log grouping.
    if flush_logs {
        println!();
        eprintln!();
    }

    let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        code,
        [(FUNCTION_STATUS_HEADER, label.to_string())],
        msg,
    )
        .into_response()
}
