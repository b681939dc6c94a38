//! Invocation Loop Tests
//!
//! The loop against a scripted in-memory invocation source:
//! - Successful outcomes are reported with their negotiated content type
//! - Execution errors, decode errors, and crashes are reported as failures
//! - A panic never ends the loop; a fetch or report failure always does
//! - A fetch failure terminates without another fetch attempt

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use aerofn::functions::{
    event_handler, payload_handler, RawResponse, RegistryBuilder,
};
use aerofn::runtime_api::{
    Invocation, InvocationApi, InvocationErrorReport, InvocationLoop, LoopError, TransportError,
};
use serde::Deserialize;

// =============================================================================
// Scripted Invocation Source
// =============================================================================

#[derive(Default)]
struct ApiState {
    queue: Mutex<VecDeque<Result<Invocation, TransportError>>>,
    successes: Mutex<Vec<(String, Vec<u8>, String)>>,
    failures: Mutex<Vec<(String, InvocationErrorReport)>>,
    fetch_calls: AtomicUsize,
    fail_success_reports: bool,
}

/// In-memory invocation source that plays back a scripted queue. Once the
/// queue runs dry, `next` fails, which is how each test ends its loop.
#[derive(Clone, Default)]
struct ScriptedApi {
    state: Arc<ApiState>,
}

impl ScriptedApi {
    fn with_invocations(invocations: Vec<Invocation>) -> Self {
        let api = Self::default();
        let mut queue = api.state.queue.lock().unwrap();
        for invocation in invocations {
            queue.push_back(Ok(invocation));
        }
        drop(queue);
        api
    }

    fn failing_success_reports(self) -> Self {
        let state = Arc::try_unwrap(self.state).unwrap_or_else(|_| panic!("state shared"));
        Self {
            state: Arc::new(ApiState { fail_success_reports: true, ..state }),
        }
    }

    fn fetch_failure() -> TransportError {
        TransportError::UnexpectedStatus {
            endpoint: "http://127.0.0.1:9001/2018-06-01/runtime/invocation/next".to_string(),
            status: 500,
        }
    }

    fn report_failure_error(endpoint: &str) -> TransportError {
        TransportError::UnexpectedStatus { endpoint: endpoint.to_string(), status: 500 }
    }
}

#[async_trait::async_trait]
impl InvocationApi for ScriptedApi {
    async fn next(&self) -> Result<Invocation, TransportError> {
        self.state.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.state
            .queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::fetch_failure()))
    }

    async fn report_success(
        &self,
        id: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), TransportError> {
        if self.state.fail_success_reports {
            return Err(Self::report_failure_error("response"));
        }
        self.state.successes.lock().unwrap().push((
            id.to_string(),
            body,
            content_type.to_string(),
        ));
        Ok(())
    }

    async fn report_failure(
        &self,
        id: &str,
        report: &InvocationErrorReport,
    ) -> Result<(), TransportError> {
        self.state
            .failures
            .lock()
            .unwrap()
            .push((id.to_string(), report.clone()));
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

#[derive(Debug, Deserialize)]
struct Greeting {
    name: String,
}

fn registered(adapted: aerofn::functions::AdaptedFunction) -> aerofn::functions::RegisteredFunction {
    let mut builder = RegistryBuilder::new();
    builder.register(Some("under-test"), adapted).unwrap();
    builder.freeze().get("under-test").unwrap().clone()
}

// =============================================================================
// Success Path
// =============================================================================

/// A valid payload to a function that returns Ok(()) produces a success
/// report with an empty body and no error report.
#[tokio::test]
async fn test_success_with_empty_body_is_reported() {
    let api = ScriptedApi::with_invocations(vec![Invocation::new(
        "inv-1",
        br#"{"name":"world"}"#.to_vec(),
    )]);
    let function = registered(event_handler(|_ctx, _g: Greeting| Ok::<_, String>(())));

    let worker = InvocationLoop::new(api.clone(), function);
    let fatal = worker.run().await;

    assert!(matches!(fatal, LoopError::Fetch(_)));

    let successes = api.state.successes.lock().unwrap();
    assert_eq!(successes.len(), 1);
    let (id, body, content_type) = &successes[0];
    assert_eq!(id, "inv-1");
    assert!(body.is_empty());
    assert_eq!(content_type, "application/octet-stream");
    assert!(api.state.failures.lock().unwrap().is_empty());
}

/// A declared content type is plumbed through to the success report.
#[tokio::test]
async fn test_content_type_is_plumbed_through() {
    let api = ScriptedApi::with_invocations(vec![Invocation::new(
        "inv-2",
        br#"{"name":"csv"}"#.to_vec(),
    )]);
    let function = registered(payload_handler(|_g: Greeting| {
        Ok::<_, String>(
            RawResponse::from_bytes(b"name\ncsv\n".to_vec()).with_content_type("text/csv"),
        )
    }));

    let worker = InvocationLoop::new(api.clone(), function);
    let _ = worker.run().await;

    let successes = api.state.successes.lock().unwrap();
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].1, b"name\ncsv\n");
    assert_eq!(successes[0].2, "text/csv");
}

// =============================================================================
// Failure Classification
// =============================================================================

/// An execution error is reported to the source as a failed invocation.
#[tokio::test]
async fn test_execution_error_is_reported_as_failure() {
    let api = ScriptedApi::with_invocations(vec![Invocation::new(
        "inv-3",
        br#"{"name":"x"}"#.to_vec(),
    )]);
    let function = registered(event_handler(|_ctx, _g: Greeting| {
        Err::<(), _>("database unavailable".to_string())
    }));

    let worker = InvocationLoop::new(api.clone(), function);
    let _ = worker.run().await;

    let failures = api.state.failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "inv-3");
    assert_eq!(failures[0].1.error_type, "FunctionError");
    assert!(failures[0].1.error_message.contains("database unavailable"));
    assert!(api.state.successes.lock().unwrap().is_empty());
}

/// A malformed payload is classified as a client-input failure.
#[tokio::test]
async fn test_decode_error_is_reported_as_invalid_payload() {
    let api = ScriptedApi::with_invocations(vec![Invocation::new(
        "inv-4",
        b"not valid structured data".to_vec(),
    )]);
    let function = registered(event_handler(|_ctx, _g: Greeting| Ok::<_, String>(())));

    let worker = InvocationLoop::new(api.clone(), function);
    let _ = worker.run().await;

    let failures = api.state.failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].1.error_type, "InvalidPayload");
}

/// A panic in user code is isolated: it is reported as a crash, the loop
/// moves on, and the following invocation still succeeds.
#[tokio::test]
async fn test_panic_is_isolated_and_loop_continues() {
    let api = ScriptedApi::with_invocations(vec![
        Invocation::new("inv-5", br#"{"name":"boom"}"#.to_vec()),
        Invocation::new("inv-6", br#"{"name":"fine"}"#.to_vec()),
    ]);
    let function = registered(event_handler(|_ctx, g: Greeting| {
        if g.name == "boom" {
            panic!("secret internal detail");
        }
        Ok::<_, String>(g.name)
    }));

    let worker = InvocationLoop::new(api.clone(), function);
    let _ = worker.run().await;

    let failures = api.state.failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "inv-5");
    assert_eq!(failures[0].1.error_type, "FunctionCrash");
    // The reported diagnostic must not leak the panic text.
    assert!(!failures[0].1.error_message.contains("secret internal detail"));

    let successes = api.state.successes.lock().unwrap();
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].0, "inv-6");
    assert_eq!(successes[0].1, b"fine");
}

// =============================================================================
// Fatal Transport Failures
// =============================================================================

/// A fetch failure terminates the loop and is returned without another
/// fetch attempt.
#[tokio::test]
async fn test_fetch_failure_terminates_without_retry() {
    let api = ScriptedApi::default();
    {
        let mut queue = api.state.queue.lock().unwrap();
        queue.push_back(Err(ScriptedApi::fetch_failure()));
        queue.push_back(Ok(Invocation::new("never-fetched", b"{}".to_vec())));
    }
    let function = registered(event_handler(|_ctx, _g: Greeting| Ok::<_, String>(())));

    let worker = InvocationLoop::new(api.clone(), function);
    let fatal = worker.run().await;

    assert!(matches!(fatal, LoopError::Fetch(_)));
    assert_eq!(api.state.fetch_calls.load(Ordering::SeqCst), 1);
    // The queued invocation after the failure was never consumed.
    assert_eq!(api.state.queue.lock().unwrap().len(), 1);
}

/// A report failure is fatal and is returned from the loop.
#[tokio::test]
async fn test_report_failure_is_fatal() {
    let api = ScriptedApi::with_invocations(vec![Invocation::new(
        "inv-7",
        br#"{"name":"x"}"#.to_vec(),
    )])
    .failing_success_reports();
    let function = registered(event_handler(|_ctx, _g: Greeting| Ok::<_, String>(())));

    let worker = InvocationLoop::new(api.clone(), function);
    let fatal = worker.run().await;

    assert!(matches!(fatal, LoopError::Report(_)));
    assert_eq!(api.state.fetch_calls.load(Ordering::SeqCst), 1);
}
