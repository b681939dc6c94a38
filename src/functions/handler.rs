//! # Handler Adapter
//!
//! Wraps a user function in one of the recognized shapes into the single
//! uniform invocation contract `(context, payload bytes) -> (response, error)`.
//! The shape is stated at registration time by choosing a constructor, so the
//! signature is validated once, before any traffic is served, and no runtime
//! shape inference ever happens.
//!
//! Every adapted handler is reusable: each invocation decodes into a fresh
//! value and encodes into a fresh buffer, and no mutable state is retained
//! between calls, so a handler may be invoked repeatedly and concurrently.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::cloudevent::CloudEvent;
use super::context::InvocationContext;
use super::errors::{FunctionError, FunctionResult};
use super::response::{FunctionResponse, IntoFunctionResponse};
use super::signature::Signature;

/// The uniform contract every recognized function shape is normalized to.
///
/// Created once per registered function and reused across all invocations.
pub type UniformHandler =
    Arc<dyn Fn(InvocationContext, &[u8]) -> FunctionResult<FunctionResponse> + Send + Sync>;

/// Declared kind of a registered function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// HTTP-style `(writer, request)`, served without the decode path
    Http,

    /// Event-style with a structurally decoded payload
    Event,

    /// CloudEvent-style with an enveloped-event payload
    CloudEvent,
}

/// A user function normalized to the uniform contract
#[derive(Clone)]
pub struct AdaptedFunction {
    kind: FunctionKind,
    signature: Option<Signature>,
    handler: UniformHandler,
}

impl AdaptedFunction {
    /// Declared kind
    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    /// Signature descriptor; HTTP-style functions carry none
    pub fn signature(&self) -> Option<Signature> {
        self.signature
    }

    /// The uniform handler value
    pub fn handler(&self) -> UniformHandler {
        Arc::clone(&self.handler)
    }

    /// Invoke the uniform handler directly
    pub fn invoke(
        &self,
        ctx: InvocationContext,
        payload: &[u8],
    ) -> FunctionResult<FunctionResponse> {
        (self.handler)(ctx, payload)
    }
}

/// Decode raw payload bytes into a freshly allocated value of the target type
fn decode_payload<P: DeserializeOwned>(payload: &[u8]) -> FunctionResult<P> {
    serde_json::from_slice(payload).map_err(|e| FunctionError::Decode(e.to_string()))
}

/// Adapt `(context, payload) -> Result<response, error>`
pub fn event_handler<P, R, E, F>(f: F) -> AdaptedFunction
where
    P: DeserializeOwned,
    R: IntoFunctionResponse,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
    F: Fn(InvocationContext, P) -> Result<R, E> + Send + Sync + 'static,
{
    AdaptedFunction {
        kind: FunctionKind::Event,
        signature: Some(Signature::context_and_payload()),
        handler: Arc::new(move |ctx, payload| {
            let value: P = decode_payload(payload)?;
            match f(ctx, value) {
                Ok(response) => response.into_response(),
                Err(e) => Err(FunctionError::execution(e)),
            }
        }),
    }
}

/// Adapt `(payload) -> Result<response, error>` (no context)
pub fn payload_handler<P, R, E, F>(f: F) -> AdaptedFunction
where
    P: DeserializeOwned,
    R: IntoFunctionResponse,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
    F: Fn(P) -> Result<R, E> + Send + Sync + 'static,
{
    AdaptedFunction {
        kind: FunctionKind::Event,
        signature: Some(Signature::payload_only()),
        handler: Arc::new(move |_ctx, payload| {
            let value: P = decode_payload(payload)?;
            match f(value) {
                Ok(response) => response.into_response(),
                Err(e) => Err(FunctionError::execution(e)),
            }
        }),
    }
}

/// Adapt `() -> Result<response, error>`; the payload is ignored
pub fn nullary_handler<R, E, F>(f: F) -> AdaptedFunction
where
    R: IntoFunctionResponse,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
    F: Fn() -> Result<R, E> + Send + Sync + 'static,
{
    AdaptedFunction {
        kind: FunctionKind::Event,
        signature: Some(Signature::nullary()),
        handler: Arc::new(move |_ctx, _payload| match f() {
            Ok(response) => response.into_response(),
            Err(e) => Err(FunctionError::execution(e)),
        }),
    }
}

/// Adapt `(context, CloudEvent) -> Result<(), error>`.
///
/// The payload is first structurally decoded into the generic enveloped-event
/// shape; the function itself produces no response body.
pub fn cloudevent_handler<E, F>(f: F) -> AdaptedFunction
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
    F: Fn(InvocationContext, CloudEvent) -> Result<(), E> + Send + Sync + 'static,
{
    AdaptedFunction {
        kind: FunctionKind::CloudEvent,
        signature: Some(Signature::context_and_payload()),
        handler: Arc::new(move |ctx, payload| {
            let event = CloudEvent::from_slice(payload)?;
            match f(ctx, event) {
                Ok(()) => Ok(FunctionResponse::empty()),
                Err(e) => Err(FunctionError::execution(e)),
            }
        }),
    }
}

/// Adapt an HTTP-style function `(writer, request)`.
///
/// The raw payload bytes become the request body and the writer's buffer
/// becomes the response; a `Content-Type` header set by the function is
/// carried through as the declared content type.
pub fn http_handler<F>(f: F) -> AdaptedFunction
where
    F: Fn(&mut ResponseWriter, &FunctionHttpRequest) + Send + Sync + 'static,
{
    AdaptedFunction {
        kind: FunctionKind::Http,
        signature: None,
        handler: Arc::new(move |_ctx, payload| {
            let request = FunctionHttpRequest::from_payload(payload.to_vec());
            let mut writer = ResponseWriter::new();
            f(&mut writer, &request);
            Ok(writer.into_response())
        }),
    }
}

/// Request value handed to HTTP-style functions
#[derive(Debug, Clone)]
pub struct FunctionHttpRequest {
    /// Request method
    pub method: String,

    /// Request path
    pub path: String,

    /// Request headers
    pub headers: HashMap<String, String>,

    /// Raw request body
    pub body: Vec<u8>,
}

impl FunctionHttpRequest {
    /// Build a request whose body is the invocation payload
    pub fn from_payload(body: Vec<u8>) -> Self {
        Self {
            method: "POST".to_string(),
            path: "/".to_string(),
            headers: HashMap::new(),
            body,
        }
    }
}

/// Buffering response writer handed to HTTP-style functions.
///
/// A fresh writer is allocated per invocation; nothing written survives past
/// the response it produces.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: u16,
    headers: HashMap<String, String>,
    buffer: Vec<u8>,
}

impl ResponseWriter {
    /// Create a writer with status 200 and an empty buffer
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            buffer: Vec::new(),
        }
    }

    /// Set the response status code
    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Response status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Set a response header
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
    }

    /// Convert the written state into a normalized response
    fn into_response(self) -> FunctionResponse {
        let content_type = self.headers.get("content-type").cloned();
        let mut response = FunctionResponse::buffer(self.buffer);
        if let Some(ct) = content_type {
            response = response.with_content_type(ct);
        }
        response
    }
}

impl Write for ResponseWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
