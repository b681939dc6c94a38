//! # Function Adaptation Layer
//!
//! Normalizes user functions in the recognized shapes (HTTP-style,
//! event-style with or without context, cloudevent-style) to one uniform
//! invocation contract, with fault isolation and content negotiation.

pub mod cloudevent;
pub mod context;
pub mod errors;
pub mod guard;
pub mod handler;
pub mod registry;
pub mod response;
pub mod signature;

pub use cloudevent::CloudEvent;
pub use context::InvocationContext;
pub use errors::{FunctionError, FunctionResult, CRASH_STATUS, ERROR_STATUS};
pub use guard::{isolate, Phase};
pub use handler::{
    cloudevent_handler, event_handler, http_handler, nullary_handler, payload_handler,
    AdaptedFunction, FunctionHttpRequest, FunctionKind, ResponseWriter, UniformHandler,
};
pub use registry::{FunctionRegistry, RegisteredFunction, RegistryBuilder};
pub use response::{
    resolve_content_type, FunctionResponse, IntoFunctionResponse, Json, RawResponse,
    ResponseBody, CONTENT_TYPE_BYTES,
};
pub use signature::Signature;
