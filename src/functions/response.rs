//! # Function Responses & Content Negotiation
//!
//! The normalized outcome of an invocation: a response body plus an optional
//! declared content type. Conversion from user return values goes through
//! [`IntoFunctionResponse`]; content negotiation defaults to raw binary and
//! lets any response value that declares a content type override it.

use std::fmt;
use std::io::{self, Read};

use serde::Serialize;

use super::errors::{FunctionError, FunctionResult};

/// Default content type for responses that do not declare one
pub const CONTENT_TYPE_BYTES: &str = "application/octet-stream";

/// The body of a normalized function response
pub enum ResponseBody {
    /// No response body at all
    Empty,

    /// An encoded in-memory buffer, freshly allocated per invocation
    Buffer(Vec<u8>),

    /// An already-serialized byte stream, passed through unencoded.
    ///
    /// Dropping the stream releases whatever resource backs it, so the
    /// invocation loop only needs to let it go out of scope after reporting.
    Stream(Box<dyn Read + Send>),
}

impl ResponseBody {
    /// Whether this body carries no bytes
    pub fn is_empty(&self) -> bool {
        match self {
            ResponseBody::Empty => true,
            ResponseBody::Buffer(b) => b.is_empty(),
            ResponseBody::Stream(_) => false,
        }
    }

    /// Drain the body into a byte vector
    pub fn into_bytes(self) -> io::Result<Vec<u8>> {
        match self {
            ResponseBody::Empty => Ok(Vec::new()),
            ResponseBody::Buffer(b) => Ok(b),
            ResponseBody::Stream(mut reader) => {
                let mut out = Vec::new();
                reader.read_to_end(&mut out)?;
                Ok(out)
            }
        }
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Empty => write!(f, "Empty"),
            ResponseBody::Buffer(b) => write!(f, "Buffer({} bytes)", b.len()),
            ResponseBody::Stream(_) => write!(f, "Stream(..)"),
        }
    }
}

/// Normalized response produced by a uniform handler
#[derive(Debug)]
pub struct FunctionResponse {
    /// Response body
    pub body: ResponseBody,

    /// Content type declared by the response value, if any
    pub content_type: Option<String>,
}

impl FunctionResponse {
    /// A response with no body and no error
    pub fn empty() -> Self {
        Self { body: ResponseBody::Empty, content_type: None }
    }

    /// A response carrying an encoded buffer
    pub fn buffer(bytes: Vec<u8>) -> Self {
        Self { body: ResponseBody::Buffer(bytes), content_type: None }
    }

    /// A response carrying an already-serialized stream
    pub fn stream(reader: Box<dyn Read + Send>) -> Self {
        Self { body: ResponseBody::Stream(reader), content_type: None }
    }

    /// Declare the content type of this response
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Resolve the content type to report for a response.
///
/// The default is the generic binary content type; a declared value on the
/// response overrides it regardless of the body form.
pub fn resolve_content_type(response: &FunctionResponse) -> &str {
    response.content_type.as_deref().unwrap_or(CONTENT_TYPE_BYTES)
}

/// Conversion from a user function's return value into a normalized response
pub trait IntoFunctionResponse {
    /// Convert the value, encoding it if necessary
    fn into_response(self) -> FunctionResult<FunctionResponse>;
}

impl IntoFunctionResponse for () {
    fn into_response(self) -> FunctionResult<FunctionResponse> {
        Ok(FunctionResponse::empty())
    }
}

impl IntoFunctionResponse for FunctionResponse {
    fn into_response(self) -> FunctionResult<FunctionResponse> {
        Ok(self)
    }
}

impl IntoFunctionResponse for Vec<u8> {
    fn into_response(self) -> FunctionResult<FunctionResponse> {
        Ok(FunctionResponse::buffer(self))
    }
}

impl IntoFunctionResponse for String {
    fn into_response(self) -> FunctionResult<FunctionResponse> {
        Ok(FunctionResponse::buffer(self.into_bytes()))
    }
}

impl IntoFunctionResponse for serde_json::Value {
    fn into_response(self) -> FunctionResult<FunctionResponse> {
        Json(self).into_response()
    }
}

/// Wrapper that encodes its inner value as JSON into a fresh buffer.
///
/// Encoding happens once per invocation into a newly allocated buffer; no
/// buffer is ever shared between calls.
#[derive(Debug, Clone, Copy)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoFunctionResponse for Json<T> {
    fn into_response(self) -> FunctionResult<FunctionResponse> {
        let bytes = serde_json::to_vec(&self.0)
            .map_err(|e| FunctionError::Encode(e.to_string()))?;
        Ok(FunctionResponse::buffer(bytes))
    }
}

/// A response that is already serialized and is passed through unencoded
pub struct RawResponse {
    reader: Box<dyn Read + Send>,
    content_type: Option<String>,
}

impl RawResponse {
    /// Wrap an already-serialized stream
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self { reader: Box::new(reader), content_type: None }
    }

    /// Wrap a byte buffer that is already in its final wire form
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::new(io::Cursor::new(bytes))
    }

    /// Declare the content type of this response
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl IntoFunctionResponse for RawResponse {
    fn into_response(self) -> FunctionResult<FunctionResponse> {
        Ok(FunctionResponse {
            body: ResponseBody::Stream(self.reader),
            content_type: self.content_type,
        })
    }
}
