//! # Runtime API Client
//!
//! The pull-based invocation API: `GET next` hands out one unit of work, and
//! the caller reports the outcome back with a success or error post. The
//! [`InvocationApi`] trait is the seam between the loop and the transport, so
//! tests (and alternative transports) can stand in for the HTTP client.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::functions::FunctionError;

use super::invocation::Invocation;

/// Version segment of the runtime API paths
pub const RUNTIME_API_VERSION: &str = "2018-06-01";

/// Response header carrying the invocation identifier on `GET next`
pub const INVOCATION_ID_HEADER: &str = "Function-Invocation-Id";

/// Transport failures against the invocation API.
///
/// All of these are fatal to the loop; there are no retries.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request itself failed (connect, read, ...)
    #[error("runtime API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with an unexpected status
    #[error("runtime API returned status {status} for {endpoint}")]
    UnexpectedStatus {
        /// Endpoint the request went to
        endpoint: String,
        /// Status code received
        status: u16,
    },

    /// `GET next` answered without an invocation identifier
    #[error("next invocation response is missing the {0} header")]
    MissingInvocationId(&'static str),
}

/// Diagnostic body posted when an invocation is reported as failed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationErrorReport {
    /// Human-readable failure message
    #[serde(rename = "errorMessage")]
    pub error_message: String,

    /// Failure classification
    #[serde(rename = "errorType")]
    pub error_type: String,
}

impl InvocationErrorReport {
    /// Classify a function error into a report.
    ///
    /// The message is the error's display form, which for a crash is already
    /// the generic, non-leaking text.
    pub fn from_function_error(err: &FunctionError) -> Self {
        let error_type = match err {
            FunctionError::Decode(_) => "InvalidPayload",
            FunctionError::Execution(_) => "FunctionError",
            FunctionError::Crash { .. } => "FunctionCrash",
            _ => "InternalError",
        };
        Self {
            error_message: err.to_string(),
            error_type: error_type.to_string(),
        }
    }
}

/// The pull-based invocation source seen by the loop
#[async_trait]
pub trait InvocationApi: Send + Sync {
    /// Block until the source hands out the next unit of work
    async fn next(&self) -> Result<Invocation, TransportError>;

    /// Report a successful invocation with its response bytes
    async fn report_success(
        &self,
        id: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), TransportError>;

    /// Report a failed invocation with its diagnostic
    async fn report_failure(
        &self,
        id: &str,
        report: &InvocationErrorReport,
    ) -> Result<(), TransportError>;
}

/// HTTP implementation of the invocation API protocol
pub struct RuntimeApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl RuntimeApiClient {
    /// Create a client against `host:port`
    pub fn new(api_addr: &str) -> Self {
        Self {
            base_url: format!(
                "http://{}/{}/runtime/invocation",
                api_addr, RUNTIME_API_VERSION
            ),
            // No request timeout: `next` long-polls until work is available.
            http: reqwest::Client::new(),
        }
    }

    fn expect_success(endpoint: &str, status: reqwest::StatusCode) -> Result<(), TransportError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::UnexpectedStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl InvocationApi for RuntimeApiClient {
    async fn next(&self) -> Result<Invocation, TransportError> {
        let endpoint = format!("{}/next", self.base_url);
        let response = self.http.get(&endpoint).send().await?;
        Self::expect_success(&endpoint, response.status())?;

        let id = response
            .headers()
            .get(INVOCATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(TransportError::MissingInvocationId(INVOCATION_ID_HEADER))?;

        let payload = response.bytes().await?.to_vec();
        Ok(Invocation::new(id, payload))
    }

    async fn report_success(
        &self,
        id: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), TransportError> {
        let endpoint = format!("{}/{}/response", self.base_url, id);
        let response = self
            .http
            .post(&endpoint)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;
        Self::expect_success(&endpoint, response.status())
    }

    async fn report_failure(
        &self,
        id: &str,
        report: &InvocationErrorReport,
    ) -> Result<(), TransportError> {
        let endpoint = format!("{}/{}/error", self.base_url, id);
        let response = self.http.post(&endpoint).json(report).send().await?;
        Self::expect_success(&endpoint, response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::{FunctionError, Phase};

    #[test]
    fn test_error_report_classification() {
        let decode = InvocationErrorReport::from_function_error(&FunctionError::Decode(
            "unexpected token".into(),
        ));
        assert_eq!(decode.error_type, "InvalidPayload");

        let execution =
            InvocationErrorReport::from_function_error(&FunctionError::execution("boom"));
        assert_eq!(execution.error_type, "FunctionError");

        let crash = InvocationErrorReport::from_function_error(&FunctionError::Crash {
            phase: Phase::Execution,
        });
        assert_eq!(crash.error_type, "FunctionCrash");
    }

    #[test]
    fn test_crash_report_message_stays_generic() {
        let crash = InvocationErrorReport::from_function_error(&FunctionError::Crash {
            phase: Phase::Execution,
        });
        assert!(crash.error_message.contains("see logs"));
    }

    #[test]
    fn test_report_serializes_with_wire_field_names() {
        let report = InvocationErrorReport {
            error_message: "m".to_string(),
            error_type: "FunctionError".to_string(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["errorMessage"], "m");
        assert_eq!(json["errorType"], "FunctionError");
    }

    #[test]
    fn test_client_builds_versioned_base_url() {
        let client = RuntimeApiClient::new("127.0.0.1:9001");
        assert_eq!(
            client.base_url,
            "http://127.0.0.1:9001/2018-06-01/runtime/invocation"
        );
    }
}
