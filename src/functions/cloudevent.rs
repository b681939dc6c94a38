//! # CloudEvents Envelope
//!
//! Generic enveloped-event shape for cloudevent-style functions. Decoding is
//! purely structural; schema validation beyond structure is out of scope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{FunctionError, FunctionResult};

/// A structurally decoded CloudEvents v1.0 envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudEvent {
    /// Event identifier
    pub id: String,

    /// Event source URI reference
    pub source: String,

    /// CloudEvents version ("1.0")
    pub specversion: String,

    /// Event type
    #[serde(rename = "type")]
    pub event_type: String,

    /// Content type of the data field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacontenttype: Option<String>,

    /// Event subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Event timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    /// Event payload
    #[serde(default)]
    pub data: Value,
}

impl CloudEvent {
    /// Structurally decode an envelope from raw payload bytes
    pub fn from_slice(payload: &[u8]) -> FunctionResult<Self> {
        serde_json::from_slice(payload).map_err(|e| FunctionError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_envelope() {
        let payload = br#"{
            "id": "evt-1",
            "source": "//storage/buckets/demo",
            "specversion": "1.0",
            "type": "object.finalized",
            "data": {"name": "greeting.txt"}
        }"#;

        let event = CloudEvent::from_slice(payload).unwrap();
        assert_eq!(event.id, "evt-1");
        assert_eq!(event.event_type, "object.finalized");
        assert_eq!(event.data["name"], "greeting.txt");
        assert!(event.time.is_none());
    }

    #[test]
    fn test_missing_required_attribute_is_a_decode_error() {
        let payload = br#"{"id": "evt-2", "specversion": "1.0"}"#;
        let err = CloudEvent::from_slice(payload).unwrap_err();
        assert!(matches!(err, FunctionError::Decode(_)));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let err = CloudEvent::from_slice(b"not valid structured data").unwrap_err();
        assert!(matches!(err, FunctionError::Decode(_)));
    }
}
