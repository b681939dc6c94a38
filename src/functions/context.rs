//! # Invocation Context
//!
//! The context value handed to user functions. A fresh context is created
//! for every invocation; nothing in it is shared across invocations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context passed to a function for one invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationContext {
    /// Invocation ID, either source-assigned or freshly generated
    pub id: String,

    /// Name of the function being invoked, if it was registered with one
    pub function_name: Option<String>,

    /// Invocation timestamp
    pub timestamp: DateTime<Utc>,
}

impl InvocationContext {
    /// Create a context with a freshly generated ID
    pub fn new(function_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            function_name,
            timestamp: Utc::now(),
        }
    }

    /// Create a context carrying an ID assigned by the invocation source
    pub fn with_id(id: impl Into<String>, function_name: Option<String>) -> Self {
        Self {
            id: id.into(),
            function_name,
            timestamp: Utc::now(),
        }
    }
}
