//! # Runtime Configuration
//!
//! Environment-driven selection of how the process serves its function:
//! a named target selects pull-loop mode against the runtime invocation API
//! (at `FUNCTION_RUNTIME_API`, or the fixed loopback default); without a
//! target the function is served over HTTP.

use serde::{Deserialize, Serialize};

use crate::http_server::HttpServerConfig;

/// Environment variable naming the target function
pub const ENV_FUNCTION_TARGET: &str = "FUNCTION_TARGET";

/// Environment variable with the runtime API address (`host:port`)
pub const ENV_RUNTIME_API: &str = "FUNCTION_RUNTIME_API";

/// Environment indicator enabling the pre-error log flush
pub const ENV_LOG_FLUSH: &str = "FUNCTION_LOG_FLUSH";

/// Environment variable overriding the HTTP bind host
pub const ENV_HTTP_HOST: &str = "FUNCTION_HOST";

/// Environment variable overriding the HTTP bind port
pub const ENV_HTTP_PORT: &str = "FUNCTION_PORT";

/// Runtime API address used when none is configured
pub const DEFAULT_RUNTIME_API: &str = "127.0.0.1:9001";

/// How the process serves its function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeMode {
    /// Pull invocations from the runtime API
    PullLoop,

    /// Serve inbound HTTP requests
    Http,
}

/// Process-wide runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Target function name, if one was selected
    pub target: Option<String>,

    /// Runtime API address (`host:port`)
    pub runtime_api: String,

    /// Flush stdout/stderr before HTTP error responses
    pub flush_logs: bool,

    /// HTTP server settings
    pub http: HttpServerConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            target: None,
            runtime_api: DEFAULT_RUNTIME_API.to_string(),
            flush_logs: false,
            http: HttpServerConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from a key lookup (testable without env mutation)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let mut http = defaults.http;
        if let Some(host) = lookup(ENV_HTTP_HOST).filter(|v| !v.is_empty()) {
            http.host = host;
        }
        if let Some(port) = lookup(ENV_HTTP_PORT).and_then(|v| v.parse().ok()) {
            http.port = port;
        }

        Self {
            target: lookup(ENV_FUNCTION_TARGET).filter(|v| !v.is_empty()),
            runtime_api: lookup(ENV_RUNTIME_API)
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.runtime_api),
            flush_logs: lookup(ENV_LOG_FLUSH).is_some_and(|v| !v.is_empty()),
            http,
        }
    }

    /// Which serving mode this configuration selects
    pub fn mode(&self) -> ServeMode {
        if self.target.is_some() {
            ServeMode::PullLoop
        } else {
            ServeMode::Http
        }
    }
}
