//! # HTTP Server
//!
//! Serves a single resolved function over HTTP: the request body is the
//! invocation payload, the negotiated content type and response bytes come
//! back, and failures carry the status header described in `invoke_routes`.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::functions::RegisteredFunction;
use crate::observability::Logger;

use super::config::HttpServerConfig;
use super::invoke_routes::{invoke_routes, InvokeState};

/// HTTP server for one function
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server for a function with the given configuration
    pub fn new(config: HttpServerConfig, function: RegisteredFunction, flush_logs: bool) -> Self {
        let router = Self::build_router(function, flush_logs);
        Self { config, router }
    }

    /// Build the router with the invocation routes and CORS
    fn build_router(function: RegisteredFunction, flush_logs: bool) -> Router {
        let state = Arc::new(InvokeState { function, flush_logs });

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        invoke_routes(state).layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{}", e)))?;

        Logger::info("HTTP_SERVER_STARTING", &[("addr", &addr.to_string())]);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}
