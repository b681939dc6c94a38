//! # HTTP Server
//!
//! The HTTP-serving invocation source: one function served at `/`.

pub mod config;
pub mod invoke_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use invoke_routes::{invoke_routes, InvokeState, FUNCTION_STATUS_HEADER};
pub use server::HttpServer;
