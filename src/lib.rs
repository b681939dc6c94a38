//! aerofn - A self-hostable serverless functions host
//!
//! Normalizes user functions in a handful of recognized shapes to one
//! uniform invocation contract and serves them over HTTP or against a
//! pull-based runtime invocation API.

pub mod cli;
pub mod config;
pub mod functions;
pub mod http_server;
pub mod observability;
pub mod runtime_api;
pub mod serve;
