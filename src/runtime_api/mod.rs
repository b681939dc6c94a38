//! # Runtime Invocation API
//!
//! The pull-based invocation source: a client for its wire protocol and the
//! loop that drives a registered function against it.

pub mod client;
pub mod invocation;
pub mod worker;

pub use client::{
    InvocationApi, InvocationErrorReport, RuntimeApiClient, TransportError,
    INVOCATION_ID_HEADER, RUNTIME_API_VERSION,
};
pub use invocation::Invocation;
pub use worker::{InvocationLoop, LoopError};
