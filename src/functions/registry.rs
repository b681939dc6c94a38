//! # Function Registry
//!
//! Explicit registry object with a documented lifecycle: construct a builder
//! at process start, populate it during the registration phase, then freeze
//! it before serving begins. The frozen registry is read-only and shared by
//! reference; there is no process-global function table.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::cloudevent::CloudEvent;
use super::context::InvocationContext;
use super::errors::{FunctionError, FunctionResult};
use super::handler::{
    cloudevent_handler, event_handler, http_handler, nullary_handler, payload_handler,
    AdaptedFunction, FunctionHttpRequest, ResponseWriter,
};
use super::response::IntoFunctionResponse;

/// A function held by the registry
#[derive(Clone)]
pub struct RegisteredFunction {
    /// Registered name, if any
    name: Option<String>,

    /// The adapted function
    function: AdaptedFunction,
}

impl std::fmt::Debug for RegisteredFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredFunction")
            .field("name", &self.name)
            .field("kind", &self.function.kind())
            .finish_non_exhaustive()
    }
}

impl RegisteredFunction {
    /// Registered name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The adapted function
    pub fn function(&self) -> &AdaptedFunction {
        &self.function
    }
}

/// Mutable registry being populated during the registration phase
#[derive(Default)]
pub struct RegistryBuilder {
    functions: Vec<RegisteredFunction>,
    by_name: HashMap<String, usize>,
}

impl RegistryBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an already-adapted function
    pub fn register(
        &mut self,
        name: Option<&str>,
        function: AdaptedFunction,
    ) -> FunctionResult<()> {
        if let Some(name) = name {
            if self.by_name.contains_key(name) {
                return Err(FunctionError::AlreadyExists(name.to_string()));
            }
            self.by_name.insert(name.to_string(), self.functions.len());
        }
        self.functions.push(RegisteredFunction {
            name: name.map(str::to_string),
            function,
        });
        Ok(())
    }

    /// Register `(context, payload) -> Result<response, error>`
    pub fn register_event<P, R, E, F>(&mut self, name: Option<&str>, f: F) -> FunctionResult<()>
    where
        P: DeserializeOwned,
        R: IntoFunctionResponse,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
        F: Fn(InvocationContext, P) -> Result<R, E> + Send + Sync + 'static,
    {
        self.register(name, event_handler(f))
    }

    /// Register `(payload) -> Result<response, error>`
    pub fn register_payload<P, R, E, F>(&mut self, name: Option<&str>, f: F) -> FunctionResult<()>
    where
        P: DeserializeOwned,
        R: IntoFunctionResponse,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
        F: Fn(P) -> Result<R, E> + Send + Sync + 'static,
    {
        self.register(name, payload_handler(f))
    }

    /// Register `() -> Result<response, error>`
    pub fn register_nullary<R, E, F>(&mut self, name: Option<&str>, f: F) -> FunctionResult<()>
    where
        R: IntoFunctionResponse,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
        F: Fn() -> Result<R, E> + Send + Sync + 'static,
    {
        self.register(name, nullary_handler(f))
    }

    /// Register `(context, CloudEvent) -> Result<(), error>`
    pub fn register_cloudevent<E, F>(&mut self, name: Option<&str>, f: F) -> FunctionResult<()>
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
        F: Fn(InvocationContext, CloudEvent) -> Result<(), E> + Send + Sync + 'static,
    {
        self.register(name, cloudevent_handler(f))
    }

    /// Register an HTTP-style function `(writer, request)`
    pub fn register_http<F>(&mut self, name: Option<&str>, f: F) -> FunctionResult<()>
    where
        F: Fn(&mut ResponseWriter, &FunctionHttpRequest) + Send + Sync + 'static,
    {
        self.register(name, http_handler(f))
    }

    /// Freeze the registry; it is read-only from here on
    pub fn freeze(self) -> FunctionRegistry {
        FunctionRegistry {
            inner: Arc::new(RegistryInner {
                functions: self.functions,
                by_name: self.by_name,
            }),
        }
    }
}

struct RegistryInner {
    functions: Vec<RegisteredFunction>,
    by_name: HashMap<String, usize>,
}

/// Frozen, read-only registry shared across the serving phase
#[derive(Clone)]
pub struct FunctionRegistry {
    inner: Arc<RegistryInner>,
}

impl FunctionRegistry {
    /// Get a function by registered name
    pub fn get(&self, name: &str) -> Option<&RegisteredFunction> {
        self.inner
            .by_name
            .get(name)
            .map(|&idx| &self.inner.functions[idx])
    }

    /// The most recently registered function without a name.
    ///
    /// Used as the serving fallback when no function matches the target name.
    pub fn last_unnamed(&self) -> Option<&RegisteredFunction> {
        self.inner
            .functions
            .iter()
            .rev()
            .find(|f| f.name.is_none())
    }

    /// Resolve the function to serve for a target name.
    ///
    /// Exact name match first, then the last unnamed function, otherwise an
    /// error: serving cannot start without a function.
    pub fn resolve_target(&self, target: &str) -> FunctionResult<&RegisteredFunction> {
        self.get(target)
            .or_else(|| self.last_unnamed())
            .ok_or_else(|| FunctionError::NotFound(target.to_string()))
    }

    /// All registered functions, in registration order
    pub fn list(&self) -> &[RegisteredFunction] {
        &self.inner.functions
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.inner.functions.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.inner.functions.is_empty()
    }
}
