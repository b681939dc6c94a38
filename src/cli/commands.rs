//! CLI command dispatch
//!
//! Builds the demo registry, applies command-line overrides on top of the
//! environment configuration, and enters the serving phase. Fatal serving
//! errors propagate to `main`, which exits non-zero.

use serde::Deserialize;
use serde_json::json;

use crate::config::RuntimeConfig;
use crate::functions::{
    isolate, FunctionRegistry, FunctionResult, Json, Phase, RegistryBuilder,
};
use crate::observability::Logger;
use crate::serve;

use super::args::{Cli, Command};
use super::errors::CliResult;

/// Run the selected command
pub fn run_command(cli: Cli) -> CliResult<()> {
    let mut config = RuntimeConfig::from_env();

    match cli.command {
        None => {}
        Some(Command::Serve { host, port }) => {
            config.target = None;
            if let Some(host) = host {
                config.http.host = host;
            }
            if let Some(port) = port {
                config.http.port = port;
            }
        }
        Some(Command::Worker { api, target }) => {
            if let Some(api) = api {
                config.runtime_api = api;
            }
            config.target = target
                .or(config.target)
                .or_else(|| Some("greeter".to_string()));
        }
    }

    // Registration runs under the isolation boundary so a panic while
    // registering is logged with its phase before the process gives up.
    let registry = isolate(Phase::Registration, build_demo_registry)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve::start(&registry, &config))?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct Greeting {
    name: String,
}

/// Built-in functions served by the demo binary
fn build_demo_registry() -> FunctionResult<FunctionRegistry> {
    let mut builder = RegistryBuilder::new();

    builder.register_event(Some("greeter"), |_ctx, greeting: Greeting| {
        Ok::<_, String>(Json(json!({
            "greeting": format!("Hello, {}!", greeting.name)
        })))
    })?;

    builder.register_http(Some("echo"), |writer, request| {
        use std::io::Write;
        writer.set_header("Content-Type", "application/octet-stream");
        let _ = writer.write_all(&request.body);
    })?;

    builder.register_cloudevent(Some("audit"), |_ctx, event| {
        Logger::info(
            "CLOUDEVENT_RECEIVED",
            &[
                ("id", &event.id),
                ("source", &event.source),
                ("type", &event.event_type),
            ],
        );
        Ok::<_, String>(())
    })?;

    Ok(builder.freeze())
}
