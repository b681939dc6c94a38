//! CLI argument definitions using clap
//!
//! Commands:
//! - aerofn serve: serve the demo functions over HTTP
//! - aerofn worker: pull invocations from the runtime API
//!
//! With no command, the serving mode is selected from the environment.

use clap::{Parser, Subcommand};

/// aerofn - A self-hostable serverless functions host
#[derive(Parser, Debug)]
#[command(name = "aerofn")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve a function over HTTP
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,
    },

    /// Pull invocations from the runtime API and report outcomes back
    Worker {
        /// Runtime API address (host:port)
        #[arg(long)]
        api: Option<String>,

        /// Target function name (defaults to "greeter")
        #[arg(long)]
        target: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
