//! CLI command definitions for the `tagarela` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod ask;

use clap::{Parser, Subcommand};

/// Tagarela chat backend.
#[derive(Parser)]
#[command(name = "tagarela", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all log output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to `[server] port` from config.toml).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to `[server] host` from config.toml).
        #[arg(long)]
        host: Option<String>,
    },

    /// Send one message and print the reply.
    Ask {
        /// Message to send.
        message: String,

        /// Continue an existing session instead of starting a new one.
        #[arg(short, long)]
        session: Option<String>,

        /// Output machine-readable JSON instead of styled text.
        #[arg(long)]
        json: bool,
    },
}
