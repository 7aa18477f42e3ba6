//! Tagarela CLI and REST API entry point.
//!
//! Binary name: `tagarela`
//!
//! Parses CLI arguments, initializes tracing, the database and the generation
//! client, then runs a one-shot conversation or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;

use cli::{Cli, Commands};
use state::AppState;
use tagarela_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let tracing_options = TracingOptions {
        default_filter: TracingOptions::filter_for_verbosity(cli.verbose, cli.quiet).to_string(),
        json: cli.log_json,
        otel: cli.otel,
    };
    init_tracing(&tracing_options)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;

    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Initialize application state (config, DB, generation client)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Ask {
            message,
            session,
            json,
        } => {
            cli::ask::ask(&state, &message, session.as_deref(), json).await?;
        }

        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Tagarela API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!(
                "  {}",
                console::style(format!("Data directory: {}", state.data_dir.display())).dim()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
