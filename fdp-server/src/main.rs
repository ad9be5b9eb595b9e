//! fdp-server - design project tracker
//!
//! Serves the project dashboard API on one in-memory store. Settings come
//! from flags, environment, `config.toml`, then built-in defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fdp_common::config::{ConfigOverrides, ServiceConfig};
use fdp_common::ProjectStore;
use fdp_server::{api::import_csv_text, build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for fdp-server
#[derive(Parser, Debug)]
#[command(name = "fdp-server")]
#[command(about = "Design project tracking service")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long, env = "FDP_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "FDP_PORT")]
    port: Option<u16>,

    /// Config file (default: <config_dir>/fdp/config.toml)
    #[arg(short, long, env = "FDP_CONFIG")]
    config: Option<PathBuf>,

    /// CSV file imported at startup
    #[arg(long, env = "FDP_SEED_CSV")]
    seed_csv: Option<PathBuf>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            seed_csv: args.seed_csv,
            config_file: args.config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fdp_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting fdp-server v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config =
        ServiceConfig::resolve(args.into()).context("Failed to resolve configuration")?;

    let state = AppState::new(ProjectStore::new(), config.export_filename.as_str());

    if let Some(seed) = &config.seed_csv {
        let text = tokio::fs::read_to_string(seed)
            .await
            .with_context(|| format!("Failed to read seed CSV {}", seed.display()))?;
        let imported = import_csv_text(&state, &text)
            .await
            .with_context(|| format!("Failed to import seed CSV {}", seed.display()))?;
        info!("Seeded {} projects from {}", imported.len(), seed.display());
    }

    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("fdp-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
