//! Tamizajes dashboard (tmz-dash) - Main entry point
//!
//! Serves the dashboard state and actions as JSON on top of the tamizajes
//! prediction backend.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tmz_common::config::{
    default_config_path, load_toml_config, resolve_api_url, resolve_port,
    resolve_preferences_path,
};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tmz_dash::{build_router, AppState};

const DEFAULT_PORT: u16 = 5730;

/// Command-line arguments for tmz-dash
#[derive(Parser, Debug)]
#[command(name = "tmz-dash")]
#[command(about = "Dashboard host for the tamizajes prediction API")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "TMZ_DASH_PORT")]
    port: Option<u16>,

    /// Prediction backend base URL
    #[arg(long, env = "TMZ_API_URL")]
    api_url: Option<String>,

    /// TOML config file (defaults to <config_dir>/tamizajes/tmz-dash.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| default_config_path("tmz-dash"));
    let toml_config = load_toml_config(&config_path).context("Failed to load config")?;

    // Initialize tracing (RUST_LOG wins over the configured level)
    let level = toml_config.logging.level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("tmz_dash={level},tmz_common={level},tower_http={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting tamizajes dashboard (tmz-dash) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if config_path.exists() {
        info!("Config file: {}", config_path.display());
    } else {
        info!("No config file at {}, using defaults", config_path.display());
    }

    let api_url = resolve_api_url(args.api_url.as_deref(), &toml_config)?;
    let port = resolve_port(args.port, &toml_config, DEFAULT_PORT);
    let preferences_path = resolve_preferences_path(&toml_config);

    let state = AppState::new(&api_url, preferences_path)
        .context("Failed to initialize backend clients")?;

    let snapshot = state.form.initialize().await;
    info!(
        "Form initialized: {:?}, department '{}', province '{}'",
        snapshot.status, snapshot.selection.department, snapshot.selection.province
    );

    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("tmz-dash listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
