//! jsonkv HTTP API server.

use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use jsonkv::server::{AppState, Config, CorsConfig, Overrides, init_logging, router};

/// jsonkv HTTP API server.
#[derive(Parser, Debug)]
#[command(name = "jsonkv-server")]
#[command(about = "HTTP API server for the jsonkv JSON key-value store")]
struct Args {
    /// Path to an optional TOML configuration file.
    #[arg(short, long, env = "JSONKV_CONFIG")]
    config: Option<PathBuf>,

    /// Shared secret clients must send in the x-api-key header.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Directory holding the database.
    #[arg(long, env = "DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Address to bind.
    #[arg(long, env = "BIND")]
    bind: Option<String>,

    /// Port to listen on.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            api_key: self.api_key.clone(),
            data_dir: self.data_dir.clone(),
            bind: self.bind.clone(),
            port: self.port,
        }
    }
}

/// Load variables from a `.env` file in `dir`, if there is one.
///
/// Variables already present in the environment are left alone. Returns
/// whether a file was loaded.
fn load_env_file(dir: &Path) -> Result<bool, dotenvy::Error> {
    match dotenvy::from_path(dir.join(".env")) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    if !config.enabled {
        // Deny all cross-origin requests by default
        return CorsLayer::new();
    }

    let mut cors = CorsLayer::new();

    // Configure allowed origins
    if config.allow_origins.iter().any(|o| o == "*") {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .allow_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    let methods: Vec<_> = config
        .allow_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    cors = cors.allow_methods(methods);

    let headers: Vec<_> = config
        .allow_headers
        .iter()
        .filter_map(|h| h.parse().ok())
        .collect();
    cors = cors.allow_headers(headers);

    if config.allow_credentials {
        cors = cors.allow_credentials(true);
    }

    cors.max_age(Duration::from_secs(config.max_age))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Must run before parsing so clap's env fallbacks see the file's values
    let env_file = load_env_file(Path::new("."));
    let args = Args::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(args.config.as_deref())?.with_overrides(args.overrides());
    let bind_addr = config.bind_addr();

    init_logging(&config.logging)?;

    match env_file {
        Ok(true) => tracing::info!("Loaded environment from .env"),
        Ok(false) => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }

    if config.auth.api_key.is_none() {
        tracing::warn!("No API key configured; every request will be rejected");
    }

    tracing::info!("Opening store at {}", config.storage.path.display());
    let state = AppState::from_config(&config)?;

    let cors = build_cors_layer(&config.cors);
    if config.cors.enabled {
        tracing::info!(
            "CORS enabled with {} allowed origin(s)",
            config.cors.allow_origins.len()
        );
    }

    let app: Router = router(state.clone())
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = bind_addr.parse()?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.store().persist()?;
    tracing::info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
