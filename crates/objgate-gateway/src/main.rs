//! objgate - authenticated HTTP gateway for an object store

use clap::Parser;
use objgate_gateway::{run_server_with_shutdown, GatewayConfig, StoreBackend};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "objgate")]
#[command(about = "Authenticated HTTP gateway for an object store")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "OBJGATE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8787", env = "OBJGATE_PORT")]
    port: u16,

    /// Bearer token required on every request (unset or empty: open gateway)
    #[arg(long, env = "AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// Directory holding stored objects
    #[arg(long, env = "OBJGATE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Use in-memory storage (for testing, data will not persist)
    #[arg(long, env = "OBJGATE_MEMORY_STORE")]
    memory_store: bool,

    /// Maximum request body size in bytes
    #[arg(long, env = "OBJGATE_MAX_BODY_SIZE")]
    max_body_size: Option<usize>,

    /// Answer CORS preflights and add CORS headers
    #[arg(long, env = "OBJGATE_CORS")]
    cors: bool,

    /// Enable debug logging
    #[arg(short, long, env = "OBJGATE_DEBUG")]
    debug: bool,

    /// Emit logs as JSON
    #[arg(long, env = "OBJGATE_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("objgate_gateway={log_level},objgate_store={log_level},tower_http=debug").into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting objgate on {}:{}", args.host, args.port);

    let store = match (&args.data_dir, args.memory_store) {
        (Some(dir), false) => StoreBackend::Directory(dir.clone()),
        (Some(_), true) => {
            tracing::warn!("--memory-store overrides --data-dir");
            StoreBackend::Memory
        }
        (None, _) => {
            tracing::warn!("⚠️  No data directory given - using in-memory storage, data will NOT persist!");
            StoreBackend::Memory
        }
    };

    let defaults = GatewayConfig::default();
    let config = GatewayConfig {
        host: args.host,
        port: args.port,
        store,
        max_body_size: args.max_body_size.unwrap_or(defaults.max_body_size),
        cors_enabled: args.cors,
        ..defaults
    }
    .with_auth_token(args.auth_token);

    run_server_with_shutdown(config, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
