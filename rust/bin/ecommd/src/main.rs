//! `ecommd`: the e-commerce backend server.
//!
//! Usage:
//!   ecommd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/ecomm/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod routes;
mod sweeper;

use std::sync::Arc;

use clap::Parser;
use ecomm_core::{ErrorReporter, Module, TracingReporter};
use tracing::info;

use config::ServerConfig;

/// E-commerce backend server.
#[derive(Parser, Debug)]
#[command(name = "ecommd", about = "E-commerce backend server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides default 0.0.0.0:8080).
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = ecomm_core::ServiceConfig {
        data_dir: Some(data_dir),
        listen: cli.listen.clone(),
        request_timeout_ms: server_config.server.request_timeout_ms,
        ..Default::default()
    };

    // Initialize embedded stores.
    let cache = Arc::new(
        ecomm_kv::RedbStore::open(&core_config.resolve_cache_path())
            .map_err(|e| anyhow::anyhow!("failed to open session cache: {}", e))?,
    );
    let kv: Arc<dyn ecomm_kv::KVStore> = cache.clone();
    let sql: Arc<dyn ecomm_sql::SQLStore> = Arc::new(
        ecomm_sql::SqliteStore::open(&core_config.resolve_sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    let reporter: Arc<dyn ErrorReporter> = Arc::new(TracingReporter);
    let auth_config = server_config.auth_config();
    let session_ttl = auth_config.session_ttl;
    let auth_module = auth::AuthModule::new(Arc::clone(&sql), kv, reporter, auth_config)?;
    info!(
        session_ttl_secs = session_ttl.as_secs(),
        timeout_ms = core_config.request_timeout().as_millis() as u64,
        "Auth module initialized"
    );

    // Bootstrap: seed the admin account if configured.
    if let Some(admin) = &server_config.admin {
        bootstrap::seed_admin(&sql, admin)?;
    }

    // Shutdown interrupts in-flight requests and stops the sweeper.
    let shutdown = auth_module.service().shutdown_token().clone();
    if !session_ttl.is_zero() {
        sweeper::start(cache, sweeper::interval_for(session_ttl), shutdown.clone());
    }

    let app = routes::build_router(vec![(auth_module.name(), auth_module.routes())]);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&core_config.listen).await?;
    info!("ecommd listening on {}", core_config.listen);
    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {e}");
            }
            info!("shutting down");
            signal.cancel();
        })
        .await?;

    shutdown.cancel();
    Ok(())
}
