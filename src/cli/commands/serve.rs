use std::sync::Arc;

use clap::Args;
use tracing::{info, warn};

use crate::app;
use crate::config::{self, Environment};
use crate::database::{MemoryStore, Store};
use crate::is_production;
use crate::state::AppState;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides COURTSIDE_PORT / PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Use the in-memory store instead of Postgres")]
    pub memory: bool,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let config = config::config();
    info!("Starting Courtside API in {:?} mode", config.environment);

    if config.environment != Environment::Development && config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }

    let store: Arc<dyn Store> = if args.memory {
        if is_production!() {
            anyhow::bail!("The in-memory store is not available in production");
        }
        warn!("Using the in-memory store; data is lost on shutdown");
        Arc::new(MemoryStore::new())
    } else {
        super::pg_store().await?
    };

    let state = AppState::new(store, Arc::new(config.clone()));
    let app = app::router(state);

    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Courtside API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
