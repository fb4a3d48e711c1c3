use std::error::Error;
use std::sync::Arc;

use log::{info, warn};
use tokio::net::TcpListener;
use whale_watch_core::storage::{Datastore, MemoryStore};
use whale_watch_core::WhaleWatch;
use whale_watch_server::{build_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // .env is optional.
    let dotenv = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let config = ServerConfig::from_env()?;

    let store: Arc<dyn Datastore> = match (&config.data_file, &config.data_password) {
        (Some(path), Some(password)) => {
            info!("Using encrypted data file {}", path.display());
            Arc::new(MemoryStore::open_encrypted(path, password).await?)
        }
        _ => {
            warn!("WHALE_WATCH_DATA_FILE not set; data is kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let app = WhaleWatch::with_store(config.settings.clone(), store);
    info!("{app:?}");
    let router = build_router(AppState::new(app));

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("Server running on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
