use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use todo_core::{MemoryStore, SqliteStore, TodoStore};
use todo_server::config::Settings;
use todo_server::{telemetry, AppState};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    telemetry::init(&settings.telemetry)?;

    if let Err(err) = run(settings).await {
        error!(error = ?err, "server exited with an error");
        return Err(err);
    }
    Ok(())
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    let sqlite = if settings.database.in_memory {
        info!("using in-memory store");
        None
    } else {
        let store = SqliteStore::connect(&settings.store_options())
            .await
            .context("opening database")?;
        Some(store)
    };
    let store: Arc<dyn TodoStore> = match &sqlite {
        Some(sqlite) => Arc::new(sqlite.clone()),
        None => Arc::new(MemoryStore::new()),
    };

    let state = AppState::new(store).with_request_timeout(settings.request_timeout());
    let listener = TcpListener::bind(settings.addr())
        .await
        .with_context(|| format!("binding {}", settings.addr()))?;
    info!(addr = %listener.local_addr()?, "listening");

    todo_server::serve(listener, state, shutdown_signal()).await?;

    if let Some(sqlite) = sqlite {
        sqlite.close().await;
    }
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
