use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::config::initialize_app_state_with_url;
use crate::router::create_router;

/// Runs the HTTP API until Ctrl+C or SIGTERM.
pub async fn serve(database_url: &str, bind_address: &str) -> Result<()> {
    let state = initialize_app_state_with_url(database_url)
        .await
        .with_context(|| format!("cannot open database {database_url}"))?;

    let pending = Migrator::get_pending_migrations(&state.db).await?;
    if !pending.is_empty() {
        warn!("{} migration(s) not applied, run `academy init-db` first", pending.len());
    }

    let listener = TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("cannot bind {bind_address}"))?;

    info!("Academy API listening on http://{}", bind_address);
    info!("Swagger UI at http://{}/swagger-ui", bind_address);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Academy API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Ctrl+C handler unavailable: {}", e);
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
                warn!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
