use anyhow::Result;
use sea_orm::{ConnectOptions, Database};
use std::time::Duration;
use crate::schemas::AppState;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://academy.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Load `.env` if present. Missing files are not an error.
pub fn load_env() {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }
}

/// Connect to the given database and build the shared state
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);

    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let db = Database::connect(options).await?;

    Ok(AppState { db })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_connects_to_in_memory_sqlite() {
        let state = initialize_app_state_with_url("sqlite::memory:").await.unwrap();
        assert!(state.db.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_database_is_an_error() {
        assert!(initialize_app_state_with_url("not-a-scheme://nowhere").await.is_err());
    }
}
