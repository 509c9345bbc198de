use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tracing::{info, debug, trace, error};

/// Apply every pending migration to the database at `database_url`.
pub async fn init_database(database_url: &str) -> Result<()> {
    trace!("Entering init_database function");
    info!("Initializing academy database");
    debug!("Database URL: {}", database_url);

    let db: DatabaseConnection = match Database::connect(database_url).await {
        Ok(connection) => {
            info!("Successfully connected to database");
            connection
        }
        Err(e) => {
            error!("Failed to connect to database '{}': {}", database_url, e);
            return Err(e.into());
        }
    };

    let pending = Migrator::get_pending_migrations(&db).await?;
    if pending.is_empty() {
        info!("Schema is already up to date");
        return Ok(());
    }
    for migration in &pending {
        debug!("Pending migration: {}", migration.name());
    }

    info!("Applying {} migration(s)", pending.len());
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run database migrations: {}", e);
        return Err(e.into());
    }

    info!("Database initialization completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_database_is_repeatable_on_a_file_database() {
        let path = std::env::temp_dir().join(format!("academy-initdb-{}.db", std::process::id()));
        let url = format!("sqlite://{}?mode=rwc", path.display());

        init_database(&url).await.unwrap();
        // Second run finds nothing pending
        init_database(&url).await.unwrap();

        let db = Database::connect(&url).await.unwrap();
        assert!(Migrator::get_pending_migrations(&db).await.unwrap().is_empty());
        drop(db);
        let _ = std::fs::remove_file(&path);
    }
}
