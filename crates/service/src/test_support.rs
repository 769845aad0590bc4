#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

fn test_config() -> DatabaseConfig {
    let mut cfg = DatabaseConfig::from_file().unwrap_or_else(|_| DatabaseConfig::from_env());
    cfg.max_connections = cfg.max_connections.max(5);
    cfg.min_connections = cfg.min_connections.min(1);
    cfg.connect_timeout = std::time::Duration::from_secs(5);
    cfg.acquire_timeout = std::time::Duration::from_secs(10);
    cfg
}

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let cfg = test_config();
    // Run migrations exactly once; a failed attempt is retried by the next caller
    MIGRATED
        .get_or_try_init(|| async {
            let db = connect_with_config(&cfg).await?;
            migration::Migrator::up(&db, None).await?;
            Ok::<(), anyhow::Error>(())
        })
        .await?;

    // Return a fresh connection for the current test's runtime
    connect_with_config(&cfg).await
}
