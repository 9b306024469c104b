use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::core::config::DatabaseConfig;
use crate::modules::store::{ChangeListener, DocumentStore, MemoryDocumentStore, PgDocumentStore};

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
}

/// Build the document store for this process.
///
/// With a database configured: connect, run migrations and spawn the change
/// listener. Without one the service still runs, on a process-local store
/// that starts empty.
pub async fn open_store(config: Option<&DatabaseConfig>) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let Some(config) = config else {
        tracing::warn!(
            "DATABASE_URL is not set. Using an in-memory document store; data will not persist."
        );
        return Ok(Arc::new(MemoryDocumentStore::new()));
    };

    let pool = create_pool(config).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    let store = Arc::new(PgDocumentStore::new(pool.clone()));

    let listener = ChangeListener::new(pool, Arc::clone(&store));
    tokio::spawn(async move {
        listener.run().await;
    });
    tracing::info!("Document change listener spawned");

    Ok(store)
}
