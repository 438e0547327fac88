// Service exports
pub mod cache;
pub mod evaluator;
pub mod extractor;
pub mod notifications;
pub mod profiles;
pub mod registry;

pub use cache::ActiveSearchCache;
pub use evaluator::{evaluate_against, MatchEvaluator};
pub use extractor::{CriteriaExtractor, ExtractorError};
pub use notifications::{
    EmailSink, InboxSink, NotificationDispatcher, NotificationSink, NotificationStore,
    NotifyError, NotifyOutcome, PgNotificationStore, SinkError,
};
pub use profiles::{ProfileStore, ProfileStoreError};
pub use registry::{RegistryError, StandingSearchRegistry};

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;

/// Errors while bringing up the shared database pool.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

/// Connect the shared Postgres pool and run migrations on startup.
pub async fn connect_pool(
    database_url: &str,
    max_connections: u32,
    min_connections: u32,
) -> Result<PgPool, ConnectError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(min_connections)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .test_before_acquire(true)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
