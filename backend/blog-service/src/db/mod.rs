/// Database access layer
///
/// This module provides:
/// - Connection pool creation and migrations
/// - Repository traits for pages and comments with their PostgreSQL implementations
/// - Materialized-path helpers for the page tree
pub mod comment_repo;
pub mod page_repo;
pub mod tree;

pub use comment_repo::{CommentRepository, PgCommentRepository};
pub use page_repo::{PageRepository, PgPageRepository};

use crate::config::DatabaseConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

/// Create the PostgreSQL pool and verify it with a round trip.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    debug!(
        "Creating database pool: max={}, acquire_timeout={}s",
        config.max_connections, config.acquire_timeout_secs
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    info!(max_connections = config.max_connections, "Database pool created");

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
