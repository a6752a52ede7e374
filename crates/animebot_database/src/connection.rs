//! Connection pool and migration utilities.

use animebot_error::{AnimebotResult, DatabaseError, DatabaseErrorKind};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::time::Duration;
use tracing::{info, instrument};

/// Pooled PostgreSQL connections.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Connection pool sizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// PostgreSQL connection string
    pub url: String,
    /// Upper bound on open connections
    pub max_connections: u32,
    /// Idle connections kept warm
    pub min_idle: Option<u32>,
    /// How long to wait for a free connection
    pub connection_timeout: Duration,
}

/// Build a connection pool.
///
/// # Errors
///
/// Returns an error if the initial connections cannot be established.
#[instrument(skip(settings), fields(max_connections = settings.max_connections))]
pub fn create_pool(settings: &PoolSettings) -> Result<PgPool, DatabaseError> {
    let manager = ConnectionManager::<PgConnection>::new(&settings.url);
    let pool = Pool::builder()
        .max_size(settings.max_connections)
        .min_idle(settings.min_idle)
        .connection_timeout(settings.connection_timeout)
        .build(manager)?;
    info!("Database pool ready");
    Ok(pool)
}

/// Apply pending embedded migrations.
///
/// Returns the number of migrations applied.
#[instrument(skip(pool))]
pub fn run_migrations(pool: &PgPool) -> Result<usize, DatabaseError> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))?;
    info!(count = applied.len(), "Applied migrations");
    Ok(applied.len())
}

/// Run blocking diesel work on the blocking thread pool with a pooled connection.
pub(crate) async fn with_connection<T, F>(pool: &PgPool, work: F) -> AnimebotResult<T>
where
    F: FnOnce(&mut PgConnection) -> Result<T, DatabaseError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool.get()?;
        work(&mut conn)
    })
    .await
    .map_err(|e| DatabaseError::new(DatabaseErrorKind::Task(e.to_string())))?;
    Ok(result?)
}
