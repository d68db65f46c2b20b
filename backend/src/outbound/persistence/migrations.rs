//! Embedded schema migrations applied at startup.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::ports::RepositoryError;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply every pending migration to `database_url`.
///
/// Diesel's migration harness is synchronous, so the work runs on the
/// blocking thread pool.
///
/// # Errors
///
/// [`RepositoryError::Connection`] when the database is unreachable and
/// [`RepositoryError::Query`] when a migration fails.
pub async fn run_migrations(database_url: &str) -> Result<(), RepositoryError> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&url)
            .map_err(|err| RepositoryError::connection(err.to_string()))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| RepositoryError::query(format!("migration: {err}")))?;
        info!(count = applied.len(), "applied pending migrations");
        Ok(())
    })
    .await
    .map_err(|err| RepositoryError::query(format!("migration task failed: {err}")))?
}
