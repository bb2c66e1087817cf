//! Database migration command.
//!
//! Migrations live in `crates/server/migrations/` and are embedded in the
//! server library; the server never applies them on its own.

use secrecy::SecretString;
use thiserror::Error;

use fgs_server::db;

/// Errors from the migrate command.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database cannot be opened or a migration fails.
pub async fn run(database_url: &SecretString) -> Result<(), MigrationError> {
    tracing::info!("Connecting to database...");
    let pool = db::create_pool(database_url).await?;

    tracing::info!(
        available = db::MIGRATOR.iter().count(),
        "Running migrations..."
    );
    db::migrate(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
