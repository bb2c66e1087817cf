//! Admin user management commands.
//!
//! ```bash
//! FGS_ADMIN_PASSWORD='...' fgs-cli admin create -u owner -e owner@example.com -r super_admin
//! ```

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use fgs_core::{AdminRole, AdminUserId};
use fgs_server::db;
use fgs_server::services::{AuthError, AuthService};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin, viewer")]
    InvalidRole(String),

    /// Account could not be created.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a new admin user and return its ID.
///
/// # Errors
///
/// Returns `AdminError` if the role is unknown, the input is rejected, the
/// username is taken, or the database is unreachable.
pub async fn create_user(
    database_url: &SecretString,
    username: &str,
    email: Option<&str>,
    role: &str,
    password: &SecretString,
) -> Result<AdminUserId, AdminError> {
    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(database_url).await?;

    tracing::info!("Creating admin user: {} ({})", username, role);
    let user = AuthService::new(&pool)
        .create_admin(username, email, role, password.expose_secret())
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Username: {}, Role: {}",
        user.id,
        user.username,
        user.role
    );

    Ok(user.id)
}
