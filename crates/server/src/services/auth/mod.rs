//! Admin authentication service.
//!
//! Passwords are hashed with Argon2id and stored as PHC strings. Successful
//! logins are exchanged for a signed bearer token by [`TokenService`].

mod error;
mod token;

use std::sync::LazyLock;

pub use error::AuthError;
pub use token::{Claims, TokenService};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::ExposeSecret;
use sqlx::SqlitePool;

use fgs_core::{AdminRole, Email};

use crate::config::BootstrapAdmin;
use crate::db::RepositoryError;
use crate::db::admin_users::AdminUserRepository;
use crate::models::AdminUser;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum username length.
const MAX_USERNAME_LENGTH: usize = 64;

/// Hash checked when the username is unknown, so both failure paths do the same work.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("not-a-real-admin-password").ok());

/// Admin authentication service.
pub struct AuthService<'a> {
    admins: AdminUserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            admins: AdminUserRepository::new(pool),
        }
    }

    /// Check a username/password pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username is unknown or the password is wrong.
    pub async fn login(&self, username: &str, password: &str) -> Result<AdminUser, AuthError> {
        let Some((user, password_hash)) =
            self.admins.get_with_password_hash(username.trim()).await?
        else {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;
        Ok(user)
    }

    /// Create an admin account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Invalid` if the username or password is unacceptable.
    /// Returns `AuthError::InvalidEmail` if an email is given but malformed.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    pub async fn create_admin(
        &self,
        username: &str,
        email: Option<&str>,
        role: AdminRole,
        password: &str,
    ) -> Result<AdminUser, AuthError> {
        let username = validate_username(username)?;
        let email = email
            .filter(|e| !e.trim().is_empty())
            .map(Email::parse)
            .transpose()?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        self.admins
            .create(username, email.as_ref().map(Email::as_str), role, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Create the configured first admin if no admin exists yet.
    ///
    /// Returns the created account, or `None` when admins already exist.
    ///
    /// # Errors
    ///
    /// Returns an `AuthError` if the bootstrap account cannot be created.
    pub async fn ensure_bootstrap_admin(
        &self,
        bootstrap: &BootstrapAdmin,
    ) -> Result<Option<AdminUser>, AuthError> {
        if self.admins.count().await? > 0 {
            return Ok(None);
        }

        let user = self
            .create_admin(
                &bootstrap.username,
                bootstrap.email.as_deref(),
                AdminRole::SuperAdmin,
                bootstrap.password.expose_secret(),
            )
            .await?;
        Ok(Some(user))
    }
}

fn validate_username(username: &str) -> Result<&str, AuthError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AuthError::Invalid("username is required".to_string()));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AuthError::Invalid(format!(
            "username must be at most {MAX_USERNAME_LENGTH} characters"
        )));
    }
    Ok(username)
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Invalid(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a PHC hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the password doesn't match.
/// Returns `AuthError::PasswordHash` if the stored hash is invalid.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_is_rejected() {
        let pool = test_pool().await;
        let auth = AuthService::new(&pool);
        auth.create_admin("film", Some("film@example.com"), AdminRole::Admin, "s3cure-pass")
            .await
            .unwrap();

        assert!(auth.login("film", "s3cure-pass").await.is_ok());
        assert!(matches!(
            auth.login("film", "wrong-pass").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("ghost", "s3cure-pass").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_create_admin_validates_input() {
        let pool = test_pool().await;
        let auth = AuthService::new(&pool);

        assert!(matches!(
            auth.create_admin("  ", None, AdminRole::Admin, "long-enough").await,
            Err(AuthError::Invalid(_))
        ));
        assert!(matches!(
            auth.create_admin("film", None, AdminRole::Admin, "short").await,
            Err(AuthError::Invalid(_))
        ));
        assert!(matches!(
            auth.create_admin("film", Some("bad-email"), AdminRole::Admin, "long-enough").await,
            Err(AuthError::InvalidEmail(_))
        ));

        auth.create_admin("film", None, AdminRole::Admin, "long-enough")
            .await
            .unwrap();
        assert!(matches!(
            auth.create_admin("film", None, AdminRole::Viewer, "long-enough").await,
            Err(AuthError::UserAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_bootstrap_admin_only_when_empty() {
        let pool = test_pool().await;
        let auth = AuthService::new(&pool);
        let bootstrap = BootstrapAdmin {
            username: "owner".to_owned(),
            password: secrecy::SecretString::from("first-admin-pass".to_owned()),
            email: None,
        };

        let created = auth.ensure_bootstrap_admin(&bootstrap).await.unwrap().unwrap();
        assert_eq!(created.role, AdminRole::SuperAdmin);
        assert!(auth.ensure_bootstrap_admin(&bootstrap).await.unwrap().is_none());
    }
}
