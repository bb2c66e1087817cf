//! Admin user repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use fgs_core::{AdminRole, AdminUserId};

use super::RepositoryError;
use crate::models::AdminUser;

#[derive(sqlx::FromRow)]
struct AdminUserRow {
    id: i64,
    username: String,
    password_hash: String,
    email: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
}

impl AdminUserRow {
    fn into_parts(self) -> Result<(AdminUser, String), RepositoryError> {
        let role = self.role.parse::<AdminRole>().map_err(|e| {
            RepositoryError::DataCorruption(format!("admin user {}: {e}", self.id))
        })?;

        Ok((
            AdminUser {
                id: AdminUserId::new(self.id),
                username: self.username,
                email: self.email,
                role,
                created_at: self.created_at,
            },
            self.password_hash,
        ))
    }
}

/// Repository for admin user database operations.
pub struct AdminUserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an admin and their password hash by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored role is unknown.
    pub async fn get_with_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(AdminUser, String)>, RepositoryError> {
        sqlx::query_as::<_, AdminUserRow>("SELECT * FROM admin_users WHERE username = ?1")
            .bind(username)
            .fetch_optional(self.pool)
            .await?
            .map(AdminUserRow::into_parts)
            .transpose()
    }

    /// Get an admin by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored role is unknown.
    pub async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>("SELECT * FROM admin_users WHERE id = ?1")
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(r.into_parts()?.0)),
            None => Ok(None),
        }
    }

    /// Create a new admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &str,
        email: Option<&str>,
        role: AdminRole,
        password_hash: &str,
    ) -> Result<AdminUser, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            r"
            INSERT INTO admin_users (username, password_hash, email, role)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING *
            ",
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(role.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "username"))?;

        Ok(row.into_parts()?.0)
    }

    /// Number of admin accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admin_users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_create_and_fetch_with_hash() {
        let pool = test_pool().await;
        let repo = AdminUserRepository::new(&pool);

        let created = repo
            .create("film", Some("film@example.com"), AdminRole::SuperAdmin, "$argon2id$stub")
            .await
            .unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);

        let (user, hash) = repo.get_with_password_hash("film").await.unwrap().unwrap();
        assert_eq!(user.id, created.id);
        assert_eq!(user.role, AdminRole::SuperAdmin);
        assert_eq!(hash, "$argon2id$stub");

        assert!(repo.get_with_password_hash("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let pool = test_pool().await;
        let repo = AdminUserRepository::new(&pool);
        repo.create("film", None, AdminRole::Admin, "hash").await.unwrap();

        let result = repo.create("film", None, AdminRole::Viewer, "hash").await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }
}
