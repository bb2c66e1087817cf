//! Settings database operations.
//!
//! Settings are a flat string-to-string map (payment instructions, contact
//! channels). Writes replace values key by key inside one transaction.

use std::collections::BTreeMap;

use chrono::Utc;
use sqlx::SqlitePool;

use super::RepositoryError;

/// Maximum length of a setting key.
pub const MAX_KEY_LENGTH: usize = 64;

/// Repository for store settings.
pub struct SettingsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All settings, sorted by key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all(&self) -> Result<BTreeMap<String, String>, RepositoryError> {
        let rows = sqlx::query_as::<_, (String, String)>("SELECT key, value FROM settings")
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().collect())
    }

    /// Get a single setting.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(self.pool)
            .await?;
        Ok(value)
    }

    /// Insert or replace every entry of `values`. Either all entries are
    /// written or none are.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any write fails.
    pub async fn set_many(&self, values: &BTreeMap<String, String>) -> Result<(), RepositoryError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for (key, value) in values {
            sqlx::query(
                r"
                INSERT INTO settings (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                ",
            )
            .bind(key)
            .bind(value)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
