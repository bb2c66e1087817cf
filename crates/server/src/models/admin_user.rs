//! Admin user domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fgs_core::AdminUserId;

// Re-export AdminRole from core for convenience
pub use fgs_core::AdminRole;

/// An admin user (domain type). The password hash never leaves the repository.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    /// Unique admin user ID.
    pub id: AdminUserId,
    /// Login name (unique).
    pub username: String,
    /// Contact email, if recorded.
    pub email: Option<String>,
    /// Permission level.
    pub role: AdminRole,
    /// When the admin was created.
    pub created_at: DateTime<Utc>,
}
