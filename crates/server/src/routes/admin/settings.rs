//! Store settings.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::instrument;

use crate::db::SettingsRepository;
use crate::db::settings::MAX_KEY_LENGTH;
use crate::error::AppError;
use crate::middleware::{RequireAdmin, RequireAdminWriter};
use crate::state::AppState;

use super::Ack;

/// All settings as a key/value map.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_claims): RequireAdmin,
) -> Result<Json<BTreeMap<String, String>>, AppError> {
    let settings = SettingsRepository::new(state.pool()).all().await?;
    Ok(Json(settings))
}

/// Upsert every key in the body. Keys not mentioned are left alone.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    RequireAdminWriter(_claims): RequireAdminWriter,
    body: Result<Json<BTreeMap<String, String>>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    let Json(values) = body?;
    validate_keys(&values)?;

    SettingsRepository::new(state.pool()).set_many(&values).await?;
    tracing::info!(keys = ?values.keys().collect::<Vec<_>>(), "settings updated");
    Ok(Json(Ack { success: true }))
}

fn validate_keys(values: &BTreeMap<String, String>) -> Result<(), AppError> {
    for key in values.keys() {
        if key.trim().is_empty() {
            return Err(AppError::Validation("setting keys cannot be empty".to_string()));
        }
        if key.chars().count() > MAX_KEY_LENGTH {
            return Err(AppError::Validation(format!(
                "setting key exceeds {MAX_KEY_LENGTH} characters"
            )));
        }
    }
    Ok(())
}
