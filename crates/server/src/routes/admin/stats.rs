//! Dashboard statistics.

use axum::{Json, extract::State};
use chrono::Utc;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::OrderStats;
use crate::services::stats;
use crate::state::AppState;

/// Order counts and revenue, overall and for today.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_claims): RequireAdmin,
) -> Result<Json<OrderStats>, AppError> {
    let stats = stats::order_stats(state.pool(), state.config().stats_offset, Utc::now()).await?;
    Ok(Json(stats))
}
