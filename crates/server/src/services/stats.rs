//! Dashboard statistics.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};
use sqlx::SqlitePool;

use crate::db::{OrderRepository, RepositoryError};
use crate::models::OrderStats;

/// Start and end (exclusive) of the calendar day containing `now` in `offset`.
#[must_use]
pub fn day_bounds(now: DateTime<Utc>, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let local = now.with_timezone(&offset);
    let since_midnight = local.time().signed_duration_since(NaiveTime::MIN);
    let start = now - since_midnight;
    (start, start + Duration::days(1))
}

/// Totals across all orders plus those created today in `offset`.
///
/// Cancelled orders are included; the figures describe placed orders, not
/// settled revenue.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
#[tracing::instrument(skip(pool))]
pub async fn order_stats(
    pool: &SqlitePool,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<OrderStats, RepositoryError> {
    let (start, end) = day_bounds(now, offset);
    OrderRepository::new(pool).stats(start, end).await
}
