//! Admin order management.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use serde::Deserialize;
use tracing::instrument;

use fgs_core::{OrderId, OrderNumber, OrderStatus};

use crate::db::OrderRepository;
use crate::error::AppError;
use crate::middleware::{RequireAdmin, RequireAdminWriter};
use crate::models::{Order, OrderFilter, OrderUpdate};
use crate::services::orders;
use crate::state::AppState;

use super::Ack;

/// Page size when `limit` is omitted.
pub const DEFAULT_LIMIT: i64 = 50;
/// Largest accepted `limit`.
pub const MAX_LIMIT: i64 = 500;

/// Query parameters for the order list.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub limit: Option<i64>,
}

impl OrderListQuery {
    fn into_filter(self) -> Result<OrderFilter, AppError> {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        Ok(OrderFilter {
            status: self.status,
            limit,
        })
    }
}

/// List orders, newest first.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_claims): RequireAdmin,
    query: Result<Query<OrderListQuery>, QueryRejection>,
) -> Result<Json<Vec<Order>>, AppError> {
    let Query(query) = query?;
    let orders = OrderRepository::new(state.pool())
        .list(query.into_filter()?)
        .await?;
    Ok(Json(orders))
}

/// Show a single order.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_claims): RequireAdmin,
    path: Result<Path<OrderId>, PathRejection>,
) -> Result<Json<Order>, AppError> {
    let Path(id) = path?;
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

/// Find an order by the number the customer was given.
#[instrument(skip_all)]
pub async fn lookup(
    State(state): State<AppState>,
    RequireAdmin(_claims): RequireAdmin,
    path: Result<Path<OrderNumber>, PathRejection>,
) -> Result<Json<Order>, AppError> {
    let Path(number) = path?;
    OrderRepository::new(state.pool())
        .get_by_number(&number)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

/// Update an order's statuses and notes.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    RequireAdminWriter(_claims): RequireAdminWriter,
    path: Result<Path<OrderId>, PathRejection>,
    body: Result<Json<OrderUpdate>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    let Path(id) = path?;
    let Json(update) = body?;

    orders::update_status(state.pool(), id, update).await?;
    Ok(Json(Ack { success: true }))
}
