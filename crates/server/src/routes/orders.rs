//! Checkout endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::services::{CreateOrderRequest, OrderReceipt, OrderService};
use crate::state::AppState;

/// Response body for a placed order.
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order: OrderReceipt,
}

/// Place an order.
///
/// Returns 201 with the frozen total, redemption code and payment instructions.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), AppError> {
    let Json(request) = body?;

    let order = OrderService::new(state.pool(), &state.config().payment)
        .create_order(request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            success: true,
            order,
        }),
    ))
}
