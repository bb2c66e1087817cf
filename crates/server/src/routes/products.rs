//! Public catalog endpoints.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use tracing::instrument;

use fgs_core::ProductId;

use crate::db::ProductRepository;
use crate::error::AppError;
use crate::models::{Product, ProductFilter};
use crate::state::AppState;

/// List active products, featured first then newest first.
#[instrument(skip(state, query))]
pub async fn index(
    State(state): State<AppState>,
    query: Result<Query<ProductFilter>, QueryRejection>,
) -> Result<Json<Vec<Product>>, AppError> {
    let Query(mut filter) = query?;
    filter.include_inactive = false;

    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(products))
}

/// Show a single active product.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    path: Result<Path<ProductId>, PathRejection>,
) -> Result<Json<Product>, AppError> {
    let Path(id) = path?;
    ProductRepository::new(state.pool())
        .get_active(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}
