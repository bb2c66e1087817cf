//! Admin catalog management.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use fgs_core::ProductId;

use crate::db::{ProductRepository, RepositoryError};
use crate::error::AppError;
use crate::middleware::{RequireAdmin, RequireAdminWriter};
use crate::models::{NewProduct, Product, ProductFilter, ProductUpdate};
use crate::state::AppState;

/// Largest number of units a single restock may add.
pub const MAX_RESTOCK: i64 = 1_000_000;

/// Restock request body.
#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: i64,
}

/// Restock result.
#[derive(Debug, Serialize)]
pub struct RestockResponse {
    pub success: bool,
    pub stock_quantity: i64,
}

/// List every product, including inactive ones.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_claims): RequireAdmin,
) -> Result<Json<Vec<Product>>, AppError> {
    let filter = ProductFilter {
        include_inactive: true,
        ..ProductFilter::default()
    };
    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(products))
}

/// Add a product to the catalog.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAdminWriter(_claims): RequireAdminWriter,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let Json(product) = body?;
    product.validate().map_err(AppError::Validation)?;

    let product = ProductRepository::new(state.pool()).create(&product).await?;
    tracing::info!(product_id = %product.id, name = %product.name, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Partially update a product. Stock is not editable here.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    RequireAdminWriter(_claims): RequireAdminWriter,
    path: Result<Path<ProductId>, PathRejection>,
    body: Result<Json<ProductUpdate>, JsonRejection>,
) -> Result<Json<Product>, AppError> {
    let Path(id) = path?;
    let Json(update) = body?;

    let products = ProductRepository::new(state.pool());
    let current = products
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let merged = update.merge(&current).map_err(AppError::Validation)?;
    let product = products.update(&merged).await?;
    tracing::info!(product_id = %product.id, "product updated");
    Ok(Json(product))
}

/// Add units to a product's stock.
#[instrument(skip_all)]
pub async fn restock(
    State(state): State<AppState>,
    RequireAdminWriter(_claims): RequireAdminWriter,
    path: Result<Path<ProductId>, PathRejection>,
    body: Result<Json<RestockRequest>, JsonRejection>,
) -> Result<Json<RestockResponse>, AppError> {
    let Path(id) = path?;
    let Json(request) = body?;

    if !(1..=MAX_RESTOCK).contains(&request.quantity) {
        return Err(AppError::Validation(format!(
            "quantity must be between 1 and {MAX_RESTOCK}"
        )));
    }

    let stock_quantity = ProductRepository::new(state.pool())
        .restock(id, request.quantity)
        .await
        .map_err(|err| match err {
            RepositoryError::Conflict(msg) => AppError::Validation(msg),
            other => other.into(),
        })?;
    tracing::info!(product_id = %id, added = request.quantity, stock_quantity, "product restocked");

    Ok(Json(RestockResponse {
        success: true,
        stock_quantity,
    }))
}
