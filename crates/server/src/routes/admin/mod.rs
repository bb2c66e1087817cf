//! Admin API handlers. Every route except login requires a bearer token.

use axum::{
    Router,
    routing::{get, post, put},
};
use serde::Serialize;

use crate::state::AppState;

pub mod auth;
pub mod orders;
pub mod products;
pub mod settings;
pub mod stats;

/// Generic acknowledgement body.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
}

/// Login route, kept separate so it can carry a stricter rate limit.
pub fn login_routes() -> Router<AppState> {
    Router::new().route("/login", post(auth::login))
}

/// Token-protected admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats::show))
        // Orders
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show).put(orders::update))
        .route("/orders/by-number/{order_id}", get(orders::lookup))
        // Products
        .route("/products", get(products::index).post(products::create))
        .route("/products/{id}", put(products::update))
        .route("/products/{id}/restock", post(products::restock))
        // Settings
        .route("/settings", get(settings::show).put(settings::update))
}
