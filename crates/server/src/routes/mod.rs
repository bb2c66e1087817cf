//! HTTP routes.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Database readiness
//!
//! # Public API
//! GET  /api/products                    - Active catalog (category, subcategory, search, featured)
//! GET  /api/products/{id}               - Single active product
//! POST /api/orders                      - Place an order
//!
//! # Admin API (bearer token; writes need admin or super_admin)
//! POST /api/admin/login                 - Exchange credentials for a token
//! GET  /api/admin/stats                 - Order and revenue totals
//! GET  /api/admin/orders                - Order list (status, limit)
//! GET  /api/admin/orders/{id}           - Single order
//! PUT  /api/admin/orders/{id}           - Update statuses / notes
//! GET  /api/admin/orders/by-number/{order_id} - Lookup by customer-facing number
//! GET  /api/admin/products              - Full catalog incl. inactive
//! POST /api/admin/products              - Create product
//! PUT  /api/admin/products/{id}         - Partial product update
//! POST /api/admin/products/{id}/restock - Add stock
//! GET  /api/admin/settings              - Settings map
//! PUT  /api/admin/settings              - Upsert settings
//! ```

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Method, Request, Response, header},
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::{
    api_rate_limiter, login_rate_limiter, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

pub mod admin;
pub mod health;
pub mod orders;
pub mod products;

/// Public and admin API routes, mounted under `/api`.
pub fn api_routes(rate_limit: bool) -> Router<AppState> {
    let mut login = admin::login_routes();
    if rate_limit {
        login = login.layer(login_rate_limiter());
    }

    let api = Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/orders", post(orders::create))
        .nest("/admin", admin::routes().merge(login));

    if rate_limit {
        api.layer(api_rate_limiter())
    } else {
        api
    }
}

/// Build the complete application with middleware.
pub fn router(state: AppState) -> Router {
    let config = state.config();

    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri().path(),
                request_id = tracing::field::Empty,
                admin = tracing::field::Empty,
                status = tracing::field::Empty,
                latency_ms = tracing::field::Empty,
            )
        })
        .on_response(|response: &Response<Body>, latency: Duration, span: &Span| {
            span.record("status", response.status().as_u16());
            span.record(
                "latency_ms",
                u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
            );
            DefaultOnResponse::default().on_response(response, latency, span);
        });

    let mut app = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes(config.rate_limit))
        .fallback(not_found)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(trace);

    if let Some(cors) = config.cors_origin.as_deref().and_then(cors_layer) {
        app = app.layer(cors);
    }

    app.with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let Ok(origin) = HeaderValue::from_str(origin) else {
        tracing::warn!(origin, "ignoring invalid CORS origin");
        return None;
    };

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .max_age(Duration::from_secs(3600)),
    )
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
