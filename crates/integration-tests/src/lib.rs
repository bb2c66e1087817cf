//! Integration test harness for the Film Gaming Seller API.
//!
//! Each [`TestApp`] owns a fresh SQLite database in a temporary directory,
//! migrated and wired into the real router. Requests go through the full
//! middleware stack via `tower::ServiceExt::oneshot`; no socket is bound.
//!
//! ```bash
//! cargo test -p fgs-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use fgs_core::{AdminRole, Money, ProductId};
use fgs_server::config::ServerConfig;
use fgs_server::db::{self, ProductRepository};
use fgs_server::models::NewProduct;
use fgs_server::services::AuthService;
use fgs_server::{AppState, router};

/// Signing secret used by every test app.
pub const TEST_JWT_SECRET: &str = "integration-test-signing-key-5f1c9a7e2b84d063";

/// Password given to admins created through [`TestApp::create_admin`].
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// A running application backed by its own database.
pub struct TestApp {
    pub pool: SqlitePool,
    app: Router,
    _dir: TempDir,
}

/// Status, headers and parsed JSON body of a response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    /// Start an app with default configuration.
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Start an app after adjusting its configuration.
    pub async fn spawn_with(configure: impl FnOnce(&mut ServerConfig)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("fgs.db").display());

        let mut config = ServerConfig::for_database(&url, TEST_JWT_SECRET);
        configure(&mut config);

        let pool = db::create_pool(&SecretString::from(url)).await.unwrap();
        db::migrate(&pool).await.unwrap();

        let app = router(AppState::new(config, pool.clone()));
        Self {
            pool,
            app,
            _dir: dir,
        }
    }

    /// Insert an active product priced in whole baht.
    pub async fn seed_product(&self, name: &str, price_baht: i64, stock: i64) -> ProductId {
        let product = NewProduct {
            name: name.to_owned(),
            description: None,
            price: Money::from_major(price_baht).unwrap(),
            original_price: None,
            discount_percent: 0,
            category: "เกมไทย".to_owned(),
            subcategory: Some("ROV".to_owned()),
            image_url: None,
            stock_quantity: stock,
            is_featured: false,
            is_active: true,
        };
        ProductRepository::new(&self.pool)
            .create(&product)
            .await
            .unwrap()
            .id
    }

    /// Current stock of a product.
    pub async fn stock_of(&self, id: ProductId) -> i64 {
        ProductRepository::new(&self.pool)
            .get(id)
            .await
            .unwrap()
            .unwrap()
            .stock_quantity
    }

    /// Number of order rows.
    pub async fn order_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    /// Create an admin account with [`TEST_PASSWORD`].
    pub async fn create_admin(&self, username: &str, role: AdminRole) {
        AuthService::new(&self.pool)
            .create_admin(username, None, role, TEST_PASSWORD)
            .await
            .unwrap();
    }

    /// Create an admin and log in, returning the bearer token.
    pub async fn admin_token(&self, username: &str, role: AdminRole) -> String {
        self.create_admin(username, role).await;
        let response = self
            .post(
                "/api/admin/login",
                None,
                &serde_json::json!({ "username": username, "password": TEST_PASSWORD }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.body["token"].as_str().unwrap().to_owned()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: &Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body.to_string()))
            .await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: &Value) -> TestResponse {
        self.send(Method::PUT, uri, token, Some(body.to_string()))
            .await
    }

    /// Send a request with an arbitrary (possibly malformed) JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// A valid checkout body for `product_id`.
#[must_use]
pub fn order_body(product_id: ProductId, quantity: i64) -> Value {
    serde_json::json!({
        "customer_name": "Somchai Jaidee",
        "customer_email": "somchai@example.co.th",
        "customer_phone": "0812345678",
        "customer_line": "@somchai",
        "product_id": product_id,
        "quantity": quantity,
        "payment_method": "promptpay",
    })
}
