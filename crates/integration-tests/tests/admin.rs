//! Admin API over HTTP.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use fgs_core::AdminRole;
use fgs_integration_tests::{TEST_PASSWORD, TestApp, order_body};

#[tokio::test]
async fn test_login_issues_token() {
    let app = TestApp::spawn().await;
    app.create_admin("owner", AdminRole::SuperAdmin).await;

    let response = app
        .post(
            "/api/admin/login",
            None,
            &json!({ "username": "owner", "password": TEST_PASSWORD }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert!(!response.body["token"].as_str().unwrap().is_empty());
    assert_eq!(response.body["user"]["username"], "owner");
    assert_eq!(response.body["user"]["role"], "super_admin");
    assert!(response.body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = TestApp::spawn().await;
    app.create_admin("owner", AdminRole::Admin).await;

    for (username, password) in [("owner", "wrong password!"), ("nobody", TEST_PASSWORD)] {
        let response = app
            .post(
                "/api/admin/login",
                None,
                &json!({ "username": username, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body["code"], "unauthorized");
        assert!(response.body.get("token").is_none());
    }
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = TestApp::spawn().await;

    for uri in [
        "/api/admin/stats",
        "/api/admin/orders",
        "/api/admin/products",
        "/api/admin/settings",
    ] {
        let missing = app.get(uri, None).await;
        assert_eq!(missing.status, StatusCode::UNAUTHORIZED, "{uri}");

        let forged = app.get(uri, Some("not.a.token")).await;
        assert_eq!(forged.status, StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_completing_order_changes_only_status() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("ROV Diamonds 42฿", 42, 100).await;
    let token = app.admin_token("owner", AdminRole::Admin).await;

    let placed = app.post("/api/orders", None, &order_body(product, 2)).await;
    let id = placed.body["order"]["id"].as_i64().unwrap();
    let uri = format!("/api/admin/orders/{id}");

    let premature = app
        .put(&uri, Some(&token), &json!({ "order_status": "completed" }))
        .await;
    assert_eq!(premature.status, StatusCode::BAD_REQUEST);

    let response = app
        .put(
            &uri,
            Some(&token),
            &json!({ "order_status": "completed", "payment_status": "paid" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body, json!({ "success": true }));

    let order = app.get(&uri, Some(&token)).await.body;
    assert_eq!(order["order_status"], "completed");
    assert_eq!(order["payment_status"], "paid");
    assert_eq!(order["total_amount"], "84.00");
    assert_eq!(order["product_id"], product.as_i64());
    assert_eq!(order["quantity"], 2);

    let reopened = app
        .put(&uri, Some(&token), &json!({ "order_status": "pending" }))
        .await;
    assert_eq!(reopened.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_unknown_order_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.admin_token("owner", AdminRole::Admin).await;

    let response = app
        .put(
            "/api/admin/orders/4242",
            Some(&token),
            &json!({ "payment_status": "paid" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_viewer_can_read_but_not_write() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("ROV Diamonds 42฿", 42, 10).await;
    let placed = app.post("/api/orders", None, &order_body(product, 1)).await;
    let id = placed.body["order"]["id"].as_i64().unwrap();
    let token = app.admin_token("auditor", AdminRole::Viewer).await;

    let orders = app.get("/api/admin/orders", Some(&token)).await;
    assert_eq!(orders.status, StatusCode::OK);
    assert_eq!(orders.body.as_array().unwrap().len(), 1);

    let writes = [
        app.put(
            &format!("/api/admin/orders/{id}"),
            Some(&token),
            &json!({ "payment_status": "paid" }),
        )
        .await,
        app.put("/api/admin/settings", Some(&token), &json!({ "line_id": "@x" }))
            .await,
        app.post(
            &format!("/api/admin/products/{}/restock", product.as_i64()),
            Some(&token),
            &json!({ "quantity": 5 }),
        )
        .await,
    ];
    for response in writes {
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(response.body["code"], "forbidden");
    }
    assert_eq!(app.stock_of(product).await, 9);
}

#[tokio::test]
async fn test_stats_count_orders_and_revenue() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("ROV Diamonds 42฿", 42, 10).await;
    let token = app.admin_token("owner", AdminRole::Admin).await;

    app.post("/api/orders", None, &order_body(product, 2)).await;
    app.post("/api/orders", None, &order_body(product, 1)).await;

    let stats = app.get("/api/admin/stats", Some(&token)).await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.body["total_orders"], 2);
    assert_eq!(stats.body["total_revenue"], "126.00");
    assert_eq!(stats.body["today_orders"], 2);
    assert_eq!(stats.body["today_revenue"], "126.00");
}

#[tokio::test]
async fn test_order_list_filters_and_limits() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("ROV Diamonds 42฿", 42, 10).await;
    let token = app.admin_token("owner", AdminRole::Admin).await;

    let first = app.post("/api/orders", None, &order_body(product, 1)).await;
    app.post("/api/orders", None, &order_body(product, 1)).await;
    let id = first.body["order"]["id"].as_i64().unwrap();
    app.put(
        &format!("/api/admin/orders/{id}"),
        Some(&token),
        &json!({ "order_status": "cancelled" }),
    )
    .await;

    let cancelled = app
        .get("/api/admin/orders?status=cancelled", Some(&token))
        .await;
    let cancelled = cancelled.body.as_array().unwrap().clone();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled.first().unwrap()["id"], id);

    let limited = app.get("/api/admin/orders?limit=1", Some(&token)).await;
    assert_eq!(limited.body.as_array().unwrap().len(), 1);

    let too_many = app.get("/api/admin/orders?limit=501", Some(&token)).await;
    assert_eq!(too_many.status, StatusCode::BAD_REQUEST);

    // Cancelling does not return stock
    assert_eq!(app.stock_of(product).await, 8);
}

#[tokio::test]
async fn test_product_management() {
    let app = TestApp::spawn().await;
    let token = app.admin_token("owner", AdminRole::Admin).await;

    let created = app
        .post(
            "/api/admin/products",
            Some(&token),
            &json!({
                "name": "ROV Diamonds 170฿",
                "price": 170,
                "original_price": 200,
                "discount_percent": 15,
                "category": "เกมไทย",
                "subcategory": "ROV",
                "stock_quantity": 5,
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    assert_eq!(created.body["price"], "170.00");
    let id = created.body["id"].as_i64().unwrap();

    let invalid = app
        .put(
            &format!("/api/admin/products/{id}"),
            Some(&token),
            &json!({ "price": 250 }),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let featured = app
        .put(
            &format!("/api/admin/products/{id}"),
            Some(&token),
            &json!({ "is_featured": true, "price": 160 }),
        )
        .await;
    assert_eq!(featured.status, StatusCode::OK);
    assert_eq!(featured.body["is_featured"], true);
    assert_eq!(featured.body["price"], "160.00");
    assert_eq!(featured.body["stock_quantity"], 5);

    let restocked = app
        .post(
            &format!("/api/admin/products/{id}/restock"),
            Some(&token),
            &json!({ "quantity": 20 }),
        )
        .await;
    assert_eq!(
        restocked.body,
        json!({ "success": true, "stock_quantity": 25 })
    );

    let rejected = app
        .post(
            &format!("/api/admin/products/{id}/restock"),
            Some(&token),
            &json!({ "quantity": 0 }),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);

    let missing = app
        .post(
            "/api/admin/products/9999/restock",
            Some(&token),
            &json!({ "quantity": 1 }),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_product_list_includes_inactive() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("True Credit 20฿", 20, 10).await;
    app.seed_product("AIS Credit 20฿", 20, 10).await;
    let token = app.admin_token("owner", AdminRole::Admin).await;

    app.put(
        &format!("/api/admin/products/{}", product.as_i64()),
        Some(&token),
        &json!({ "is_active": false }),
    )
    .await;

    let public = app.get("/api/products", None).await;
    assert_eq!(public.body.as_array().unwrap().len(), 1);

    let admin = app.get("/api/admin/products", Some(&token)).await;
    assert_eq!(admin.body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_settings_round_trip_and_validation() {
    let app = TestApp::spawn().await;
    let token = app.admin_token("owner", AdminRole::Admin).await;

    let saved = app
        .put(
            "/api/admin/settings",
            Some(&token),
            &json!({ "line_id": "@filmgaming", "promptpay_id": "0899999999" }),
        )
        .await;
    assert_eq!(saved.body, json!({ "success": true }));

    let settings = app.get("/api/admin/settings", Some(&token)).await;
    assert_eq!(settings.body["line_id"], "@filmgaming");
    assert_eq!(settings.body["promptpay_id"], "0899999999");

    let bad_key = app
        .put(
            "/api/admin/settings",
            Some(&token),
            &json!({ "": "value", "line_id": "@other" }),
        )
        .await;
    assert_eq!(bad_key.status, StatusCode::BAD_REQUEST);

    // Rejected batches write nothing
    let settings = app.get("/api/admin/settings", Some(&token)).await;
    assert_eq!(settings.body["line_id"], "@filmgaming");
}

#[tokio::test]
async fn test_oversized_restock_is_rejected_and_catalog_survives() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("ROV Diamonds 42฿", 42, 10).await;
    let token = app.admin_token("owner", AdminRole::Admin).await;
    let uri = format!("/api/admin/products/{}/restock", product.as_i64());

    for quantity in [i64::MAX, 1_000_001] {
        let response = app
            .post(&uri, Some(&token), &json!({ "quantity": quantity }))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{quantity}");
        assert_eq!(response.body["code"], "validation_error");
    }
    assert_eq!(app.stock_of(product).await, 10);

    let catalog = app.get("/api/products", None).await;
    assert_eq!(catalog.status, StatusCode::OK);
    assert_eq!(catalog.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_lookup_order_by_number() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("ROV Diamonds 42฿", 42, 10).await;
    let token = app.admin_token("auditor", AdminRole::Viewer).await;

    let placed = app.post("/api/orders", None, &order_body(product, 2)).await;
    let number = placed.body["order"]["order_id"].as_str().unwrap().to_owned();

    let found = app
        .get(&format!("/api/admin/orders/by-number/{number}"), Some(&token))
        .await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body["id"], placed.body["order"]["id"]);
    assert_eq!(found.body["total_amount"], "84.00");

    let missing = app
        .get("/api/admin/orders/by-number/FGS-0-NONE0", Some(&token))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let anonymous = app
        .get(&format!("/api/admin/orders/by-number/{number}"), None)
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_null_clears_nullable_product_fields() {
    let app = TestApp::spawn().await;
    let token = app.admin_token("owner", AdminRole::Admin).await;

    let created = app
        .post(
            "/api/admin/products",
            Some(&token),
            &json!({
                "name": "ROV Diamonds 42฿",
                "description": "Instant delivery",
                "price": 42,
                "original_price": 50,
                "discount_percent": 16,
                "category": "เกมไทย",
                "subcategory": "ROV",
            }),
        )
        .await;
    let uri = format!("/api/admin/products/{}", created.body["id"]);

    let repriced = app
        .put(
            &uri,
            Some(&token),
            &json!({ "price": 60, "original_price": null, "discount_percent": 0 }),
        )
        .await;
    assert_eq!(repriced.status, StatusCode::OK, "{}", repriced.body);
    assert_eq!(repriced.body["price"], "60.00");
    assert!(repriced.body["original_price"].is_null());
    assert_eq!(repriced.body["description"], "Instant delivery");

    let cleared = app
        .put(&uri, Some(&token), &json!({ "description": null, "subcategory": null }))
        .await;
    assert!(cleared.body["description"].is_null());
    assert!(cleared.body["subcategory"].is_null());
    assert_eq!(cleared.body["price"], "60.00");
}

#[tokio::test]
async fn test_order_notes_can_be_cleared() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("ROV Diamonds 42฿", 42, 10).await;
    let token = app.admin_token("owner", AdminRole::Admin).await;

    let placed = app.post("/api/orders", None, &order_body(product, 1)).await;
    let uri = format!("/api/admin/orders/{}", placed.body["order"]["id"]);

    app.put(&uri, Some(&token), &json!({ "notes": "waiting for slip" }))
        .await;
    assert_eq!(app.get(&uri, Some(&token)).await.body["notes"], "waiting for slip");

    app.put(&uri, Some(&token), &json!({ "payment_status": "paid" }))
        .await;
    assert_eq!(app.get(&uri, Some(&token)).await.body["notes"], "waiting for slip");

    let cleared = app.put(&uri, Some(&token), &json!({ "notes": "" })).await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert!(app.get(&uri, Some(&token)).await.body["notes"].is_null());
}
