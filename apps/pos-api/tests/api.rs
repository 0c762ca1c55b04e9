//! End-to-end API tests.
//!
//! Each test builds the full router over an in-memory database and
//! drives it with oneshot requests; card payments go through a local
//! mock gateway. No network listener, no fixtures on disk.

use std::collections::HashMap;

use axum::body::Body;
use axum::extract::Form;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use atlas_core::{Category, PaymentMode, PaymentProcessor, Product, Settings};
use atlas_db::{Database, DbConfig};
use atlas_pos_api::config::{ApiConfig, SmtpConfig};
use atlas_pos_api::routes::router;
use atlas_pos_api::{AppState, Mailer, StripeClient};

// =============================================================================
// Fixture
// =============================================================================

struct TestContext {
    app: Router,
    cola_id: String,
    pasta_id: String,
    drinks_id: String,
    archived_id: String,
    sharon_id: String,
    guest_id: String,
}

fn test_config() -> ApiConfig {
    ApiConfig {
        http_port: 0,
        database_path: ":memory:".to_string(),
        stripe_base_url: "http://127.0.0.1:1".to_string(), // unused unless overridden
        smtp: SmtpConfig {
            host: "127.0.0.1".to_string(),
            port: 1, // nothing listens; email sends are expected to fail
            username: None,
            password: None,
            from_address: "receipts@example.com".to_string(),
        },
    }
}

async fn insert_product(
    db: &Database,
    sku: &str,
    name: &str,
    category_id: &str,
    price_cents: i64,
    tax_rate_bps: u32,
) -> String {
    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4().to_string(),
        sku: sku.to_string(),
        name: name.to_string(),
        category_id: category_id.to_string(),
        price_cents,
        tax_rate_bps,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.products().insert(&product).await.unwrap();
    product.id
}

async fn insert_category(db: &Database, name: &str, is_active: bool) -> String {
    let category = Category {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        is_active,
    };
    db.categories().insert(&category).await.unwrap();
    category.id
}

/// Seeds an in-memory store and builds the router over it.
async fn setup_with_gateway(stripe_base_url: &str) -> TestContext {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let guest = db.parties().create("Guest", None, None).await.unwrap();
    let sharon = db
        .parties()
        .create("Sharon Mutual", Some("+1 555 0100"), Some("sharon@example.com"))
        .await
        .unwrap();

    db.settings()
        .upsert(&Settings {
            id: 1,
            store_name: "Atlas General Store".to_string(),
            currency: "usd".to_string(),
            guest_party_id: guest.id.clone(),
            receipt_prefix: "POS-".to_string(),
            next_receipt_number: 1,
            receipt_header: Some("12 Harbour Road".to_string()),
            receipt_footer: Some("Thank you!".to_string()),
        })
        .await
        .unwrap();

    db.users().create("cashier", "secret").await.unwrap();

    let drinks_id = insert_category(&db, "Drinks", true).await;
    let grocery_id = insert_category(&db, "Grocery", true).await;
    let archived_id = insert_category(&db, "Archived", false).await;

    let cola_id = insert_product(&db, "BEV-001", "Coca-Cola 330ml", &drinks_id, 299, 825).await;
    insert_product(&db, "BEV-002", "Sparkling Water", &drinks_id, 199, 825).await;
    let pasta_id = insert_product(&db, "GRO-001", "Pasta 500g", &grocery_id, 189, 0).await;
    insert_product(&db, "OLD-001", "Discontinued Thing", &archived_id, 100, 0).await;

    db.payment_modes()
        .insert(&PaymentMode {
            id: Uuid::new_v4().to_string(),
            name: "cash".to_string(),
            processor: PaymentProcessor::Cash,
            stripe_api_key: None,
        })
        .await
        .unwrap();
    db.payment_modes()
        .insert(&PaymentMode {
            id: Uuid::new_v4().to_string(),
            name: "card".to_string(),
            processor: PaymentProcessor::Stripe,
            stripe_api_key: Some("sk_test_mock".to_string()),
        })
        .await
        .unwrap();

    let config = test_config();
    let mailer = Mailer::from_config(&config.smtp).unwrap();
    let state = AppState {
        db,
        config,
        stripe: StripeClient::new(stripe_base_url),
        mailer,
    };

    TestContext {
        app: router(state),
        cola_id,
        pasta_id,
        drinks_id,
        archived_id,
        sharon_id: sharon.id,
        guest_id: guest.id,
    }
}

async fn setup() -> TestContext {
    setup_with_gateway("http://127.0.0.1:1").await
}

// =============================================================================
// Request Helpers
// =============================================================================

fn basic_auth() -> String {
    format!("Basic {}", BASE64.encode("cashier:secret"))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

/// Authenticated request with the fixture cashier.
async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let auth = basic_auth();
    send(app, method, uri, Some(&auth), body).await
}

/// Opens a draft sale and returns its id.
async fn open_sale(app: &Router) -> String {
    let (status, body) = call(app, Method::POST, "/pos/sales", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

/// Adds a line and returns the response body.
async fn add_line(app: &Router, sale_id: &str, product_id: &str, quantity: i64) -> Value {
    let (status, body) = call(
        app,
        Method::POST,
        &format!("/pos/sales/{}/lines", sale_id),
        Some(json!({"product_id": product_id, "quantity": quantity})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "add_line failed: {}", body);
    body
}

// =============================================================================
// Mock Card Gateway
// =============================================================================

async fn mock_charge(Form(params): Form<HashMap<String, String>>) -> Response {
    let token = params.get("source").cloned().unwrap_or_default();

    if token.starts_with("tok_declined") {
        (
            StatusCode::PAYMENT_REQUIRED,
            Json(json!({
                "error": {"message": "Your card was declined.", "type": "card_error"}
            })),
        )
            .into_response()
    } else {
        (
            StatusCode::OK,
            Json(json!({"id": "ch_mock_0001", "status": "succeeded"})),
        )
            .into_response()
    }
}

/// Starts a local stand-in for the card gateway, returns its base URL.
async fn spawn_mock_gateway() -> String {
    let app = Router::new().route("/v1/charges", post(mock_charge));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn health_needs_no_auth() {
    let ctx = setup().await;
    let (status, _) = send(&ctx.app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_credentials_are_forbidden() {
    let ctx = setup().await;
    let (status, _) = send(&ctx.app, Method::GET, "/pos/products", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let ctx = setup().await;
    let auth = format!("Basic {}", BASE64.encode("cashier:wrong"));
    let (status, body) = send(&ctx.app, Method::GET, "/pos/products", Some(&auth), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Login error");
}

#[tokio::test]
async fn login_returns_identity() {
    let ctx = setup().await;
    let (status, body) = call(&ctx.app, Method::POST, "/pos/login", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["login"], "cashier");
}

// =============================================================================
// Products & Categories
// =============================================================================

#[tokio::test]
async fn products_exclude_inactive_categories() {
    let ctx = setup().await;
    let (status, body) = call(&ctx.app, Method::GET, "/pos/products", None).await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();

    assert_eq!(names.len(), 3);
    assert!(names.contains(&"Coca-Cola 330ml"));
    assert!(!names.contains(&"Discontinued Thing"));
}

#[tokio::test]
async fn products_filter_by_category() {
    let ctx = setup().await;
    let (status, body) = call(
        &ctx.app,
        Method::GET,
        &format!("/pos/products?category={}", ctx.drinks_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_category_filter_falls_back_to_all() {
    let ctx = setup().await;

    // Inactive category id behaves the same as an unknown one
    let (status, body) = call(
        &ctx.app,
        Method::GET,
        &format!("/pos/products?category={}", ctx.archived_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn categories_list_active_only() {
    let ctx = setup().await;
    let (status, body) = call(&ctx.app, Method::GET, "/pos/categories", None).await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Drinks", "Grocery"]);
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn create_sale_defaults_to_guest_party() {
    let ctx = setup().await;
    let (status, body) = call(&ctx.app, Method::POST, "/pos/sales", Some(json!({}))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "draft");
    assert_eq!(body["party"]["name"], "Guest");
    assert_eq!(body["receipt_number"], "POS-000001");
    assert_eq!(body["total_cents"], 0);
}

#[tokio::test]
async fn receipt_numbers_are_sequential() {
    let ctx = setup().await;
    let (_, first) = call(&ctx.app, Method::POST, "/pos/sales", Some(json!({}))).await;
    let (_, second) = call(&ctx.app, Method::POST, "/pos/sales", Some(json!({}))).await;

    assert_eq!(first["receipt_number"], "POS-000001");
    assert_eq!(second["receipt_number"], "POS-000002");
}

#[tokio::test]
async fn create_sale_with_named_party() {
    let ctx = setup().await;
    let (status, body) = call(
        &ctx.app,
        Method::POST,
        "/pos/sales",
        Some(json!({"party_id": ctx.sharon_id})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["party"]["name"], "Sharon Mutual");
}

#[tokio::test]
async fn sales_listing_shows_own_recent_sales() {
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;

    let (status, body) = call(&ctx.app, Method::GET, "/pos/sales", None).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&sale_id.as_str()));
}

// =============================================================================
// Lines
// =============================================================================

#[tokio::test]
async fn add_line_computes_totals() {
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;

    // 3 × $2.99 at 8.25%: subtotal 897, tax 74, total 971
    let body = add_line(&ctx.app, &sale_id, &ctx.cola_id, 3).await;

    assert_eq!(body["untaxed_cents"], 897);
    assert_eq!(body["tax_cents"], 74);
    assert_eq!(body["total_cents"], 971);
    assert!(body["line_id"].is_string());
}

#[tokio::test]
async fn adding_same_product_accumulates_quantity() {
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;

    let first = add_line(&ctx.app, &sale_id, &ctx.cola_id, 2).await;
    let second = add_line(&ctx.app, &sale_id, &ctx.cola_id, 1).await;

    // Same line, now at quantity 3
    assert_eq!(first["line_id"], second["line_id"]);
    assert_eq!(second["untaxed_cents"], 897);
    assert_eq!(second["tax_cents"], 74);
    assert_eq!(second["total_cents"], 971);
}

#[tokio::test]
async fn lines_for_different_products_are_separate() {
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;

    let first = add_line(&ctx.app, &sale_id, &ctx.cola_id, 1).await;
    let second = add_line(&ctx.app, &sale_id, &ctx.pasta_id, 2).await;

    assert_ne!(first["line_id"], second["line_id"]);
    // 299 + 25 tax + 2×189 = 702 untaxed
    assert_eq!(second["untaxed_cents"], 299 + 378);
    assert_eq!(second["tax_cents"], 25);
}

#[tokio::test]
async fn add_line_rejects_bad_input() {
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/lines", sale_id),
        Some(json!({"product_id": ctx.cola_id, "quantity": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/lines", sale_id),
        Some(json!({"product_id": "no-such-product", "quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_line_recomputes_totals() {
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;

    let body = add_line(&ctx.app, &sale_id, &ctx.cola_id, 3).await;
    let line_id = body["line_id"].as_str().unwrap();

    let (status, body) = call(
        &ctx.app,
        Method::DELETE,
        &format!("/pos/sales/{}/lines/{}", sale_id, line_id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["untaxed_cents"], 0);
    assert_eq!(body["total_cents"], 0);
}

#[tokio::test]
async fn delete_unknown_line_is_not_found() {
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;

    let (status, _) = call(
        &ctx.app,
        Method::DELETE,
        &format!("/pos/sales/{}/lines/{}", sale_id, "no-such-line"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Customer Attachment
// =============================================================================

#[tokio::test]
async fn attach_existing_party() {
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;

    let (status, body) = call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/party", sale_id),
        Some(json!({"party_id": ctx.sharon_id})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["party"]["name"], "Sharon Mutual");
}

#[tokio::test]
async fn attach_inline_party_creates_it() {
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;

    let (status, body) = call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/party", sale_id),
        Some(json!({"name": "Walk In", "email": "walkin@example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["party"]["name"], "Walk In");
    assert_eq!(body["party"]["email"], "walkin@example.com");

    // The inline party is now listed
    let (_, parties) = call(&ctx.app, Method::GET, "/pos/parties", None).await;
    let names: Vec<&str> = parties["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Walk In"));
}

#[tokio::test]
async fn detach_party_restores_guest() {
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;

    call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/party", sale_id),
        Some(json!({"party_id": ctx.sharon_id})),
    )
    .await;

    let (status, body) = call(
        &ctx.app,
        Method::DELETE,
        &format!("/pos/sales/{}/party", sale_id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["party"]["id"], ctx.guest_id);
}

// =============================================================================
// Payments
// =============================================================================

#[tokio::test]
async fn cash_payment_settles_and_completes_sale() {
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;
    add_line(&ctx.app, &sale_id, &ctx.cola_id, 3).await; // total 971

    let (status, body) = call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/pay", sale_id),
        Some(json!({"mode": "cash", "amount_cents": 971})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let lines = body["data"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["state"], "success");
    assert_eq!(lines[0]["reference"], "paid by cash");

    // Fully paid → completed; the sale no longer accepts mutations
    let (status, _) = call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/lines", sale_id),
        Some(json!({"product_id": ctx.cola_id, "quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn partial_payment_leaves_sale_open() {
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;
    add_line(&ctx.app, &sale_id, &ctx.cola_id, 3).await; // total 971

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/pay", sale_id),
        Some(json!({"mode": "cash", "amount_cents": 500})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Second tender covers the rest and completes the sale
    let (status, body) = call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/pay", sale_id),
        Some(json!({"mode": "cash", "amount_cents": 471})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, sales) = call(&ctx.app, Method::GET, "/pos/sales", None).await;
    let sale = sales["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == sale_id.as_str())
        .unwrap();
    assert_eq!(sale["status"], "completed");
}

#[tokio::test]
async fn pay_rejects_unknown_mode_and_bad_amount() {
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;
    add_line(&ctx.app, &sale_id, &ctx.cola_id, 1).await;

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/pay", sale_id),
        Some(json!({"mode": "cheque", "amount_cents": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/pay", sale_id),
        Some(json!({"mode": "cash", "amount_cents": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn card_payment_records_gateway_charge() {
    let gateway = spawn_mock_gateway().await;
    let ctx = setup_with_gateway(&gateway).await;

    let sale_id = open_sale(&ctx.app).await;
    add_line(&ctx.app, &sale_id, &ctx.cola_id, 3).await; // total 971

    let (status, body) = call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/pay", sale_id),
        Some(json!({"mode": "card", "amount_cents": 971, "card_token": "tok_visa"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let lines = body["data"].as_array().unwrap();
    assert_eq!(lines[0]["state"], "success");
    assert_eq!(lines[0]["reference"], "ch_mock_0001");
}

#[tokio::test]
async fn declined_card_marks_line_failed() {
    let gateway = spawn_mock_gateway().await;
    let ctx = setup_with_gateway(&gateway).await;

    let sale_id = open_sale(&ctx.app).await;
    add_line(&ctx.app, &sale_id, &ctx.cola_id, 3).await;

    let (status, body) = call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/pay", sale_id),
        Some(json!({"mode": "card", "amount_cents": 971, "card_token": "tok_declined"})),
    )
    .await;

    // A decline is a recorded outcome, not an HTTP failure
    assert_eq!(status, StatusCode::OK);
    let lines = body["data"].as_array().unwrap();
    assert_eq!(lines[0]["state"], "failed");
    let reference = lines[0]["reference"].as_str().unwrap();
    assert!(reference.contains("tok_declined"));
    assert!(reference.contains("reason for failure"));

    // Failed payments don't complete the sale
    let (_, sales) = call(&ctx.app, Method::GET, "/pos/sales", None).await;
    let sale = sales["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == sale_id.as_str())
        .unwrap();
    assert_eq!(sale["status"], "draft");
}

#[tokio::test]
async fn card_payment_requires_token() {
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;
    add_line(&ctx.app, &sale_id, &ctx.cola_id, 1).await;

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/pay", sale_id),
        Some(json!({"mode": "card", "amount_cents": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unreachable_gateway_is_bad_gateway() {
    // Fixture's gateway URL points at a closed port
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;
    add_line(&ctx.app, &sale_id, &ctx.cola_id, 1).await;

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/pay", sale_id),
        Some(json!({"mode": "card", "amount_cents": 100, "card_token": "tok_visa"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

// =============================================================================
// Void
// =============================================================================

#[tokio::test]
async fn void_draft_sale() {
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;

    let (status, _) = call(
        &ctx.app,
        Method::DELETE,
        &format!("/pos/sales/{}", sale_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Voided sales refuse further mutation
    let (status, _) = call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/lines", sale_id),
        Some(json!({"product_id": ctx.cola_id, "quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(
        &ctx.app,
        Method::DELETE,
        &format!("/pos/sales/{}", sale_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// =============================================================================
// Receipts
// =============================================================================

#[tokio::test]
async fn receipt_renders_and_is_cached() {
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;
    add_line(&ctx.app, &sale_id, &ctx.cola_id, 3).await;

    let (status, body) = call(
        &ctx.app,
        Method::GET,
        &format!("/pos/sales/{}/receipt", sale_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let bytes = BASE64.decode(body["data"].as_str().unwrap()).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("Atlas General Store"));
    assert!(text.contains("Coca-Cola 330ml"));
    assert!(text.contains("$9.71"));

    // Cache is write-once: a later mutation does not change the receipt
    add_line(&ctx.app, &sale_id, &ctx.pasta_id, 1).await;
    let (_, second) = call(
        &ctx.app,
        Method::GET,
        &format!("/pos/sales/{}/receipt", sale_id),
        None,
    )
    .await;
    assert_eq!(body["data"], second["data"]);
}

#[tokio::test]
async fn receipt_for_unknown_sale_is_not_found() {
    let ctx = setup().await;
    let (status, _) = call(
        &ctx.app,
        Method::GET,
        "/pos/sales/no-such-sale/receipt",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn email_receipt_without_address_is_rejected() {
    let ctx = setup().await;
    // Guest party has no email and the request supplies none
    let sale_id = open_sale(&ctx.app).await;
    add_line(&ctx.app, &sale_id, &ctx.cola_id, 1).await;

    let (status, body) = call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/receipt/email", sale_id),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn email_receipt_rejects_invalid_address() {
    let ctx = setup().await;
    let sale_id = open_sale(&ctx.app).await;

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        &format!("/pos/sales/{}/receipt/email", sale_id),
        Some(json!({"email": "not-an-address"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
