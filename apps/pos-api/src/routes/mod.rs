//! # Route Layer
//!
//! One module per resource; `router()` is separated from `serve()` so
//! tests can drive it in-process with oneshot requests.

pub mod parties;
pub mod payments;
pub mod products;
pub mod receipts;
pub mod sales;

use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::auth::AuthUser;
use crate::AppState;

/// Envelope for list responses: `{"data": [...]}`.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub data: Vec<T>,
}

/// Build the axum router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/pos/login", post(login))
        .route("/pos/categories", get(products::list_categories))
        .route("/pos/products", get(products::list_products))
        .route("/pos/parties", get(parties::list))
        .route("/pos/sales", get(sales::list).post(sales::create))
        .route("/pos/sales/:id", delete(sales::void))
        .route("/pos/sales/:id/lines", post(sales::add_line))
        .route("/pos/sales/:id/lines/:line_id", delete(sales::delete_line))
        .route(
            "/pos/sales/:id/party",
            post(sales::set_party).delete(sales::reset_party),
        )
        .route("/pos/sales/:id/pay", post(payments::pay))
        .route("/pos/sales/:id/receipt", get(receipts::fetch))
        .route("/pos/sales/:id/receipt/email", post(receipts::email))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check. The only unauthenticated route.
async fn health() -> StatusCode {
    StatusCode::OK
}

/// Response body for a successful login.
#[derive(Debug, Serialize)]
struct LoginResponse {
    id: String,
    login: String,
}

/// Validates Basic credentials and returns the authenticated identity.
///
/// All the work happens in the `AuthUser` extractor; reaching the body
/// means the credentials were good.
async fn login(user: AuthUser) -> Json<LoginResponse> {
    Json(LoginResponse {
        id: user.id,
        login: user.login,
    })
}
