//! # Atlas POS API
//!
//! HTTP JSON server for cashier terminals.
//!
//! ## Endpoints
//! All routes except `/health` require HTTP Basic credentials validated
//! against the users table.
//!
//! - `POST   /pos/login` - validate credentials
//! - `GET    /pos/categories` - active categories
//! - `GET    /pos/products?category=<id>` - POS-visible products
//! - `GET    /pos/parties` - customers
//! - `GET    /pos/sales` / `POST /pos/sales` - list / open sales
//! - `DELETE /pos/sales/:id` - void a draft sale
//! - `POST   /pos/sales/:id/lines` - add or accumulate a line
//! - `DELETE /pos/sales/:id/lines/:line_id` - remove a line
//! - `POST   /pos/sales/:id/party` / `DELETE ...` - attach/detach customer
//! - `POST   /pos/sales/:id/pay` - take a payment (cash or card)
//! - `GET    /pos/sales/:id/receipt` - rendered receipt, base64
//! - `POST   /pos/sales/:id/receipt/email` - email the receipt
//!
//! ## Configuration
//! Environment variables (see [`config::ApiConfig`]):
//! - `HTTP_PORT` - listen port (default: 8080)
//! - `DATABASE_PATH` - SQLite file (default: ./atlas.db)
//! - `STRIPE_API_BASE` - card gateway base URL
//! - `SMTP_HOST` / `SMTP_PORT` / `SMTP_USERNAME` / `SMTP_PASSWORD` / `SMTP_FROM`

pub mod auth;
pub mod config;
pub mod error;
pub mod mailer;
pub mod processor;
pub mod routes;
pub mod stripe;

use atlas_db::Database;

pub use config::ApiConfig;
pub use error::ApiError;
pub use mailer::Mailer;
pub use stripe::StripeClient;

/// Shared application state.
///
/// Cloned per request by axum; every member is itself a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: ApiConfig,
    pub stripe: StripeClient,
    pub mailer: Mailer,
}
