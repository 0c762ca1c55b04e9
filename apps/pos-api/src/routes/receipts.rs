//! Receipt retrieval and email delivery.
//!
//! The receipt is rendered once and cached on the sale as a blob; the
//! cache is write-once, so whatever the sale looked like at first render
//! is what every later fetch and email carries.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::info;

use atlas_core::receipt::{Receipt, ReceiptPayment};
use atlas_core::validation::validate_email;
use atlas_core::{PaymentState, Sale};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::routes::sales::get_sale;
use crate::AppState;

// =============================================================================
// Rendering
// =============================================================================

/// Returns the receipt bytes for a sale, rendering and caching on first
/// use.
async fn receipt_bytes(state: &AppState, sale: &Sale) -> Result<Vec<u8>, ApiError> {
    if let Some(cached) = &sale.receipt_cache {
        return Ok(cached.clone());
    }

    let settings = state.db.settings().get().await?;
    let party = state
        .db
        .parties()
        .get_by_id(&sale.party_id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("sale {} references missing party", sale.id)))?;
    let lines = state.db.sales().get_lines(&sale.id).await?;

    // Resolve mode ids to display labels; only settled payments print
    let mode_labels: HashMap<String, String> = state
        .db
        .payment_modes()
        .list()
        .await?
        .into_iter()
        .map(|mode| (mode.id, mode.name))
        .collect();

    let payments: Vec<ReceiptPayment> = state
        .db
        .payments()
        .list_for_sale(&sale.id)
        .await?
        .into_iter()
        .filter(|line| line.state == PaymentState::Success)
        .map(|line| ReceiptPayment {
            label: mode_labels
                .get(&line.mode_id)
                .cloned()
                .unwrap_or_else(|| line.mode_id.clone()),
            amount_cents: line.amount_cents,
        })
        .collect();

    let rendered = Receipt {
        store_name: &settings.store_name,
        header: settings.receipt_header.as_deref(),
        footer: settings.receipt_footer.as_deref(),
        sale,
        party_name: &party.name,
        lines: &lines,
        payments: &payments,
    }
    .render();

    state.db.sales().cache_receipt(&sale.id, &rendered).await?;
    info!(sale_id = %sale.id, bytes = rendered.len(), "Receipt rendered and cached");

    Ok(rendered)
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    /// Receipt bytes, base64 encoded.
    pub data: String,
}

/// `GET /pos/sales/:id/receipt`
pub async fn fetch(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(sale_id): Path<String>,
) -> Result<Json<ReceiptResponse>, ApiError> {
    let sale = get_sale(&state, &sale_id).await?;
    let bytes = receipt_bytes(&state, &sale).await?;

    Ok(Json(ReceiptResponse {
        data: BASE64.encode(bytes),
    }))
}

#[derive(Debug, Deserialize, Default)]
pub struct EmailReceiptRequest {
    /// Recipient override; the sale party's email is used when absent.
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EmailReceiptResponse {
    pub success: bool,
}

/// `POST /pos/sales/:id/receipt/email`
///
/// Emails the receipt as an attachment. The recipient is the request's
/// email, else the sale party's; neither → 400.
pub async fn email(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(sale_id): Path<String>,
    payload: Option<Json<EmailReceiptRequest>>,
) -> Result<Json<EmailReceiptResponse>, ApiError> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();

    let sale = get_sale(&state, &sale_id).await?;
    let bytes = receipt_bytes(&state, &sale).await?;

    let recipient = match request.email {
        Some(email) => {
            validate_email(&email)?;
            email
        }
        None => {
            let party = state
                .db
                .parties()
                .get_by_id(&sale.party_id)
                .await?
                .ok_or_else(|| {
                    ApiError::Internal(format!("sale {} references missing party", sale.id))
                })?;
            party.email.ok_or_else(|| {
                ApiError::BadRequest("no email address available for this sale".into())
            })?
        }
    };

    let settings = state.db.settings().get().await?;
    let subject = format!("Receipt from {}", settings.store_name);

    state
        .mailer
        .send_receipt(&recipient, &subject, &bytes)
        .await
        .map_err(|e| ApiError::Mail(e.to_string()))?;

    info!(sale_id = %sale.id, "Receipt emailed");
    Ok(Json(EmailReceiptResponse { success: true }))
}
