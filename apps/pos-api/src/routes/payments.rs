//! Taking payments against a sale.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use atlas_core::validation::validate_payment_amount;
use atlas_core::{CoreError, PaymentLine};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::processor;
use crate::routes::sales::get_draft_sale;
use crate::routes::ListResponse;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PayRequest {
    /// Payment mode name, e.g. "cash" or "card".
    pub mode: String,
    pub amount_cents: i64,
    /// Card token from the till; required for card modes.
    pub card_token: Option<String>,
}

/// `POST /pos/sales/:id/pay`
///
/// Creates a draft payment line, runs the mode's processor over it, and
/// returns every payment line of the sale. When successful payments
/// reach the sale total the sale is finalized.
pub async fn pay(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(sale_id): Path<String>,
    Json(request): Json<PayRequest>,
) -> Result<Json<ListResponse<PaymentLine>>, ApiError> {
    let sale = get_draft_sale(&state, &sale_id).await?;
    validate_payment_amount(request.amount_cents)?;

    let mode = state
        .db
        .payment_modes()
        .get_by_name(&request.mode)
        .await?
        .ok_or_else(|| CoreError::UnknownPaymentMode(request.mode.clone()))?;

    let line = state
        .db
        .payments()
        .create(&sale.id, &mode.id, request.amount_cents)
        .await?;

    processor::process(&state, &mode, &line, &sale, request.card_token.as_deref()).await?;

    // Fully paid sales are finalized; partial payments leave the sale
    // open for the next tender
    let paid = state.db.payments().total_paid(&sale.id).await?;
    if sale.total_cents > 0 && paid >= sale.total_cents {
        state.db.sales().finalize(&sale.id).await?;
        info!(sale_id = %sale.id, paid = paid, "Sale fully paid");
    }

    let lines = state.db.payments().list_for_sale(&sale.id).await?;
    Ok(Json(ListResponse { data: lines }))
}
