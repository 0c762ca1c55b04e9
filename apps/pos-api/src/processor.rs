//! Payment processor dispatch.
//!
//! A payment line is created in draft state, then handed to the
//! processor selected by its payment mode:
//!
//! ```text
//! PaymentMode.processor
//!      │
//!      ├── Cash   → settle immediately, reference "paid by cash"
//!      │
//!      └── Stripe → charge the card token through the gateway
//!                     ├── settled  → success, reference = charge id
//!                     ├── declined → failed, reference records token
//!                     │              and the decline reason
//!                     └── gateway/transport trouble → 502, line stays
//!                         draft for the till to retry
//! ```

use tracing::{info, warn};

use atlas_core::{PaymentLine, PaymentMode, PaymentProcessor, Sale};

use crate::error::ApiError;
use crate::stripe::{ChargeRequest, StripeError};
use crate::AppState;

/// Reference recorded on successful cash payments.
const CASH_REFERENCE: &str = "paid by cash";

/// Runs the processor for a freshly created draft payment line.
///
/// Settles the line into success/failed where the processor produced a
/// business outcome; infrastructure failures propagate without touching
/// the line.
pub async fn process(
    state: &AppState,
    mode: &PaymentMode,
    line: &PaymentLine,
    sale: &Sale,
    card_token: Option<&str>,
) -> Result<(), ApiError> {
    match mode.processor {
        PaymentProcessor::Cash => process_cash(state, line).await,
        PaymentProcessor::Stripe => process_stripe(state, mode, line, sale, card_token).await,
    }
}

/// Cash is as easy as paying by cash.
async fn process_cash(state: &AppState, line: &PaymentLine) -> Result<(), ApiError> {
    state.db.payments().mark_success(&line.id, CASH_REFERENCE).await?;

    info!(line_id = %line.id, amount = line.amount_cents, "Cash payment settled");
    Ok(())
}

/// Charges the card token through the gateway and settles the line.
async fn process_stripe(
    state: &AppState,
    mode: &PaymentMode,
    line: &PaymentLine,
    sale: &Sale,
    card_token: Option<&str>,
) -> Result<(), ApiError> {
    let token = card_token
        .ok_or_else(|| ApiError::BadRequest("card_token is required for card payments".into()))?;

    let api_key = mode.stripe_api_key.as_deref().ok_or_else(|| {
        ApiError::Internal(format!("payment mode {} has no gateway key", mode.name))
    })?;

    let settings = state.db.settings().get().await?;
    let description = format!("For Sale ID:{}", sale.id);

    let request = ChargeRequest {
        amount_cents: line.amount_cents,
        currency: &settings.currency,
        card_token: token,
        description: &description,
    };

    match state.stripe.charge(api_key, &request).await {
        Ok(charge) => {
            state.db.payments().mark_success(&line.id, &charge.id).await?;
            info!(
                line_id = %line.id,
                charge_id = %charge.id,
                "Card payment settled"
            );
            Ok(())
        }
        Err(StripeError::CardDeclined { message }) => {
            // Record the token and the decline reason on the failed line
            let reference = format!("{} reason for failure {}", token, message);
            state.db.payments().mark_failed(&line.id, &reference).await?;
            warn!(line_id = %line.id, reason = %message, "Card payment declined");
            Ok(())
        }
        Err(other) => {
            warn!(line_id = %line.id, error = %other, "Gateway call failed");
            Err(ApiError::Gateway(other.to_string()))
        }
    }
}
