//! HTTP client for the Stripe card gateway.
//!
//! This is a minimal charge client, not an SDK: the POS needs exactly one
//! call (create a charge against a card token) and two outcomes it can
//! act on (settled or declined). The base URL is injectable so tests can
//! stand up a local mock gateway.

use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// A charge to submit to the gateway.
#[derive(Debug, Clone)]
pub struct ChargeRequest<'a> {
    /// Amount in the smallest currency unit; the gateway charges cents.
    pub amount_cents: i64,
    /// Lowercase ISO code, e.g. "usd".
    pub currency: &'a str,
    /// One-time card token collected by the till.
    pub card_token: &'a str,
    /// Free-text description shown on the gateway dashboard.
    pub description: &'a str,
}

/// A settled charge as the gateway reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct Charge {
    /// Gateway charge id, stored as the payment line reference.
    pub id: String,
    pub status: String,
}

/// Error body the gateway returns on declines.
#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    error: GatewayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorDetail {
    message: String,
}

/// Errors from gateway calls.
///
/// Only `CardDeclined` is a business outcome (the payment line is marked
/// failed); everything else is infrastructure trouble and surfaces as a
/// gateway error to the till.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    #[error("card declined: {message}")]
    CardDeclined { message: String },

    #[error("gateway error: {0}")]
    Service(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// HTTP client for the card gateway.
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    base_url: String,
}

impl StripeClient {
    /// Create a new gateway client.
    ///
    /// # Arguments
    /// * `base_url` - Gateway base URL (production default:
    ///   "https://api.stripe.com")
    pub fn new(base_url: impl Into<String>) -> Self {
        StripeClient {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Submit a charge.
    ///
    /// # Arguments
    /// * `api_key` - Secret key of the payment mode taking the charge
    /// * `request` - Amount, currency, token, description
    ///
    /// # Returns
    /// The settled charge, or a typed error. HTTP 402 is decoded into
    /// `CardDeclined` with the gateway's message.
    pub async fn charge(
        &self,
        api_key: &str,
        request: &ChargeRequest<'_>,
    ) -> Result<Charge, StripeError> {
        let params = [
            ("amount", request.amount_cents.to_string()),
            ("currency", request.currency.to_string()),
            ("source", request.card_token.to_string()),
            ("description", request.description.to_string()),
        ];

        let response = self
            .client
            .post(format!("{}/v1/charges", self.base_url))
            .bearer_auth(api_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| StripeError::Network(e.to_string()))?;

        if response.status() == StatusCode::PAYMENT_REQUIRED {
            let message = match response.json::<GatewayErrorBody>().await {
                Ok(body) => body.error.message,
                Err(_) => "card declined".to_string(),
            };
            return Err(StripeError::CardDeclined { message });
        }

        if !response.status().is_success() {
            return Err(StripeError::Service(format!("HTTP {}", response.status())));
        }

        response
            .json::<Charge>()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))
    }
}
