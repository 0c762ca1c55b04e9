//! Sale lifecycle: open, list, void, mutate lines, attach customers.
//!
//! ## Add-or-Update Lines
//! A sale has at most one line per product. Adding a product that is
//! already on the sale accumulates quantity on the existing line; the
//! line amounts and the sale totals are recomputed either way.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use atlas_core::validation::{validate_email, validate_party_name, validate_quantity};
use atlas_core::{
    line_amounts, sale_totals, CoreError, Sale, SaleLine, SaleStatus, MAX_SALE_LINES,
};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::routes::parties::PartyDto;
use crate::routes::ListResponse;
use crate::AppState;

/// How many of the cashier's sales the home screen shows.
const RECENT_SALES_LIMIT: u32 = 20;

// =============================================================================
// DTOs
// =============================================================================

/// A sale as the till sees it: identity, status, customer, totals.
#[derive(Debug, Serialize)]
pub struct SaleDto {
    pub id: String,
    pub receipt_number: String,
    pub status: SaleStatus,
    pub party: PartyDto,
    pub untaxed_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

/// Response for add_line: the updated sale plus the touched line.
#[derive(Debug, Serialize)]
pub struct AddLineResponse {
    #[serde(flatten)]
    pub sale: SaleDto,
    pub line_id: String,
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Fetches a sale or 404s.
pub async fn get_sale(state: &AppState, sale_id: &str) -> Result<Sale, ApiError> {
    state
        .db
        .sales()
        .get_by_id(sale_id)
        .await?
        .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()).into())
}

/// Fetches a sale and insists it is still mutable.
pub async fn get_draft_sale(state: &AppState, sale_id: &str) -> Result<Sale, ApiError> {
    let sale = get_sale(state, sale_id).await?;

    if !sale.is_draft() {
        let status = match sale.status {
            SaleStatus::Completed => "completed",
            SaleStatus::Voided => "voided",
            SaleStatus::Draft => "draft",
        };
        return Err(CoreError::InvalidSaleStatus {
            sale_id: sale.id,
            current_status: status.to_string(),
        }
        .into());
    }

    Ok(sale)
}

/// Builds the SaleDto the till renders, resolving the party.
pub async fn sale_dto(state: &AppState, sale: Sale) -> Result<SaleDto, ApiError> {
    let party = state
        .db
        .parties()
        .get_by_id(&sale.party_id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("sale {} references missing party", sale.id)))?;

    Ok(SaleDto {
        id: sale.id,
        receipt_number: sale.receipt_number,
        status: sale.status,
        party: PartyDto::from(party),
        untaxed_cents: sale.untaxed_cents,
        tax_cents: sale.tax_cents,
        total_cents: sale.total_cents,
    })
}

/// Recomputes and persists sale totals from its current lines, then
/// returns the fresh sale row.
async fn recompute_totals(state: &AppState, sale_id: &str) -> Result<Sale, ApiError> {
    let lines = state.db.sales().get_lines(sale_id).await?;
    let totals = sale_totals(&lines);
    state.db.sales().update_totals(sale_id, &totals).await?;
    get_sale(state, sale_id).await
}

// =============================================================================
// Open / List / Void
// =============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct CreateSaleRequest {
    /// Existing customer; the guest party is used when absent.
    pub party_id: Option<String>,
}

/// `POST /pos/sales`
///
/// Opens a draft sale for the authenticated cashier, allocating the next
/// receipt number. The body is optional: walk-in sales need none.
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Option<Json<CreateSaleRequest>>,
) -> Result<(StatusCode, Json<SaleDto>), ApiError> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let settings = state.db.settings().get().await?;

    // Explicit customer must exist; otherwise fall back to the guest
    let party_id = match request.party_id {
        Some(party_id) => state
            .db
            .parties()
            .get_by_id(&party_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Party not found: {}", party_id)))?
            .id,
        None => settings.guest_party_id,
    };

    let receipt_number = state.db.settings().allocate_receipt_number().await?;
    let now = Utc::now();

    let sale = Sale {
        id: Uuid::new_v4().to_string(),
        receipt_number,
        status: SaleStatus::Draft,
        party_id,
        untaxed_cents: 0,
        tax_cents: 0,
        total_cents: 0,
        created_by: user.id,
        receipt_cache: None,
        created_at: now,
        updated_at: now,
        completed_at: None,
    };

    state.db.sales().create(&sale).await?;
    info!(id = %sale.id, receipt_number = %sale.receipt_number, "Sale opened");

    let dto = sale_dto(&state, sale).await?;
    Ok((StatusCode::CREATED, Json(dto)))
}

/// `GET /pos/sales`
///
/// The authenticated cashier's most recent sales.
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ListResponse<SaleDto>>, ApiError> {
    let sales = state
        .db
        .sales()
        .list_recent_by_user(&user.id, RECENT_SALES_LIMIT)
        .await?;

    let mut data = Vec::with_capacity(sales.len());
    for sale in sales {
        data.push(sale_dto(&state, sale).await?);
    }

    Ok(Json(ListResponse { data }))
}

/// `DELETE /pos/sales/:id`
///
/// Voids an abandoned draft sale.
pub async fn void(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(sale_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let sale = get_draft_sale(&state, &sale_id).await?;
    state.db.sales().void(&sale.id).await?;

    info!(id = %sale.id, "Sale voided");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Lines
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AddLineRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// `POST /pos/sales/:id/lines`
///
/// Adds a product to the sale, or accumulates quantity when the product
/// is already on it. Responds with the recomputed sale plus the id of
/// the touched line.
pub async fn add_line(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(sale_id): Path<String>,
    Json(request): Json<AddLineRequest>,
) -> Result<Json<AddLineResponse>, ApiError> {
    let sale = get_draft_sale(&state, &sale_id).await?;
    validate_quantity(request.quantity)?;

    let product = state
        .db
        .products()
        .get_active(&request.product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(request.product_id.clone()))?;

    let existing = state
        .db
        .sales()
        .find_line_by_product(&sale.id, &product.id)
        .await?;

    let line_id = match existing {
        Some(line) => {
            // Accumulate onto the existing line; the cap applies to the
            // accumulated quantity, not just this increment
            let quantity = line.quantity + request.quantity;
            validate_quantity(quantity)?;

            let amounts = line_amounts(line.unit_price_cents, line.tax_rate_bps, quantity);
            state
                .db
                .sales()
                .update_line_quantity(&line.id, quantity, amounts.subtotal_cents, amounts.tax_cents)
                .await?;
            line.id
        }
        None => {
            let lines = state.db.sales().get_lines(&sale.id).await?;
            if lines.len() >= MAX_SALE_LINES {
                return Err(CoreError::SaleTooLarge {
                    max: MAX_SALE_LINES,
                }
                .into());
            }

            let amounts = line_amounts(product.price_cents, product.tax_rate_bps, request.quantity);
            let line = SaleLine {
                id: atlas_db::repository::sale::generate_line_id(),
                sale_id: sale.id.clone(),
                product_id: product.id.clone(),
                sku_snapshot: product.sku.clone(),
                name_snapshot: product.name.clone(),
                unit_price_cents: product.price_cents,
                tax_rate_bps: product.tax_rate_bps,
                quantity: request.quantity,
                subtotal_cents: amounts.subtotal_cents,
                tax_cents: amounts.tax_cents,
                created_at: Utc::now(),
            };
            state.db.sales().insert_line(&line).await?;
            line.id
        }
    };

    let sale = recompute_totals(&state, &sale_id).await?;
    let dto = sale_dto(&state, sale).await?;

    Ok(Json(AddLineResponse { sale: dto, line_id }))
}

/// `DELETE /pos/sales/:id/lines/:line_id`
///
/// Removes one identified line and recomputes totals.
pub async fn delete_line(
    _user: AuthUser,
    State(state): State<AppState>,
    Path((sale_id, line_id)): Path<(String, String)>,
) -> Result<Json<SaleDto>, ApiError> {
    let sale = get_draft_sale(&state, &sale_id).await?;
    state.db.sales().delete_line(&sale.id, &line_id).await?;

    let sale = recompute_totals(&state, &sale_id).await?;
    let dto = sale_dto(&state, sale).await?;
    Ok(Json(dto))
}

// =============================================================================
// Customer Attachment
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SetPartyRequest {
    /// Existing customer to attach.
    pub party_id: Option<String>,
    /// Or details to create one inline.
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// `POST /pos/sales/:id/party`
///
/// Attaches an existing customer by id, or creates one inline from
/// name/phone/email and attaches it.
pub async fn set_party(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(sale_id): Path<String>,
    Json(request): Json<SetPartyRequest>,
) -> Result<Json<SaleDto>, ApiError> {
    let sale = get_draft_sale(&state, &sale_id).await?;

    let party = match request.party_id {
        Some(party_id) => state
            .db
            .parties()
            .get_by_id(&party_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Party not found: {}", party_id)))?,
        None => {
            let name = request
                .name
                .ok_or_else(|| ApiError::BadRequest("party_id or name is required".into()))?;
            validate_party_name(&name)?;
            if let Some(email) = request.email.as_deref() {
                validate_email(email)?;
            }

            state
                .db
                .parties()
                .create(
                    name.trim(),
                    request.phone.as_deref(),
                    request.email.as_deref(),
                )
                .await?
        }
    };

    state.db.sales().set_party(&sale.id, &party.id).await?;
    info!(sale_id = %sale.id, party_id = %party.id, "Customer attached to sale");

    let sale = get_sale(&state, &sale_id).await?;
    let dto = sale_dto(&state, sale).await?;
    Ok(Json(dto))
}

/// `DELETE /pos/sales/:id/party`
///
/// Detaches the customer, falling back to the guest party.
pub async fn reset_party(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(sale_id): Path<String>,
) -> Result<Json<SaleDto>, ApiError> {
    let sale = get_draft_sale(&state, &sale_id).await?;
    let settings = state.db.settings().get().await?;

    state
        .db
        .sales()
        .set_party(&sale.id, &settings.guest_party_id)
        .await?;

    let sale = get_sale(&state, &sale_id).await?;
    let dto = sale_dto(&state, sale).await?;
    Ok(Json(dto))
}
