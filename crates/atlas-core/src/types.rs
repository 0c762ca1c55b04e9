//! # Domain Types
//!
//! Core domain types used throughout Atlas POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │  PaymentLine    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  receipt_number │   │  sale_id (FK)   │       │
//! │  │  price_cents    │   │  status/totals  │   │  state/amount   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Category, Party, SaleLine, PaymentMode, Settings, User                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists (sku, receipt_number, login, mode name)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 825 bps = 8.25% (e.g., Texas sales tax)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category shown on the POS.
///
/// Only active categories (and their products) are listed to cashiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Whether the category is visible on the POS (soft delete).
    pub is_active: bool,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Category this product belongs to.
    pub category_id: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Tax rate in basis points (825 = 8.25%).
    pub tax_rate_bps: u32,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the tax rate.
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }
}

// =============================================================================
// Party
// =============================================================================

/// A customer attached to sales.
///
/// The configured guest party stands in for anonymous walk-in customers;
/// a named party is attached when the cashier identifies the customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Party {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a POS sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Sale is in progress (lines being added, payments pending).
    Draft,
    /// Sale has been fully paid.
    Completed,
    /// Sale was abandoned before payment.
    Voided,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Draft
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A draft sale captured at the point of sale.
///
/// Carries running totals that are recomputed whenever lines change, and
/// caches the rendered receipt once one has been produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub receipt_number: String,
    pub status: SaleStatus,
    /// The customer; defaults to the configured guest party.
    pub party_id: String,
    pub untaxed_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    /// The cashier (user) who opened the sale.
    pub created_by: String,
    /// Rendered receipt, cached on first render.
    #[serde(skip)]
    pub receipt_cache: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Sale {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Whether the sale can still be mutated.
    #[inline]
    pub fn is_draft(&self) -> bool {
        self.status == SaleStatus::Draft
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// A line item on a sale.
///
/// Uses the snapshot pattern to freeze product data at time of sale:
/// the sale history stays correct even if the product changes later.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// SKU at time of sale (frozen).
    pub sku_snapshot: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Tax rate at time of sale (frozen).
    pub tax_rate_bps: u32,
    /// Quantity sold. Adding the same product again accumulates here.
    pub quantity: i64,
    /// Line total before tax (unit_price × quantity).
    pub subtotal_cents: i64,
    /// Tax for this line.
    pub tax_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Payment Mode
// =============================================================================

/// The processor kind behind a payment mode.
///
/// Dispatch to the processor implementation is a match on this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentProcessor {
    /// Physical cash payment, settled on the spot.
    Cash,
    /// Card payment charged through the Stripe gateway.
    Stripe,
}

/// A configured way for the customer to pay.
///
/// Payment modes are looked up by name at payment time; the processor
/// kind selects the implementation, and stripe modes carry their own
/// gateway credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PaymentMode {
    pub id: String,
    /// Lookup key ("cash", "visa", ...). Unique.
    pub name: String,
    pub processor: PaymentProcessor,
    /// Gateway secret key. Required when processor is stripe.
    #[serde(skip)]
    pub stripe_api_key: Option<String>,
}

// =============================================================================
// Payment Line
// =============================================================================

/// The state of one payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    /// Created, processor not yet run.
    Draft,
    /// Processor confirmed the payment.
    Success,
    /// Processor declined the payment.
    Failed,
}

impl Default for PaymentState {
    fn default() -> Self {
        PaymentState::Draft
    }
}

/// One payment attempt against a sale.
///
/// A sale can have multiple payment lines (split tender, retried cards).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PaymentLine {
    pub id: String,
    pub sale_id: String,
    pub mode_id: String,
    pub amount_cents: i64,
    /// Processor reference: charge id, decline reason, "paid by cash".
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub state: PaymentState,
    pub created_at: DateTime<Utc>,
}

impl PaymentLine {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Store-level configuration singleton (single row, id = 1).
///
/// Replaces per-request host configuration: the guest party used for
/// anonymous sales, receipt numbering, and receipt decoration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Settings {
    pub id: i64,
    pub store_name: String,
    /// ISO currency code in lowercase, as the card gateway expects it.
    pub currency: String,
    /// Default customer for walk-in sales.
    pub guest_party_id: String,
    /// Receipt numbers are `<prefix><zero-padded counter>`.
    pub receipt_prefix: String,
    pub next_receipt_number: i64,
    pub receipt_header: Option<String>,
    pub receipt_footer: Option<String>,
}

// =============================================================================
// User
// =============================================================================

/// A cashier account backing HTTP Basic authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub login: String,
    /// Argon2 hash; the cleartext password is never stored.
    #[serde(skip)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
