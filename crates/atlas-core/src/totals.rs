//! # Totals Module
//!
//! Pure computation of line amounts and sale totals.
//!
//! ## When This Runs
//! ```text
//! add line / change quantity / delete line
//!      │
//!      ▼
//! line_amounts(unit_price, tax_rate, quantity)   ← per-line math
//!      │
//!      ▼
//! sale_totals(&lines)                            ← whole-sale rollup
//!      │
//!      ▼
//! persisted on the sale row (untaxed, tax, total)
//! ```
//!
//! The invariant `total == untaxed + tax` holds by construction: the
//! rollup derives the grand total from the other two sums.

use crate::money::Money;
use crate::types::{SaleLine, TaxRate};

// =============================================================================
// Line Amounts
// =============================================================================

/// The computed amounts for a single sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmounts {
    /// unit_price × quantity, before tax.
    pub subtotal_cents: i64,
    /// Tax on the subtotal, rounded half up.
    pub tax_cents: i64,
}

/// Computes the amounts for one line.
///
/// Tax is computed on the line subtotal (not per unit) so that the
/// rounding error is bounded per line, not per item.
///
/// ## Example
/// ```rust
/// use atlas_core::totals::line_amounts;
///
/// // 3 × $2.99 at 8.25% tax
/// let amounts = line_amounts(299, 825, 3);
/// assert_eq!(amounts.subtotal_cents, 897);
/// assert_eq!(amounts.tax_cents, 74); // $8.97 × 8.25% = $0.740025 → $0.74
/// ```
pub fn line_amounts(unit_price_cents: i64, tax_rate_bps: u32, quantity: i64) -> LineAmounts {
    let subtotal = Money::from_cents(unit_price_cents).multiply_quantity(quantity);
    let tax = subtotal.calculate_tax(TaxRate::from_bps(tax_rate_bps));

    LineAmounts {
        subtotal_cents: subtotal.cents(),
        tax_cents: tax.cents(),
    }
}

// =============================================================================
// Sale Totals
// =============================================================================

/// The rolled-up totals for a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaleTotals {
    pub untaxed_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

/// Rolls up sale totals from its lines.
///
/// An empty sale has all-zero totals.
pub fn sale_totals(lines: &[SaleLine]) -> SaleTotals {
    let mut untaxed = Money::zero();
    let mut tax = Money::zero();

    for line in lines {
        untaxed += Money::from_cents(line.subtotal_cents);
        tax += Money::from_cents(line.tax_cents);
    }

    SaleTotals {
        untaxed_cents: untaxed.cents(),
        tax_cents: tax.cents(),
        total_cents: (untaxed + tax).cents(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
