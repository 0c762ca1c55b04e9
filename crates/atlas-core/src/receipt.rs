//! # Receipt Rendering
//!
//! Pure plain-text receipt rendering for POS sales.
//!
//! The rendered receipt is cached on the sale as an opaque blob and
//! shipped to clients base64-encoded or attached to an email; this module
//! only produces the text. 40 columns, the usual thermal printer width.

use std::fmt;

use crate::money::Money;
use crate::types::{Sale, SaleLine};

/// Receipt line width in characters.
const WIDTH: usize = 40;

// =============================================================================
// Receipt Model
// =============================================================================

/// A payment as it appears on the receipt.
///
/// The caller resolves mode ids to display labels and passes only the
/// payments that should be printed (successful ones).
#[derive(Debug, Clone)]
pub struct ReceiptPayment {
    /// Display label, e.g. "cash" or "visa".
    pub label: String,
    pub amount_cents: i64,
}

/// Everything needed to render one receipt.
///
/// Borrowed views over persisted entities; rendering never mutates.
#[derive(Debug)]
pub struct Receipt<'a> {
    pub store_name: &'a str,
    pub header: Option<&'a str>,
    pub footer: Option<&'a str>,
    pub sale: &'a Sale,
    /// Customer display name (guest party name for walk-ins).
    pub party_name: &'a str,
    pub lines: &'a [SaleLine],
    pub payments: &'a [ReceiptPayment],
}

impl Receipt<'_> {
    /// Renders the receipt to bytes for caching on the sale.
    pub fn render(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Writes `label` left-aligned and `amount` right-aligned on one line.
fn amount_row(f: &mut fmt::Formatter<'_>, label: &str, amount: Money) -> fmt::Result {
    let amount = amount.to_string();
    let pad = WIDTH.saturating_sub(label.len() + amount.len());
    writeln!(f, "{}{}{}", label, " ".repeat(pad), amount)
}

fn rule(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{}", "-".repeat(WIDTH))
}

impl fmt::Display for Receipt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:^width$}", self.store_name, width = WIDTH)?;

        if let Some(header) = self.header {
            for line in header.lines() {
                writeln!(f, "{:^width$}", line, width = WIDTH)?;
            }
        }

        rule(f)?;
        writeln!(f, "Receipt: {}", self.sale.receipt_number)?;
        writeln!(
            f,
            "Date: {}   Time: {}",
            self.sale.created_at.format("%Y-%m-%d"),
            self.sale.created_at.format("%H:%M")
        )?;
        writeln!(f, "Customer: {}", self.party_name)?;
        rule(f)?;

        for line in self.lines {
            writeln!(f, "{}", line.name_snapshot)?;
            amount_row(
                f,
                &format!("  {} x {}", line.quantity, line.unit_price()),
                line.subtotal(),
            )?;
        }

        rule(f)?;
        amount_row(f, "Subtotal", Money::from_cents(self.sale.untaxed_cents))?;
        amount_row(f, "Tax", Money::from_cents(self.sale.tax_cents))?;
        amount_row(f, "TOTAL", Money::from_cents(self.sale.total_cents))?;

        if !self.payments.is_empty() {
            rule(f)?;
            for payment in self.payments {
                amount_row(
                    f,
                    &format!("Paid - {}", payment.label),
                    Money::from_cents(payment.amount_cents),
                )?;
            }
        }

        if let Some(footer) = self.footer {
            rule(f)?;
            for line in footer.lines() {
                writeln!(f, "{:^width$}", line, width = WIDTH)?;
            }
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
