//! # Payment Repositories
//!
//! Database operations for payment modes and payment lines.
//!
//! ## Payment Line States
//! ```text
//! create() ──► draft ──┬── mark_success(reference) ──► success
//!                      └── mark_failed(reference)  ──► failed
//! ```
//! A line never moves out of success/failed; retries create new lines.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use atlas_core::{PaymentLine, PaymentMode, PaymentState};

const LINE_COLUMNS: &str = r#"
    id, sale_id, mode_id, amount_cents,
    reference, notes, state, created_at
"#;

// =============================================================================
// Payment Modes
// =============================================================================

/// Repository for configured payment modes.
#[derive(Debug, Clone)]
pub struct PaymentModeRepository {
    pool: SqlitePool,
}

impl PaymentModeRepository {
    /// Creates a new PaymentModeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentModeRepository { pool }
    }

    /// Lists all payment modes.
    pub async fn list(&self) -> DbResult<Vec<PaymentMode>> {
        let modes = sqlx::query_as::<_, PaymentMode>(
            r#"
            SELECT id, name, processor, stripe_api_key
            FROM payment_modes
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(modes)
    }

    /// Gets a payment mode by its name, the lookup key the till sends.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<PaymentMode>> {
        let mode = sqlx::query_as::<_, PaymentMode>(
            r#"
            SELECT id, name, processor, stripe_api_key
            FROM payment_modes
            WHERE name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(mode)
    }

    /// Inserts a payment mode (seed/admin use).
    pub async fn insert(&self, mode: &PaymentMode) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_modes (id, name, processor, stripe_api_key)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&mode.id)
        .bind(&mode.name)
        .bind(mode.processor)
        .bind(&mode.stripe_api_key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Payment Lines
// =============================================================================

/// Repository for payment lines.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Creates a draft payment line for a sale.
    ///
    /// The processor runs afterwards and settles the line into
    /// success/failed via the mark_* methods.
    pub async fn create(
        &self,
        sale_id: &str,
        mode_id: &str,
        amount_cents: i64,
    ) -> DbResult<PaymentLine> {
        let line = PaymentLine {
            id: Uuid::new_v4().to_string(),
            sale_id: sale_id.to_string(),
            mode_id: mode_id.to_string(),
            amount_cents,
            reference: None,
            notes: None,
            state: PaymentState::Draft,
            created_at: Utc::now(),
        };

        debug!(sale_id = %sale_id, amount = amount_cents, "Creating payment line");

        sqlx::query(
            r#"
            INSERT INTO payment_lines (
                id, sale_id, mode_id, amount_cents,
                reference, notes, state, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&line.id)
        .bind(&line.sale_id)
        .bind(&line.mode_id)
        .bind(line.amount_cents)
        .bind(&line.reference)
        .bind(&line.notes)
        .bind(line.state)
        .bind(line.created_at)
        .execute(&self.pool)
        .await?;

        Ok(line)
    }

    /// Marks a draft line successful, recording the processor reference.
    pub async fn mark_success(&self, line_id: &str, reference: &str) -> DbResult<()> {
        self.settle(line_id, PaymentState::Success, reference).await
    }

    /// Marks a draft line failed, recording the decline reason.
    pub async fn mark_failed(&self, line_id: &str, reference: &str) -> DbResult<()> {
        self.settle(line_id, PaymentState::Failed, reference).await
    }

    async fn settle(&self, line_id: &str, state: PaymentState, reference: &str) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE payment_lines SET state = ?2, reference = ?3
            WHERE id = ?1 AND state = 'draft'
            "#,
        )
        .bind(line_id)
        .bind(state)
        .bind(reference)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payment line (draft)", line_id));
        }

        debug!(line_id = %line_id, state = ?state, "Payment line settled");
        Ok(())
    }

    /// Gets all payment lines for a sale.
    pub async fn list_for_sale(&self, sale_id: &str) -> DbResult<Vec<PaymentLine>> {
        let lines = sqlx::query_as::<_, PaymentLine>(&format!(
            r#"
            SELECT {LINE_COLUMNS}
            FROM payment_lines
            WHERE sale_id = ?1
            ORDER BY created_at
            "#
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Gets the total successfully paid for a sale.
    pub async fn total_paid(&self, sale_id: &str) -> DbResult<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(amount_cents)
            FROM payment_lines
            WHERE sale_id = ?1 AND state = 'success'
            "#,
        )
        .bind(sale_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or(0))
    }
}
