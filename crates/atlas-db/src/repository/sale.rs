//! # Sale Repository
//!
//! Database operations for sales, their lines, and the receipt cache.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE DRAFT                                                       │
//! │     └── create() → Sale { status: Draft }                              │
//! │                                                                         │
//! │  2. MUTATE LINES                                                       │
//! │     └── insert_line() / update_line_quantity() / delete_line()         │
//! │     └── update_totals() → persist recomputed subtotal, tax, total      │
//! │                                                                         │
//! │  3. FINALIZE (when payments cover the total)                           │
//! │     └── finalize() → Sale { status: Completed }                        │
//! │                                                                         │
//! │  3'. VOID (abandoned cart)                                             │
//! │     └── void() → Sale { status: Voided }                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use atlas_core::{Sale, SaleLine, SaleTotals};

const SALE_COLUMNS: &str = r#"
    id, receipt_number, status, party_id,
    untaxed_cents, tax_cents, total_cents,
    created_by, receipt_cache,
    created_at, updated_at, completed_at
"#;

const LINE_COLUMNS: &str = r#"
    id, sale_id, product_id,
    sku_snapshot, name_snapshot,
    unit_price_cents, tax_rate_bps, quantity,
    subtotal_cents, tax_cents, created_at
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Sales
    // -------------------------------------------------------------------------

    /// Inserts a new draft sale.
    pub async fn create(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, receipt_number = %sale.receipt_number, "Creating sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, receipt_number, status, party_id,
                untaxed_cents, tax_cents, total_cents,
                created_by, receipt_cache,
                created_at, updated_at, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.receipt_number)
        .bind(sale.status)
        .bind(&sale.party_id)
        .bind(sale.untaxed_cents)
        .bind(sale.tax_cents)
        .bind(sale.total_cents)
        .bind(&sale.created_by)
        .bind(&sale.receipt_cache)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .bind(sale.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales
            WHERE id = ?1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists the most recent sales opened by one cashier.
    ///
    /// The POS home screen shows the cashier their own recent sales, not
    /// the whole store's.
    pub async fn list_recent_by_user(&self, user_id: &str, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales
            WHERE created_by = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Updates sale totals.
    ///
    /// ## When To Call
    /// After adding/removing lines. Only draft sales can change.
    pub async fn update_totals(&self, sale_id: &str, totals: &SaleTotals) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                untaxed_cents = ?2,
                tax_cents = ?3,
                total_cents = ?4,
                updated_at = ?5
            WHERE id = ?1 AND status = 'draft'
            "#,
        )
        .bind(sale_id)
        .bind(totals.untaxed_cents)
        .bind(totals.tax_cents)
        .bind(totals.total_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale (draft)", sale_id));
        }

        Ok(())
    }

    /// Changes the customer on a draft sale.
    pub async fn set_party(&self, sale_id: &str, party_id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE sales SET party_id = ?2, updated_at = ?3
            WHERE id = ?1 AND status = 'draft'
            "#,
        )
        .bind(sale_id)
        .bind(party_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale (draft)", sale_id));
        }

        Ok(())
    }

    /// Finalizes a sale once its payments cover the total.
    pub async fn finalize(&self, sale_id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                status = 'completed',
                completed_at = ?2,
                updated_at = ?2
            WHERE id = ?1 AND status = 'draft'
            "#,
        )
        .bind(sale_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale (draft)", sale_id));
        }

        debug!(id = %sale_id, "Sale finalized");
        Ok(())
    }

    /// Voids a draft sale (abandoned cart).
    pub async fn void(&self, sale_id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE sales SET status = 'voided', updated_at = ?2
            WHERE id = ?1 AND status = 'draft'
            "#,
        )
        .bind(sale_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale (draft)", sale_id));
        }

        debug!(id = %sale_id, "Sale voided");
        Ok(())
    }

    /// Stores the rendered receipt blob on the sale.
    ///
    /// The cache is write-once by convention: callers only render when no
    /// cached receipt exists yet.
    pub async fn cache_receipt(&self, sale_id: &str, receipt: &[u8]) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE sales SET receipt_cache = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(sale_id)
        .bind(receipt)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", sale_id));
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Sale Lines
    // -------------------------------------------------------------------------

    /// Gets all lines for a sale, in the order they were added.
    pub async fn get_lines(&self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(&format!(
            r#"
            SELECT {LINE_COLUMNS}
            FROM sale_lines
            WHERE sale_id = ?1
            ORDER BY created_at
            "#
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Finds the line for a product on a sale, if one exists.
    ///
    /// At most one line exists per (sale, product); adding the same
    /// product again goes through this lookup and accumulates quantity.
    pub async fn find_line_by_product(
        &self,
        sale_id: &str,
        product_id: &str,
    ) -> DbResult<Option<SaleLine>> {
        let line = sqlx::query_as::<_, SaleLine>(&format!(
            r#"
            SELECT {LINE_COLUMNS}
            FROM sale_lines
            WHERE sale_id = ?1 AND product_id = ?2
            "#
        ))
        .bind(sale_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(line)
    }

    /// Inserts a line.
    ///
    /// ## Snapshot Pattern
    /// Product details (sku, name, price, tax rate) are copied onto the
    /// line. This preserves the sale history even if the product changes
    /// later.
    pub async fn insert_line(&self, line: &SaleLine) -> DbResult<()> {
        debug!(sale_id = %line.sale_id, product_id = %line.product_id, "Adding sale line");

        sqlx::query(
            r#"
            INSERT INTO sale_lines (
                id, sale_id, product_id,
                sku_snapshot, name_snapshot,
                unit_price_cents, tax_rate_bps, quantity,
                subtotal_cents, tax_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&line.id)
        .bind(&line.sale_id)
        .bind(&line.product_id)
        .bind(&line.sku_snapshot)
        .bind(&line.name_snapshot)
        .bind(line.unit_price_cents)
        .bind(line.tax_rate_bps)
        .bind(line.quantity)
        .bind(line.subtotal_cents)
        .bind(line.tax_cents)
        .bind(line.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a line's quantity and recomputed amounts.
    pub async fn update_line_quantity(
        &self,
        line_id: &str,
        quantity: i64,
        subtotal_cents: i64,
        tax_cents: i64,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE sale_lines SET
                quantity = ?2,
                subtotal_cents = ?3,
                tax_cents = ?4
            WHERE id = ?1
            "#,
        )
        .bind(line_id)
        .bind(quantity)
        .bind(subtotal_cents)
        .bind(tax_cents)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale line", line_id));
        }

        Ok(())
    }

    /// Deletes one identified line from a sale.
    pub async fn delete_line(&self, sale_id: &str, line_id: &str) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM sale_lines
            WHERE id = ?1 AND sale_id = ?2
            "#,
        )
        .bind(line_id)
        .bind(sale_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale line", line_id));
        }

        debug!(sale_id = %sale_id, line_id = %line_id, "Deleted sale line");
        Ok(())
    }
}

/// Generates a new sale line ID.
pub fn generate_line_id() -> String {
    Uuid::new_v4().to_string()
}
