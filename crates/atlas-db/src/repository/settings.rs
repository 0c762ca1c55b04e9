//! # Settings Repository
//!
//! Access to the store settings singleton (single row, id = 1), including
//! receipt number allocation.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use atlas_core::Settings;

/// Repository for the settings singleton.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Gets the settings row.
    ///
    /// A store without settings is a deployment error: every sale needs
    /// the guest party and receipt numbering, so this is NotFound rather
    /// than an Option.
    pub async fn get(&self) -> DbResult<Settings> {
        let settings = sqlx::query_as::<_, Settings>(
            r#"
            SELECT id, store_name, currency, guest_party_id,
                   receipt_prefix, next_receipt_number,
                   receipt_header, receipt_footer
            FROM settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Settings", "1"))?;

        Ok(settings)
    }

    /// Allocates the next receipt number.
    ///
    /// The counter increment and read happen in one UPDATE ... RETURNING
    /// statement, so concurrent sales never share a number.
    pub async fn allocate_receipt_number(&self) -> DbResult<String> {
        let (prefix, number): (String, i64) = sqlx::query_as(
            r#"
            UPDATE settings
            SET next_receipt_number = next_receipt_number + 1
            WHERE id = 1
            RETURNING receipt_prefix, next_receipt_number - 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Settings", "1"))?;

        let receipt_number = format!("{}{:06}", prefix, number);
        debug!(receipt_number = %receipt_number, "Allocated receipt number");
        Ok(receipt_number)
    }

    /// Writes the settings row (seed/admin use).
    ///
    /// Upserts so re-seeding a database is idempotent.
    pub async fn upsert(&self, settings: &Settings) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (
                id, store_name, currency, guest_party_id,
                receipt_prefix, next_receipt_number,
                receipt_header, receipt_footer
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (id) DO UPDATE SET
                store_name = excluded.store_name,
                currency = excluded.currency,
                guest_party_id = excluded.guest_party_id,
                receipt_prefix = excluded.receipt_prefix,
                next_receipt_number = excluded.next_receipt_number,
                receipt_header = excluded.receipt_header,
                receipt_footer = excluded.receipt_footer
            "#,
        )
        .bind(&settings.store_name)
        .bind(&settings.currency)
        .bind(&settings.guest_party_id)
        .bind(&settings.receipt_prefix)
        .bind(settings.next_receipt_number)
        .bind(&settings.receipt_header)
        .bind(&settings.receipt_footer)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
