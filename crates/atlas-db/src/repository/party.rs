//! # Party Repository
//!
//! Database operations for customers. Parties are created either from an
//! admin flow (seed) or inline at the till when a cashier captures a new
//! customer's name/phone/email.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use atlas_core::Party;

/// Repository for party database operations.
#[derive(Debug, Clone)]
pub struct PartyRepository {
    pool: SqlitePool,
}

impl PartyRepository {
    /// Creates a new PartyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PartyRepository { pool }
    }

    /// Lists all parties, newest first.
    pub async fn list(&self) -> DbResult<Vec<Party>> {
        let parties = sqlx::query_as::<_, Party>(
            r#"
            SELECT id, name, phone, email, created_at
            FROM parties
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(parties)
    }

    /// Gets a party by id, or None.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Party>> {
        let party = sqlx::query_as::<_, Party>(
            r#"
            SELECT id, name, phone, email, created_at
            FROM parties
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(party)
    }

    /// Creates a party from the details captured at the till.
    pub async fn create(
        &self,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> DbResult<Party> {
        let party = Party {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: phone.map(str::to_string),
            email: email.map(str::to_string),
            created_at: Utc::now(),
        };

        debug!(id = %party.id, name = %party.name, "Creating party");

        sqlx::query(
            r#"
            INSERT INTO parties (id, name, phone, email, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&party.id)
        .bind(&party.name)
        .bind(&party.phone)
        .bind(&party.email)
        .bind(party.created_at)
        .execute(&self.pool)
        .await?;

        Ok(party)
    }
}
