//! # Category Repository
//!
//! Database operations for product categories. The POS only ever sees
//! active categories; inactive ones hide their products too.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use atlas_core::Category;

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists the categories visible on the POS.
    pub async fn list_active(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, is_active
            FROM categories
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = categories.len(), "Listed active categories");
        Ok(categories)
    }

    /// Gets an active category by id, or None.
    ///
    /// Used to decide whether a `?category=` filter is honored; an
    /// unknown or inactive id falls back to the unfiltered listing.
    pub async fn get_active(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, is_active
            FROM categories
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a category (seed/admin use).
    pub async fn insert(&self, category: &Category) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, is_active)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(category.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
