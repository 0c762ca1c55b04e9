//! # Product Repository
//!
//! Database operations for products.
//!
//! ## POS Listing Rules
//! A product appears on the POS when it is active AND its category is
//! active. A category filter narrows the listing to that category only.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use atlas_core::Product;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// // All POS-visible products
/// let all = repo.list_pos(None).await?;
///
/// // Only one category
/// let drinks = repo.list_pos(Some("category-uuid")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str = r#"
    p.id, p.sku, p.name, p.category_id,
    p.price_cents, p.tax_rate_bps, p.is_active,
    p.created_at, p.updated_at
"#;

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products visible on the POS, optionally limited to one
    /// category.
    ///
    /// The caller is responsible for having validated the category
    /// against the active set; an id passed here is trusted.
    pub async fn list_pos(&self, category_id: Option<&str>) -> DbResult<Vec<Product>> {
        let products = match category_id {
            Some(category_id) => {
                sqlx::query_as::<_, Product>(&format!(
                    r#"
                    SELECT {PRODUCT_COLUMNS}
                    FROM products p
                    INNER JOIN categories c ON c.id = p.category_id
                    WHERE p.is_active = 1 AND c.is_active = 1 AND p.category_id = ?1
                    ORDER BY p.name
                    "#
                ))
                .bind(category_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Product>(&format!(
                    r#"
                    SELECT {PRODUCT_COLUMNS}
                    FROM products p
                    INNER JOIN categories c ON c.id = p.category_id
                    WHERE p.is_active = 1 AND c.is_active = 1
                    ORDER BY p.name
                    "#
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        debug!(
            count = products.len(),
            category = category_id.unwrap_or("<all>"),
            "Listed POS products"
        );
        Ok(products)
    }

    /// Gets an active product by id, or None.
    pub async fn get_active(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p
            WHERE p.id = ?1 AND p.is_active = 1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a product (seed/admin use).
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, category_id,
                price_cents, tax_rate_bps, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(product.price_cents)
        .bind(product.tax_rate_bps)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
