//! Product and category listing for the POS.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use atlas_core::{Category, Product};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::routes::ListResponse;
use crate::AppState;

// =============================================================================
// DTOs
// =============================================================================

/// A product as the till sees it.
#[derive(Debug, Serialize)]
pub struct ProductDto {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub category_id: String,
    pub price_cents: i64,
    pub tax_rate_bps: u32,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        ProductDto {
            id: product.id,
            sku: product.sku,
            name: product.name,
            category_id: product.category_id,
            price_cents: product.price_cents,
            tax_rate_bps: product.tax_rate_bps,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryDto {
    pub id: String,
    pub name: String,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        CategoryDto {
            id: category.id,
            name: category.name,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    /// Optional category filter.
    pub category: Option<String>,
}

/// `GET /pos/products?category=<id>`
///
/// Lists POS-visible products. A category filter is honored only when it
/// names an active category; anything else falls back to the full
/// listing.
pub async fn list_products(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ListResponse<ProductDto>>, ApiError> {
    // Validate the filter against the active set before trusting it
    let category_filter = match query.category.as_deref() {
        Some(id) => state.db.categories().get_active(id).await?.map(|c| c.id),
        None => None,
    };

    let products = state
        .db
        .products()
        .list_pos(category_filter.as_deref())
        .await?;

    Ok(Json(ListResponse {
        data: products.into_iter().map(ProductDto::from).collect(),
    }))
}

/// `GET /pos/categories`
pub async fn list_categories(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ListResponse<CategoryDto>>, ApiError> {
    let categories = state.db.categories().list_active().await?;

    Ok(Json(ListResponse {
        data: categories.into_iter().map(CategoryDto::from).collect(),
    }))
}
