//! Catalog records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, ProductId};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category_id: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub price: Price,
    pub stock: i64,
    pub description: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutritional_info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Product {
    /// Whether the product is listed and has stock left.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.is_active && self.stock > 0
    }
}
