//! Row models for the `products` table.

use chrono::{DateTime, Utc};
use givd_core::constants::{DEFAULT_PRODUCT_CATEGORY, DEFAULT_PRODUCT_UNIT};
use givd_core::products::{NewProduct, Product, ProductUpdate};
use serde::{Deserialize, Serialize};

/// Row as returned by the table API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub quantity: f64,
    pub min_threshold: f64,
    #[serde(default)]
    pub unit: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row for inserting a product; id and created_at are assigned by the backend
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewProductRow {
    pub user_id: String,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub min_threshold: f64,
    pub unit: String,
}

/// Columns written by an update
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProductPatch {
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub min_threshold: f64,
    pub unit: String,
}

// Conversion to domain models
impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            category: row
                .category
                .unwrap_or_else(|| DEFAULT_PRODUCT_CATEGORY.to_string()),
            quantity: row.quantity,
            min_threshold: row.min_threshold,
            unit: row.unit.unwrap_or_else(|| DEFAULT_PRODUCT_UNIT.to_string()),
            created_at: row.created_at,
        }
    }
}

impl NewProductRow {
    pub fn new(owner: &str, domain: NewProduct) -> Self {
        Self {
            user_id: owner.to_string(),
            name: domain.name,
            category: domain
                .category
                .unwrap_or_else(|| DEFAULT_PRODUCT_CATEGORY.to_string()),
            quantity: domain.quantity,
            min_threshold: domain.min_threshold,
            unit: domain
                .unit
                .unwrap_or_else(|| DEFAULT_PRODUCT_UNIT.to_string()),
        }
    }
}

impl From<ProductUpdate> for ProductPatch {
    fn from(domain: ProductUpdate) -> Self {
        Self {
            name: domain.name,
            category: domain.category,
            quantity: domain.quantity,
            min_threshold: domain.min_threshold,
            unit: domain.unit,
        }
    }
}
