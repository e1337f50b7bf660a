//! Inventory Models
//! Mission: Define catalog item and request/response data structures

use serde::{Deserialize, Serialize};

/// A catalog item with price and stock quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sweet {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: i64,
}

/// Creation request body. Quantity defaults to zero when unspecified.
#[derive(Debug, Deserialize)]
pub struct SweetCreate {
    pub name: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub quantity: i64,
}

/// Partial update - only present fields are applied.
#[derive(Debug, Default, Deserialize)]
pub struct SweetUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
}

/// Search filters, combined conjunctively. Name and category are
/// case-insensitive substring matches; price bounds are inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct SearchFilter {
    pub name: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// Pagination window for listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_list_limit")]
    pub limit: i64,
}

fn default_list_limit() -> i64 {
    100
}

/// Stock adjustment body for purchase and restock.
#[derive(Debug, Deserialize)]
pub struct StockAdjustment {
    #[serde(default = "default_adjustment")]
    pub quantity: i64,
}

fn default_adjustment() -> i64 {
    1
}
