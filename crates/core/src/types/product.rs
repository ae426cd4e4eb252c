//! Catalog entities.
//!
//! Products and categories are read-only inputs to the storefront: the
//! catalog component owns them, the bag pricing engine only resolves them
//! through the [`ProductLookup`](crate::bag::ProductLookup) seam.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::money::Price;

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Stock-keeping unit, when the merchandising feed provides one.
    #[serde(default)]
    pub sku: Option<String>,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Whether this product is sold in size variants (S/M/L/...).
    #[serde(default)]
    pub has_sizes: bool,
    #[serde(default)]
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryId>,
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// Programmatic name used in URLs and filters (e.g., `bags`).
    pub name: String,
    /// Display name shown to shoppers (e.g., `Bags`).
    pub friendly_name: String,
}

impl Category {
    /// Display name, falling back to the programmatic name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.friendly_name.is_empty() {
            &self.name
        } else {
            &self.friendly_name
        }
    }
}
