//! In-memory product catalog.
//!
//! The catalog is loaded once at startup from a JSON seed file and held in
//! memory for the lifetime of the process. It is the storefront's product
//! source of truth and backs the pricing engine's `ProductLookup` seam.
//!
//! # Seed format
//!
//! ```json
//! {
//!     "categories": [
//!         { "id": 1, "name": "bags", "friendly_name": "Bags" }
//!     ],
//!     "products": [
//!         {
//!             "id": 1,
//!             "sku": "th-0001",
//!             "name": "Harbor Tote",
//!             "description": "...",
//!             "price": "24.99",
//!             "has_sizes": false,
//!             "rating": "4.5",
//!             "image_url": "/static/images/harbor-tote.jpg",
//!             "category": 1
//!         }
//!     ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use thread_harbor_core::{Category, CategoryId, Product, ProductId, ProductLookup};

/// Errors loading the catalog seed.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// On-disk seed shape.
#[derive(Debug, Deserialize)]
struct CatalogSeed {
    #[serde(default)]
    categories: Vec<Category>,
    products: Vec<Product>,
}

/// Sort keys accepted by the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Price,
    Rating,
    Category,
}

impl SortKey {
    /// Parse a query-string sort key; unknown keys mean "no sorting".
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Self::Name),
            "price" => Some(Self::Price),
            "rating" => Some(Self::Rating),
            "category" => Some(Self::Category),
            _ => None,
        }
    }
}

/// Sort direction for the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Parse a query-string direction; anything but `desc` is ascending.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value == "desc" {
            Self::Descending
        } else {
            Self::Ascending
        }
    }
}

/// Product listing selection: search, category filter, sorting.
#[derive(Debug, Clone, Default)]
pub struct ProductSelection {
    /// Case-insensitive substring match over name and description.
    pub search: Option<String>,
    /// Programmatic category names; empty means all categories.
    pub categories: Vec<String>,
    pub sort: Option<SortKey>,
    pub direction: SortDirection,
}

/// The in-memory catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Catalog {
    /// Load the catalog from a JSON seed file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::Io(e.to_string()))?;
        let seed: CatalogSeed =
            serde_json::from_str(&raw).map_err(|e| CatalogError::Parse(e.to_string()))?;

        tracing::info!(
            products = seed.products.len(),
            categories = seed.categories.len(),
            "Catalog loaded"
        );

        Ok(Self {
            products: seed.products,
            categories: seed.categories,
        })
    }

    /// Build a catalog from already-loaded entities.
    #[must_use]
    pub const fn from_parts(products: Vec<Product>, categories: Vec<Category>) -> Self {
        Self {
            products,
            categories,
        }
    }

    /// Get a product by ID.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Get a category by ID.
    #[must_use]
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Get a category by its programmatic name.
    #[must_use]
    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// All categories, in seed order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Select products for the listing page: filter by category, filter by
    /// search term, then sort.
    #[must_use]
    pub fn select(&self, selection: &ProductSelection) -> Vec<&Product> {
        let mut results: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| self.matches_categories(p, &selection.categories))
            .filter(|p| matches_search(p, selection.search.as_deref()))
            .collect();

        if let Some(sort) = selection.sort {
            self.sort_products(&mut results, sort);
            if selection.direction == SortDirection::Descending {
                results.reverse();
            }
        }

        results
    }

    fn matches_categories(&self, product: &Product, categories: &[String]) -> bool {
        if categories.is_empty() {
            return true;
        }
        product
            .category
            .and_then(|id| self.category(id))
            .is_some_and(|c| categories.iter().any(|name| *name == c.name))
    }

    fn sort_products(&self, products: &mut [&Product], sort: SortKey) {
        match sort {
            SortKey::Name => {
                products.sort_by_key(|p| p.name.to_lowercase());
            }
            SortKey::Price => {
                products.sort_by_key(|p| p.price);
            }
            SortKey::Rating => {
                // Unrated products sort below every rated one.
                products.sort_by_key(|p| p.rating);
            }
            SortKey::Category => {
                products.sort_by_key(|p| {
                    p.category
                        .and_then(|id| self.category(id))
                        .map(|c| c.name.clone())
                });
            }
        }
    }
}

impl ProductLookup for Catalog {
    fn product(&self, id: ProductId) -> Option<&Product> {
        self.get(id)
    }
}

/// Case-insensitive substring match over name and description.
fn matches_search(product: &Product, search: Option<&str>) -> bool {
    let Some(term) = search else {
        return true;
    };
    if term.is_empty() {
        return true;
    }
    let term = term.to_lowercase();
    product.name.to_lowercase().contains(&term)
        || product.description.to_lowercase().contains(&term)
}
