//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use thread_harbor_core::{Price, Product, ProductId};

use crate::catalog::{Catalog, ProductSelection, SortDirection, SortKey};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub sku: Option<String>,
    pub description: String,
    pub price: Price,
    pub rating: Option<Decimal>,
    pub image_url: Option<String>,
    pub category_name: Option<String>,
    pub has_sizes: bool,
}

impl ProductView {
    /// Build the display view, resolving the category's friendly name.
    pub(crate) fn from_product(product: &Product, catalog: &Catalog) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            sku: product.sku.clone(),
            description: product.description.clone(),
            price: product.price,
            rating: product.rating,
            image_url: product.image_url.clone(),
            category_name: product
                .category
                .and_then(|id| catalog.category(id))
                .map(|c| c.display_name().to_string()),
            has_sizes: product.has_sizes,
        }
    }
}

/// Category chip display data for the listing page.
#[derive(Clone)]
pub struct CategoryView {
    pub name: String,
    pub friendly_name: String,
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    /// Search term.
    pub q: Option<String>,
    /// Comma-separated programmatic category names.
    pub category: Option<String>,
    /// Sort key: name / price / rating / category.
    pub sort: Option<String>,
    /// Sort direction: asc / desc.
    pub direction: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductView>,
    pub search_term: Option<String>,
    pub current_categories: Vec<CategoryView>,
    pub current_sorting: String,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
}

/// Display product listing page, with search, category filters, and
/// sorting.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Response> {
    // Submitting the search form with no criteria bounces back to the
    // plain listing.
    if query.q.as_deref().is_some_and(|q| q.trim().is_empty()) {
        return Ok(Redirect::to("/products").into_response());
    }

    let categories: Vec<String> = query
        .category
        .as_deref()
        .map(|raw| raw.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    let selection = ProductSelection {
        search: query.q.clone(),
        categories: categories.clone(),
        sort: query.sort.as_deref().and_then(SortKey::parse),
        direction: query
            .direction
            .as_deref()
            .map(SortDirection::parse)
            .unwrap_or_default(),
    };

    let catalog = state.catalog();
    let products = catalog
        .select(&selection)
        .into_iter()
        .map(|p| ProductView::from_product(p, catalog))
        .collect();

    let current_categories = categories
        .iter()
        .filter_map(|name| catalog.category_by_name(name))
        .map(|c| CategoryView {
            name: c.name.clone(),
            friendly_name: c.display_name().to_string(),
        })
        .collect();

    let current_sorting = format!(
        "{}_{}",
        query.sort.as_deref().unwrap_or("None"),
        query.direction.as_deref().unwrap_or("None")
    );

    Ok(ProductsIndexTemplate {
        products,
        search_term: query.q,
        current_categories,
        current_sorting,
    }
    .into_response())
}

/// Display product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<ProductShowTemplate> {
    let product_id = ProductId::new(id);
    let product = state
        .catalog()
        .get(product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    Ok(ProductShowTemplate {
        product: ProductView::from_product(product, state.catalog()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use thread_harbor_core::DeliveryConfig;

    use super::*;
    use crate::config::StorefrontConfig;

    fn state() -> AppState {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://127.0.0.1:3000".to_string(),
            catalog_path: std::path::PathBuf::from("data/catalog.json"),
            delivery: DeliveryConfig {
                free_delivery_threshold: "50".parse().unwrap(),
                standard_delivery_percentage: "10".parse().unwrap(),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };
        AppState::new(config, Catalog::from_parts(vec![], vec![]))
    }

    fn query(q: Option<&str>) -> ProductListQuery {
        ProductListQuery {
            q: q.map(str::to_string),
            category: None,
            sort: None,
            direction: None,
        }
    }

    #[tokio::test]
    async fn empty_search_redirects_to_listing() {
        for q in ["", "   "] {
            let response = index(State(state()), Query(query(Some(q))))
                .await
                .expect("handler");
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(
                response.headers().get("location").unwrap(),
                "/products"
            );
        }
    }

    #[tokio::test]
    async fn search_with_criteria_renders_the_listing() {
        let response = index(State(state()), Query(query(Some("tote"))))
            .await
            .expect("handler");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
