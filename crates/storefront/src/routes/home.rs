//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::catalog::ProductSelection;
use crate::filters;
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Number of products featured on the home page.
const FEATURED_PRODUCTS: usize = 4;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured_products: Vec<ProductView>,
}

/// Display the home page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = state.catalog();
    let featured_products = catalog
        .select(&ProductSelection::default())
        .into_iter()
        .take(FEATURED_PRODUCTS)
        .map(|p| ProductView::from_product(p, catalog))
        .collect();

    HomeTemplate { featured_products }
}
