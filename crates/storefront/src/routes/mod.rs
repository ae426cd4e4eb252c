//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing (q / category / sort / direction)
//! GET  /products/{id}          - Product detail
//!
//! # Bag (HTMX fragments)
//! GET  /bag                    - Priced bag page
//! POST /bag/add                - Add to bag, then redirect back
//! POST /bag/update             - Set line quantity (returns bag_items fragment)
//! POST /bag/remove             - Remove line (returns bag_items fragment)
//! GET  /bag/count              - Bag count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Checkout initiation (empty bag redirects
//!                                to /products)
//! POST /checkout               - Accept order form, confirm, clear bag
//! ```

pub mod bag;
pub mod checkout;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the bag routes router.
pub fn bag_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(bag::show))
        .route("/add", post(bag::add))
        .route("/update", post(bag::update))
        .route("/remove", post(bag::remove))
        .route("/count", get(bag::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product routes
        .nest("/products", product_routes())
        // Bag routes
        .nest("/bag", bag_routes())
        // Checkout
        .route("/checkout", get(checkout::show).post(checkout::place_order))
}
