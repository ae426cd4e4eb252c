//! Bag route handlers.
//!
//! Bag operations use HTMX for dynamic updates without full page reloads.
//! The bag itself lives in the session in its wire shape (see
//! [`thread_harbor_core::Bag`]); every handler reads it out, works on the
//! typed model, and writes the result back - including the add path, which
//! always writes back and redirects whether or not a size was chosen.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::Value;
use tower_sessions::Session;
use tracing::instrument;

use thread_harbor_core::{Bag, PricedBag, Price, ProductId, price};

use crate::catalog::Catalog;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::session_keys;
use crate::state::AppState;

/// Bag line display data for templates, one row per expanded line.
#[derive(Clone)]
pub struct BagItemView {
    pub product_id: i32,
    pub name: String,
    pub sku: Option<String>,
    pub size: Option<String>,
    pub quantity: u32,
    pub unit_price: Price,
    pub line_total: Price,
    pub image_url: Option<String>,
}

/// Bag display data for templates.
#[derive(Clone)]
pub struct BagView {
    pub items: Vec<BagItemView>,
    pub subtotal: Price,
    pub item_count: u32,
    pub delivery_fee: Price,
    pub free_delivery_remaining: Price,
    pub free_delivery_threshold: Price,
    pub grand_total: Price,
    pub has_free_delivery: bool,
}

impl BagView {
    /// Build the display view from a priced bag, resolving product names
    /// through the catalog.
    fn from_priced(priced: &PricedBag, catalog: &Catalog) -> Self {
        let items = priced
            .items
            .iter()
            .map(|item| {
                let product = catalog.get(item.product_id);
                BagItemView {
                    product_id: item.product_id.as_i32(),
                    name: product.map_or_else(
                        || item.product_id.to_string(),
                        |p| p.name.clone(),
                    ),
                    sku: product.and_then(|p| p.sku.clone()),
                    size: item.size.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    line_total: item.line_total,
                    image_url: product.and_then(|p| p.image_url.clone()),
                }
            })
            .collect();

        Self {
            items,
            subtotal: priced.subtotal,
            item_count: priced.item_count,
            delivery_fee: priced.delivery_fee,
            free_delivery_remaining: priced.free_delivery_remaining,
            free_delivery_threshold: priced.free_delivery_threshold,
            grand_total: priced.grand_total,
            has_free_delivery: priced.has_free_delivery(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Read the bag from the session, decoding the wire shape.
///
/// A missing bag is an empty bag; a malformed one is an error, never a
/// silent reset.
pub(crate) async fn read_bag(session: &Session) -> Result<Bag> {
    match session.get::<Value>(session_keys::BAG).await? {
        Some(value) => Ok(Bag::from_session_value(&value)?),
        None => Ok(Bag::new()),
    }
}

/// Write the bag back to the session in its wire shape.
pub(crate) async fn write_bag(session: &Session, bag: &Bag) -> Result<()> {
    session
        .insert(session_keys::BAG, bag.to_session_value())
        .await?;
    Ok(())
}

/// Price the bag against the catalog and delivery configuration.
pub(crate) fn price_bag(state: &AppState, bag: &Bag) -> Result<BagView> {
    let priced = price(bag, state.catalog(), &state.config().delivery)?;
    Ok(BagView::from_priced(&priced, state.catalog()))
}

// =============================================================================
// Forms
// =============================================================================

/// Add to bag form data.
#[derive(Debug, Deserialize)]
pub struct AddToBagForm {
    pub product_id: i32,
    pub quantity: u32,
    pub product_size: Option<String>,
    pub redirect_url: Option<String>,
}

/// Update bag form data.
#[derive(Debug, Deserialize)]
pub struct UpdateBagForm {
    pub product_id: i32,
    pub quantity: u32,
    pub product_size: Option<String>,
}

/// Remove from bag form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromBagForm {
    pub product_id: i32,
    pub product_size: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Bag page template.
#[derive(Template, WebTemplate)]
#[template(path = "bag/show.html")]
pub struct BagShowTemplate {
    pub bag: BagView,
}

/// Bag items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/bag_items.html")]
pub struct BagItemsTemplate {
    pub bag: BagView,
}

/// Bag count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/bag_count.html")]
pub struct BagCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the priced bag page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<BagShowTemplate> {
    let bag = read_bag(&session).await?;
    Ok(BagShowTemplate {
        bag: price_bag(&state, &bag)?,
    })
}

/// Add a quantity of a product to the bag, then redirect back.
///
/// The product must exist in the catalog before it goes into the bag -
/// rejecting dangling references here keeps the pricing invariant intact.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToBagForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.product_id);
    if state.catalog().get(product_id).is_none() {
        return Err(AppError::NotFound(format!("product {product_id}")));
    }

    let mut bag = read_bag(&session).await?;
    bag.add(product_id, form.quantity, form.product_size.as_deref())?;
    write_bag(&session, &bag).await?;

    // Only redirect within the site.
    let target = form
        .redirect_url
        .filter(|url| url.starts_with('/'))
        .unwrap_or_else(|| "/bag".to_string());
    Ok(Redirect::to(&target).into_response())
}

/// Set a bag line to an exact quantity (HTMX).
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateBagForm>,
) -> Result<Response> {
    let mut bag = read_bag(&session).await?;
    bag.set_quantity(
        ProductId::new(form.product_id),
        form.quantity,
        form.product_size.as_deref(),
    )?;
    write_bag(&session, &bag).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "bag-updated")]),
        BagItemsTemplate {
            bag: price_bag(&state, &bag)?,
        },
    )
        .into_response())
}

/// Remove a bag line, or one size sub-line (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromBagForm>,
) -> Result<Response> {
    let mut bag = read_bag(&session).await?;
    bag.remove(ProductId::new(form.product_id), form.product_size.as_deref());
    write_bag(&session, &bag).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "bag-updated")]),
        BagItemsTemplate {
            bag: price_bag(&state, &bag)?,
        },
    )
        .into_response())
}

/// Get the bag count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<BagCountTemplate> {
    let bag = read_bag(&session).await?;
    Ok(BagCountTemplate {
        count: bag.item_count(),
    })
}
