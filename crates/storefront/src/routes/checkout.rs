//! Checkout route handlers.
//!
//! Checkout starts from the priced bag: the grand total computed here is
//! what the payment collection step would charge. Payment processing itself
//! is a non-goal, so placing the order stops at confirmation - the handoff
//! point where a payment processor would take over.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use thread_harbor_core::Bag;

use crate::error::Result;
use crate::filters;
use crate::routes::bag::{BagView, price_bag, read_bag, write_bag};
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub bag: BagView,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub order: OrderForm,
    pub bag: BagView,
}

/// Order contact and delivery details.
#[derive(Debug, Deserialize)]
pub struct OrderForm {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub street_address1: String,
    pub street_address2: Option<String>,
    pub town_or_city: String,
    pub postcode: Option<String>,
    pub country: String,
}

/// Display the checkout page.
///
/// An empty bag has nothing to check out; the shopper is sent back to the
/// product listing.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Response> {
    let bag = read_bag(&session).await?;
    if bag.is_empty() {
        return Ok(Redirect::to("/products").into_response());
    }

    Ok(CheckoutTemplate {
        bag: price_bag(&state, &bag)?,
    }
    .into_response())
}

/// Accept the order form and hand off at the payment boundary.
///
/// The bag is priced one final time (the grand total shown on the
/// confirmation is the amount payment collection would charge), then
/// cleared from the session.
#[instrument(skip(state, session, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<OrderForm>,
) -> Result<Response> {
    let bag = read_bag(&session).await?;
    if bag.is_empty() {
        return Ok(Redirect::to("/products").into_response());
    }

    let view = price_bag(&state, &bag)?;
    tracing::info!(
        item_count = view.item_count,
        grand_total = %view.grand_total,
        town_or_city = %form.town_or_city,
        country = %form.country,
        "Order received"
    );

    write_bag(&session, &Bag::new()).await?;

    Ok(ConfirmationTemplate {
        order: form,
        bag: view,
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use thread_harbor_core::Price;

    use super::*;

    fn order() -> OrderForm {
        OrderForm {
            full_name: "Robin Shore".to_string(),
            email: "robin@example.com".to_string(),
            phone_number: "01234 567890".to_string(),
            street_address1: "1 Quay Lane".to_string(),
            street_address2: Some("Berth 4".to_string()),
            town_or_city: "Harwich".to_string(),
            postcode: Some("CO12 3AB".to_string()),
            country: "United Kingdom".to_string(),
        }
    }

    fn empty_bag_view() -> BagView {
        BagView {
            items: vec![],
            subtotal: Price::ZERO,
            item_count: 0,
            delivery_fee: Price::ZERO,
            free_delivery_remaining: Price::ZERO,
            free_delivery_threshold: Price::ZERO,
            grand_total: Price::ZERO,
            has_free_delivery: false,
        }
    }

    #[test]
    fn confirmation_surfaces_contact_and_delivery_details() {
        let html = ConfirmationTemplate {
            order: order(),
            bag: empty_bag_view(),
        }
        .render()
        .expect("render");

        assert!(html.contains("Robin Shore"));
        assert!(html.contains("robin@example.com"));
        assert!(html.contains("1 Quay Lane"));
        assert!(html.contains("Berth 4"));
        assert!(html.contains("Harwich"));
        assert!(html.contains("CO12 3AB"));
        assert!(html.contains("United Kingdom"));
        assert!(html.contains("01234 567890"));
    }
}
