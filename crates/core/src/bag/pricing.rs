//! Bag pricing engine.
//!
//! Turns a bag snapshot plus a product lookup into a fully priced view:
//! per-line totals, aggregate subtotal, item count, the delivery-fee tier,
//! free-delivery progress, and the grand total. This is a pure computation -
//! it performs no I/O of its own and mutates nothing.
//!
//! Delivery tiers: below the configured threshold the fee is a percentage of
//! the subtotal; at or above it delivery is free. All arithmetic is exact
//! decimal.

use rust_decimal::Decimal;
use thiserror::Error;

use super::{Bag, BagLine};
use crate::types::{Price, Product, ProductId};

/// Delivery-fee configuration, supplied by application configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// Minimum subtotal for free delivery.
    pub free_delivery_threshold: Decimal,
    /// Percentage of the subtotal charged as delivery fee below the
    /// threshold.
    pub standard_delivery_percentage: Decimal,
}

/// Catalog capability injected into the pricing engine.
///
/// The storefront backs this with its in-memory catalog; tests back it with
/// a plain map.
pub trait ProductLookup {
    fn product(&self, id: ProductId) -> Option<&Product>;
}

impl ProductLookup for std::collections::HashMap<ProductId, Product> {
    fn product(&self, id: ProductId) -> Option<&Product> {
        self.get(&id)
    }
}

/// Pricing failures.
///
/// A bag referencing a product the catalog does not have is a
/// data-integrity fault: pricing fails fast and produces no partial result.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("bag references unknown product {0}")]
    ProductNotFound(ProductId),
}

/// One priced line of the bag, expanded per size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedItem {
    pub product_id: ProductId,
    pub size: Option<String>,
    pub quantity: u32,
    pub unit_price: Price,
    pub line_total: Price,
}

/// A fully priced view of the bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedBag {
    /// Expanded lines, in bag order (sized lines in size order).
    pub items: Vec<PricedItem>,
    pub subtotal: Price,
    pub item_count: u32,
    pub delivery_fee: Price,
    /// How much more the shopper must spend for free delivery; zero once
    /// the threshold is met.
    pub free_delivery_remaining: Price,
    /// The configured threshold, carried for display.
    pub free_delivery_threshold: Price,
    pub grand_total: Price,
}

impl PricedBag {
    /// Whether the bag qualifies for free delivery.
    #[must_use]
    pub fn has_free_delivery(&self) -> bool {
        self.delivery_fee.is_zero() && self.free_delivery_remaining.is_zero()
    }
}

/// Price a bag snapshot.
///
/// Iterates entries in bag order, resolving each product through `lookup`.
/// A `Simple` line contributes one item; a `Sized` line contributes one
/// item per size pair, in size order. An empty bag prices to all zeros with
/// the full threshold still remaining.
///
/// # Errors
///
/// Returns [`PricingError::ProductNotFound`] on the first dangling product
/// reference; no partial result is produced.
pub fn price(
    bag: &Bag,
    lookup: &impl ProductLookup,
    config: &DeliveryConfig,
) -> Result<PricedBag, PricingError> {
    let mut items = Vec::new();
    let mut subtotal = Price::ZERO;
    let mut item_count: u32 = 0;

    for entry in bag.iter() {
        let product = lookup
            .product(entry.product_id)
            .ok_or(PricingError::ProductNotFound(entry.product_id))?;

        match &entry.line {
            BagLine::Simple(quantity) => {
                push_item(
                    &mut items,
                    &mut subtotal,
                    &mut item_count,
                    entry.product_id,
                    None,
                    *quantity,
                    product.price,
                );
            }
            BagLine::Sized(sizes) => {
                for sq in sizes {
                    push_item(
                        &mut items,
                        &mut subtotal,
                        &mut item_count,
                        entry.product_id,
                        Some(sq.size.clone()),
                        sq.quantity,
                        product.price,
                    );
                }
            }
        }
    }

    let (delivery_fee, free_delivery_remaining) = delivery_tier(subtotal, config);
    let grand_total = subtotal + delivery_fee;

    Ok(PricedBag {
        items,
        subtotal,
        item_count,
        delivery_fee,
        free_delivery_remaining,
        free_delivery_threshold: Price::new(config.free_delivery_threshold),
        grand_total,
    })
}

/// Accumulate one expanded line.
fn push_item(
    items: &mut Vec<PricedItem>,
    subtotal: &mut Price,
    item_count: &mut u32,
    product_id: ProductId,
    size: Option<String>,
    quantity: u32,
    unit_price: Price,
) {
    let line_total = unit_price * quantity;
    *subtotal += line_total;
    *item_count += quantity;
    items.push(PricedItem {
        product_id,
        size,
        quantity,
        unit_price,
        line_total,
    });
}

/// Compute the delivery fee and free-delivery gap for a subtotal.
fn delivery_tier(subtotal: Price, config: &DeliveryConfig) -> (Price, Price) {
    if subtotal.amount() >= config.free_delivery_threshold {
        (Price::ZERO, Price::ZERO)
    } else {
        let fee = subtotal.amount() * config.standard_delivery_percentage / Decimal::ONE_HUNDRED;
        let remaining = config.free_delivery_threshold - subtotal.amount();
        (Price::new(fee), Price::new(remaining))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::types::Product;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("valid decimal literal")
    }

    fn product(id: i32, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            sku: None,
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::new(dec(price)),
            has_sizes: false,
            rating: None,
            image_url: None,
            category: None,
        }
    }

    fn catalog(products: Vec<Product>) -> HashMap<ProductId, Product> {
        products.into_iter().map(|p| (p.id, p)).collect()
    }

    fn config() -> DeliveryConfig {
        DeliveryConfig {
            free_delivery_threshold: dec("50.00"),
            standard_delivery_percentage: dec("10"),
        }
    }

    #[test]
    fn empty_bag_prices_to_zeros_with_full_threshold_remaining() {
        let priced = price(&Bag::new(), &catalog(vec![]), &config()).expect("price");

        assert!(priced.items.is_empty());
        assert_eq!(priced.subtotal, Price::ZERO);
        assert_eq!(priced.item_count, 0);
        assert_eq!(priced.delivery_fee, Price::ZERO);
        assert_eq!(priced.free_delivery_remaining, Price::new(dec("50.00")));
        assert_eq!(priced.grand_total, Price::ZERO);
        assert!(!priced.has_free_delivery());
    }

    #[test]
    fn below_threshold_charges_percentage_fee() {
        // Threshold 50.00, percentage 10, bag {P1: 3} at 10.00 each.
        let mut bag = Bag::new();
        bag.add(ProductId::new(1), 3, None).expect("add");

        let priced = price(&bag, &catalog(vec![product(1, "10.00")]), &config()).expect("price");

        assert_eq!(priced.subtotal, Price::new(dec("30.00")));
        assert_eq!(priced.item_count, 3);
        assert_eq!(priced.delivery_fee, Price::new(dec("3.00")));
        assert_eq!(priced.free_delivery_remaining, Price::new(dec("20.00")));
        assert_eq!(priced.grand_total, Price::new(dec("33.00")));
    }

    #[test]
    fn at_or_above_threshold_delivery_is_free() {
        // Same config, bag {P1: 6} -> subtotal 60.00 >= 50.00.
        let mut bag = Bag::new();
        bag.add(ProductId::new(1), 6, None).expect("add");

        let priced = price(&bag, &catalog(vec![product(1, "10.00")]), &config()).expect("price");

        assert_eq!(priced.subtotal, Price::new(dec("60.00")));
        assert_eq!(priced.delivery_fee, Price::ZERO);
        assert_eq!(priced.free_delivery_remaining, Price::ZERO);
        assert_eq!(priced.grand_total, Price::new(dec("60.00")));
        assert!(priced.has_free_delivery());
    }

    #[test]
    fn exactly_at_threshold_is_free() {
        let mut bag = Bag::new();
        bag.add(ProductId::new(1), 5, None).expect("add");

        let priced = price(&bag, &catalog(vec![product(1, "10.00")]), &config()).expect("price");

        assert_eq!(priced.subtotal, Price::new(dec("50.00")));
        assert_eq!(priced.delivery_fee, Price::ZERO);
        assert_eq!(priced.grand_total, Price::new(dec("50.00")));
    }

    #[test]
    fn sized_lines_expand_per_size_in_order() {
        // Bag {P2: {items_by_size: {S: 2, M: 1}}}, P2 at 5.00.
        let mut bag = Bag::new();
        bag.add(ProductId::new(2), 2, Some("S")).expect("add S");
        bag.add(ProductId::new(2), 1, Some("M")).expect("add M");

        let priced = price(&bag, &catalog(vec![product(2, "5.00")]), &config()).expect("price");

        assert_eq!(priced.subtotal, Price::new(dec("15.00")));
        assert_eq!(priced.item_count, 3);
        assert_eq!(priced.items.len(), 2);

        let first = priced.items.first().expect("first item");
        assert_eq!(first.size.as_deref(), Some("S"));
        assert_eq!(first.quantity, 2);
        assert_eq!(first.line_total, Price::new(dec("10.00")));

        let second = priced.items.get(1).expect("second item");
        assert_eq!(second.size.as_deref(), Some("M"));
        assert_eq!(second.quantity, 1);
        assert_eq!(second.line_total, Price::new(dec("5.00")));
    }

    #[test]
    fn size_split_does_not_change_totals() {
        // One flat quantity-3 line vs the same 3 split across two sizes.
        let catalog = catalog(vec![product(1, "7.50")]);

        let mut flat = Bag::new();
        flat.add(ProductId::new(1), 3, None).expect("add");

        let mut split = Bag::new();
        split.add(ProductId::new(1), 2, Some("S")).expect("add S");
        split.add(ProductId::new(1), 1, Some("L")).expect("add L");

        let flat_priced = price(&flat, &catalog, &config()).expect("price flat");
        let split_priced = price(&split, &catalog, &config()).expect("price split");

        assert_eq!(flat_priced.subtotal, split_priced.subtotal);
        assert_eq!(flat_priced.item_count, split_priced.item_count);
        assert_eq!(flat_priced.grand_total, split_priced.grand_total);
    }

    #[test]
    fn unknown_product_fails_fast() {
        let mut bag = Bag::new();
        bag.add(ProductId::new(1), 1, None).expect("add known");
        bag.add(ProductId::new(99), 1, None).expect("add unknown");

        let result = price(&bag, &catalog(vec![product(1, "10.00")]), &config());
        assert_eq!(result, Err(PricingError::ProductNotFound(ProductId::new(99))));
    }

    #[test]
    fn empty_sized_line_contributes_nothing() {
        let value = serde_json::json!({ "1": { "items_by_size": {} } });
        let bag = Bag::from_session_value(&value).expect("decode");

        let priced = price(&bag, &catalog(vec![product(1, "10.00")]), &config()).expect("price");
        assert!(priced.items.is_empty());
        assert_eq!(priced.subtotal, Price::ZERO);
        assert_eq!(priced.item_count, 0);
    }

    #[test]
    fn fee_is_exact_decimal_no_rounding_drift() {
        // 33.33 * 10 / 100 = 3.333 exactly.
        let mut bag = Bag::new();
        bag.add(ProductId::new(1), 3, None).expect("add");

        let priced = price(&bag, &catalog(vec![product(1, "11.11")]), &config()).expect("price");

        assert_eq!(priced.subtotal, Price::new(dec("33.33")));
        assert_eq!(priced.delivery_fee, Price::new(dec("3.333")));
        assert_eq!(priced.grand_total, Price::new(dec("36.663")));
    }

    #[test]
    fn entries_price_in_bag_order() {
        let mut bag = Bag::new();
        bag.add(ProductId::new(5), 1, None).expect("add 5");
        bag.add(ProductId::new(2), 1, None).expect("add 2");

        let priced = price(
            &bag,
            &catalog(vec![product(5, "1.00"), product(2, "2.00")]),
            &config(),
        )
        .expect("price");

        let ids: Vec<i32> = priced.items.iter().map(|i| i.product_id.as_i32()).collect();
        assert_eq!(ids, vec![5, 2]);
    }
}
