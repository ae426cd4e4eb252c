//! The session shopping bag.
//!
//! The bag is a caller-owned value: the storefront reads it out of the
//! session at request time, mutates it through the operations here, and
//! writes it back. Nothing in this module touches ambient state.
//!
//! # Data model
//!
//! A bag is an ordered sequence of entries, one per product, in the order
//! the shopper added them. Each entry is either a flat quantity or a set of
//! per-size quantities for products sold in size variants. The variants are
//! an explicit tagged union - code that consumes a line matches on
//! [`BagLine`], it never probes a runtime shape.
//!
//! # Session wire shape
//!
//! In the session the bag is stored as a JSON object mapping product-id
//! strings to either a plain quantity or an `items_by_size` mapping:
//!
//! ```json
//! {
//!     "3": 2,
//!     "7": { "items_by_size": { "S": 2, "M": 1 } }
//! }
//! ```
//!
//! [`Bag::from_session_value`] decodes that shape into the typed model and
//! rejects anything else as [`BagError::MalformedEntry`] - a bad entry is a
//! data fault to surface, not something to silently coerce.

mod pricing;

pub use pricing::{DeliveryConfig, PricedBag, PricedItem, PricingError, ProductLookup, price};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::types::ProductId;

/// Errors from bag mutation and session decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BagError {
    /// The session-stored bag is not a JSON object.
    #[error("session bag is not a JSON object")]
    MalformedBag,

    /// A bag entry is neither a plain quantity nor an `items_by_size`
    /// mapping.
    #[error("bag entry {0:?} is neither a quantity nor an items_by_size mapping")]
    MalformedEntry(String),

    /// A size-split operation was applied to a flat line, or a flat
    /// operation to a sized line.
    #[error("product {0} is already in the bag with a different size shape")]
    SizeMismatch(ProductId),

    /// Quantities must be positive at the mutation boundary.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

/// Quantity of one size variant within a sized bag line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeQuantity {
    pub size: String,
    pub quantity: u32,
}

/// One bag line: a flat quantity, or quantities split across sizes.
///
/// Sizes within a `Sized` line are unique and kept in the order the shopper
/// added them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BagLine {
    Simple(u32),
    Sized(Vec<SizeQuantity>),
}

impl BagLine {
    /// Total quantity across the line, regardless of size splits.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        match self {
            Self::Simple(quantity) => *quantity,
            Self::Sized(sizes) => sizes.iter().map(|sq| sq.quantity).sum(),
        }
    }
}

/// One entry in the bag: a product and its line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagEntry {
    pub product_id: ProductId,
    pub line: BagLine,
}

/// The shopping bag: ordered entries, one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bag {
    entries: Vec<BagEntry>,
}

impl Bag {
    /// Create an empty bag.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Whether the bag has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries (distinct products), not total item count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &BagEntry> {
        self.entries.iter()
    }

    /// Total item count across all lines and sizes.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.entries.iter().map(|entry| entry.line.quantity()).sum()
    }

    fn entry_mut(&mut self, product_id: ProductId) -> Option<&mut BagEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.product_id == product_id)
    }

    /// Add `quantity` of a product, optionally split by size.
    ///
    /// Creates the product entry or size sub-entry if absent, otherwise adds
    /// to the existing quantity.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::InvalidQuantity`] for a zero quantity and
    /// [`BagError::SizeMismatch`] when the product is already in the bag
    /// with the other line shape.
    pub fn add(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        size: Option<&str>,
    ) -> Result<(), BagError> {
        if quantity == 0 {
            return Err(BagError::InvalidQuantity);
        }

        match (self.entry_mut(product_id), size) {
            (Some(entry), Some(size)) => match &mut entry.line {
                BagLine::Sized(sizes) => {
                    if let Some(sq) = sizes.iter_mut().find(|sq| sq.size == size) {
                        sq.quantity += quantity;
                    } else {
                        sizes.push(SizeQuantity {
                            size: size.to_string(),
                            quantity,
                        });
                    }
                    Ok(())
                }
                BagLine::Simple(_) => Err(BagError::SizeMismatch(product_id)),
            },
            (Some(entry), None) => match &mut entry.line {
                BagLine::Simple(existing) => {
                    *existing += quantity;
                    Ok(())
                }
                BagLine::Sized(_) => Err(BagError::SizeMismatch(product_id)),
            },
            (None, Some(size)) => {
                self.entries.push(BagEntry {
                    product_id,
                    line: BagLine::Sized(vec![SizeQuantity {
                        size: size.to_string(),
                        quantity,
                    }]),
                });
                Ok(())
            }
            (None, None) => {
                self.entries.push(BagEntry {
                    product_id,
                    line: BagLine::Simple(quantity),
                });
                Ok(())
            }
        }
    }

    /// Set a line (or one size sub-line) to an exact quantity.
    ///
    /// A quantity of zero removes the line or sub-line; a sized entry whose
    /// last size is removed drops entirely. Setting a quantity on a product
    /// not yet in the bag inserts it.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::SizeMismatch`] when the existing entry has the
    /// other line shape.
    pub fn set_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        size: Option<&str>,
    ) -> Result<(), BagError> {
        if quantity == 0 {
            self.remove(product_id, size);
            return Ok(());
        }

        match (self.entry_mut(product_id), size) {
            (Some(entry), Some(size)) => match &mut entry.line {
                BagLine::Sized(sizes) => {
                    if let Some(sq) = sizes.iter_mut().find(|sq| sq.size == size) {
                        sq.quantity = quantity;
                    } else {
                        sizes.push(SizeQuantity {
                            size: size.to_string(),
                            quantity,
                        });
                    }
                    Ok(())
                }
                BagLine::Simple(_) => Err(BagError::SizeMismatch(product_id)),
            },
            (Some(entry), None) => match &mut entry.line {
                BagLine::Simple(existing) => {
                    *existing = quantity;
                    Ok(())
                }
                BagLine::Sized(_) => Err(BagError::SizeMismatch(product_id)),
            },
            (None, _) => self.add(product_id, quantity, size),
        }
    }

    /// Remove a line, or one size sub-line of a sized entry.
    ///
    /// Removing a product or size that is not in the bag is a no-op.
    pub fn remove(&mut self, product_id: ProductId, size: Option<&str>) {
        let Some(index) = self
            .entries
            .iter()
            .position(|entry| entry.product_id == product_id)
        else {
            return;
        };

        match size {
            None => {
                self.entries.remove(index);
            }
            Some(size) => {
                let drop_entry = match self.entries.get_mut(index) {
                    Some(BagEntry {
                        line: BagLine::Sized(sizes),
                        ..
                    }) => {
                        sizes.retain(|sq| sq.size != size);
                        sizes.is_empty()
                    }
                    // Removing "size X" of a flat line removes nothing.
                    _ => false,
                };
                if drop_entry {
                    self.entries.remove(index);
                }
            }
        }
    }

    // =========================================================================
    // Session wire codec
    // =========================================================================

    /// Encode the bag into its session wire shape.
    #[must_use]
    pub fn to_session_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        for entry in &self.entries {
            let value = match &entry.line {
                BagLine::Simple(quantity) => Value::from(*quantity),
                BagLine::Sized(sizes) => {
                    let mut by_size = serde_json::Map::new();
                    for sq in sizes {
                        by_size.insert(sq.size.clone(), Value::from(sq.quantity));
                    }
                    let mut wrapper = serde_json::Map::new();
                    wrapper.insert("items_by_size".to_string(), Value::Object(by_size));
                    Value::Object(wrapper)
                }
            };
            map.insert(entry.product_id.to_string(), value);
        }
        Value::Object(map)
    }

    /// Decode a bag from its session wire shape.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::MalformedBag`] when the value is not an object,
    /// and [`BagError::MalformedEntry`] when an entry is neither a plain
    /// quantity nor an `items_by_size` mapping of quantities.
    pub fn from_session_value(value: &Value) -> Result<Self, BagError> {
        let Value::Object(map) = value else {
            return Err(BagError::MalformedBag);
        };

        let mut bag = Self::new();
        for (key, entry) in map {
            let product_id = key
                .parse::<i32>()
                .map(ProductId::new)
                .map_err(|_| BagError::MalformedEntry(key.clone()))?;

            let line = match entry {
                Value::Number(_) => BagLine::Simple(decode_quantity(entry, key)?),
                Value::Object(wrapper) => {
                    let by_size = match (wrapper.get("items_by_size"), wrapper.len()) {
                        (Some(Value::Object(by_size)), 1) => by_size,
                        _ => return Err(BagError::MalformedEntry(key.clone())),
                    };
                    let mut sizes = Vec::with_capacity(by_size.len());
                    for (size, quantity) in by_size {
                        sizes.push(SizeQuantity {
                            size: size.clone(),
                            quantity: decode_quantity(quantity, key)?,
                        });
                    }
                    BagLine::Sized(sizes)
                }
                _ => return Err(BagError::MalformedEntry(key.clone())),
            };

            bag.entries.push(BagEntry { product_id, line });
        }

        Ok(bag)
    }
}

/// Decode a non-negative quantity that fits in a `u32`.
fn decode_quantity(value: &Value, key: &str) -> Result<u32, BagError> {
    value
        .as_u64()
        .and_then(|q| u32::try_from(q).ok())
        .ok_or_else(|| BagError::MalformedEntry(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pid(id: i32) -> ProductId {
        ProductId::new(id)
    }

    #[test]
    fn add_creates_then_increments_flat_line() {
        let mut bag = Bag::new();
        bag.add(pid(1), 2, None).expect("add");
        bag.add(pid(1), 3, None).expect("increment");

        assert_eq!(bag.len(), 1);
        assert_eq!(bag.item_count(), 5);
    }

    #[test]
    fn add_creates_then_increments_size_sub_entries() {
        let mut bag = Bag::new();
        bag.add(pid(1), 2, Some("S")).expect("add S");
        bag.add(pid(1), 1, Some("M")).expect("add M");
        bag.add(pid(1), 1, Some("S")).expect("increment S");

        let entry = bag.iter().next().expect("entry");
        assert_eq!(
            entry.line,
            BagLine::Sized(vec![
                SizeQuantity {
                    size: "S".to_string(),
                    quantity: 3
                },
                SizeQuantity {
                    size: "M".to_string(),
                    quantity: 1
                },
            ])
        );
        assert_eq!(bag.item_count(), 4);
    }

    #[test]
    fn add_rejects_zero_quantity() {
        let mut bag = Bag::new();
        assert_eq!(bag.add(pid(1), 0, None), Err(BagError::InvalidQuantity));
        assert!(bag.is_empty());
    }

    #[test]
    fn add_rejects_mismatched_line_shape() {
        let mut bag = Bag::new();
        bag.add(pid(1), 1, None).expect("add flat");
        assert_eq!(
            bag.add(pid(1), 1, Some("S")),
            Err(BagError::SizeMismatch(pid(1)))
        );

        let mut bag = Bag::new();
        bag.add(pid(1), 1, Some("S")).expect("add sized");
        assert_eq!(bag.add(pid(1), 1, None), Err(BagError::SizeMismatch(pid(1))));
    }

    #[test]
    fn set_quantity_zero_removes_line() {
        let mut bag = Bag::new();
        bag.add(pid(1), 2, None).expect("add");
        bag.set_quantity(pid(1), 0, None).expect("set zero");
        assert!(bag.is_empty());
    }

    #[test]
    fn set_quantity_replaces_rather_than_adds() {
        let mut bag = Bag::new();
        bag.add(pid(1), 2, Some("M")).expect("add");
        bag.set_quantity(pid(1), 5, Some("M")).expect("set");
        assert_eq!(bag.item_count(), 5);
    }

    #[test]
    fn removing_last_size_drops_the_entry() {
        let mut bag = Bag::new();
        bag.add(pid(1), 2, Some("S")).expect("add S");
        bag.add(pid(1), 1, Some("M")).expect("add M");

        bag.remove(pid(1), Some("S"));
        assert_eq!(bag.item_count(), 1);

        bag.remove(pid(1), Some("M"));
        assert!(bag.is_empty());
    }

    #[test]
    fn remove_of_absent_product_is_a_no_op() {
        let mut bag = Bag::new();
        bag.add(pid(1), 1, None).expect("add");
        bag.remove(pid(2), None);
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn session_round_trip_preserves_order_and_shape() {
        let mut bag = Bag::new();
        bag.add(pid(3), 2, None).expect("add flat");
        bag.add(pid(7), 2, Some("S")).expect("add S");
        bag.add(pid(7), 1, Some("M")).expect("add M");

        let value = bag.to_session_value();
        assert_eq!(
            value,
            json!({
                "3": 2,
                "7": { "items_by_size": { "S": 2, "M": 1 } }
            })
        );

        let decoded = Bag::from_session_value(&value).expect("decode");
        assert_eq!(decoded, bag);
    }

    #[test]
    fn decode_rejects_non_object_bag() {
        assert_eq!(
            Bag::from_session_value(&json!([1, 2])),
            Err(BagError::MalformedBag)
        );
    }

    #[test]
    fn decode_rejects_malformed_entries() {
        // String quantity
        assert_eq!(
            Bag::from_session_value(&json!({ "3": "two" })),
            Err(BagError::MalformedEntry("3".to_string()))
        );
        // Negative quantity
        assert_eq!(
            Bag::from_session_value(&json!({ "3": -1 })),
            Err(BagError::MalformedEntry("3".to_string()))
        );
        // Wrong wrapper key
        assert_eq!(
            Bag::from_session_value(&json!({ "3": { "by_size": { "S": 1 } } })),
            Err(BagError::MalformedEntry("3".to_string()))
        );
        // Extra keys next to items_by_size
        assert_eq!(
            Bag::from_session_value(&json!({
                "3": { "items_by_size": { "S": 1 }, "extra": 1 }
            })),
            Err(BagError::MalformedEntry("3".to_string()))
        );
        // Non-numeric product id
        assert_eq!(
            Bag::from_session_value(&json!({ "tee": 1 })),
            Err(BagError::MalformedEntry("tee".to_string()))
        );
    }

    #[test]
    fn decode_accepts_empty_size_mapping() {
        let bag = Bag::from_session_value(&json!({ "3": { "items_by_size": {} } }))
            .expect("decode");
        assert_eq!(bag.item_count(), 0);
        assert_eq!(bag.len(), 1);
    }
}
