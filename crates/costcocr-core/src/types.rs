//! # Receipt IR Types
//!
//! The intermediate representation every receipt passes through.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Receipt IR                                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Receipt                                                        │   │
//! │  │  ─────────────                                                  │   │
//! │  │  meta:  { "store": "Costco", "date": "Jan 27th", ... }         │   │
//! │  │  items: ItemList ─────────────┐                                 │   │
//! │  └───────────────────────────────┼─────────────────────────────────┘   │
//! │                                  ▼                                      │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  ItemList  [ Item, Item, Item, ... ]   (order matters)          │   │
//! │  └───────────────────────────────┬─────────────────────────────────┘   │
//! │                                  ▼                                      │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Item                                                           │   │
//! │  │  name      "Kirkland Salmon Slices"                             │   │
//! │  │  cost      10.0                                                 │   │
//! │  │  discount  2.35    (cash amount, positive)                      │   │
//! │  │  tax       0.09    (fraction: 9%)                               │   │
//! │  │  total     cost * (1 + tax) - discount   (derived, read-only)   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! A `Receipt` owns its metadata and `ItemList`; an `ItemList` owns its
//! `Item`s. Nothing is mutable after construction, so a receipt can be shared
//! across threads freely.
//!
//! ## Floats, Not Cents
//! Item amounts are `f64`. The IR records what a receipt says; it does not
//! do ledger math. Use [`crate::amount::round_cents`] when a display total
//! needs rounding.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::amount::format_amount;
use crate::validation::{validate_amount, validate_finite, ValidationResult};

// =============================================================================
// Metadata
// =============================================================================

/// Receipt metadata: text keys mapped to primitive values.
///
/// A `BTreeMap` keeps keys sorted, so equality ignores insertion order and
/// the printed form is deterministic.
pub type Metadata = BTreeMap<String, MetaValue>;

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl MetaValue {
    /// Returns the text if this is a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Plain display (no quoting). Writers use this for header lines.
impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Text(s) => f.write_str(s),
            MetaValue::Integer(n) => write!(f, "{n}"),
            MetaValue::Float(n) => f.write_str(&format_amount(*n)),
            MetaValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Text(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::Text(s)
    }
}

impl From<i64> for MetaValue {
    fn from(n: i64) -> Self {
        MetaValue::Integer(n)
    }
}

impl From<f64> for MetaValue {
    fn from(n: f64) -> Self {
        MetaValue::Float(n)
    }
}

impl From<bool> for MetaValue {
    fn from(b: bool) -> Self {
        MetaValue::Bool(b)
    }
}

// =============================================================================
// Item
// =============================================================================

/// One line on a receipt.
///
/// ## Invariants
/// - `cost`, `discount` and `tax` are finite and `>= 0`
/// - `total == cost * (1 + tax) - discount`, fixed at construction
///
/// ## Example
/// ```rust
/// use costcocr_core::Item;
///
/// let item = Item::new("Food 1", 10.0, 2.35, 0.09).unwrap();
/// assert_eq!(item.total(), 10.0 * 1.09 - 2.35);
///
/// assert!(Item::new("Food 1", -10.0, 0.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Item {
    name: String,
    cost: f64,
    discount: f64,
    tax: f64,
    total: f64,
}

impl Item {
    /// Creates an item, validating every amount first.
    ///
    /// ## Arguments
    /// * `cost` - Price of the item
    /// * `discount` - Cash amount the item is reduced by (positive)
    /// * `tax` - Tax rate as a fraction (0.09 for 9%)
    pub fn new(name: impl Into<String>, cost: f64, discount: f64, tax: f64) -> ValidationResult<Self> {
        validate_amount("cost", cost)?;
        validate_amount("discount", discount)?;
        validate_amount("tax", tax)?;

        Ok(Item {
            name: name.into(),
            cost,
            discount,
            tax,
            total: cost * (1.0 + tax) - discount,
        })
    }

    /// Name of the item.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cost of the item.
    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Amount of currency the item is reduced by.
    #[inline]
    pub fn discount(&self) -> f64 {
        self.discount
    }

    /// Tax rate for the item, as a fraction.
    #[inline]
    pub fn tax(&self) -> f64 {
        self.tax
    }

    /// Total for the item: `cost * (1 + tax) - discount`.
    #[inline]
    pub fn total(&self) -> f64 {
        self.total
    }
}

/// Structural equality over the four input fields.
impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.cost == other.cost
            && self.discount == other.discount
            && self.tax == other.tax
    }
}

// =============================================================================
// Item List
// =============================================================================

/// An ordered list of items. Order matters for equality and output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemList(Vec<Item>);

impl ItemList {
    /// Wraps a vector of items.
    pub fn new(items: Vec<Item>) -> Self {
        ItemList(items)
    }

    /// Iterates the items in receipt order.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.0.iter()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no items.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the item at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.0.get(index)
    }

    /// Sum of every item's total.
    pub fn total(&self) -> f64 {
        self.0.iter().map(Item::total).sum()
    }
}

impl From<Vec<Item>> for ItemList {
    fn from(items: Vec<Item>) -> Self {
        ItemList(items)
    }
}

impl FromIterator<Item> for ItemList {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        ItemList(iter.into_iter().collect())
    }
}

impl IntoIterator for ItemList {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ItemList {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// Root of the receipt IR: metadata plus the list of items.
///
/// ## Example
/// ```rust
/// use costcocr_core::{Item, ItemList, Metadata, Receipt};
///
/// let mut meta = Metadata::new();
/// meta.insert("store".into(), "Costco".into());
///
/// let items = ItemList::new(vec![Item::new("Food 1", 10.0, 0.0, 0.0).unwrap()]);
/// let receipt = Receipt::new(meta, items).unwrap();
///
/// assert_eq!(receipt.iter().count(), 1);
/// assert_eq!(receipt.total(), 10.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    meta: Metadata,
    items: ItemList,
}

impl Receipt {
    /// Creates a receipt.
    ///
    /// ## Rules
    /// - Float metadata values must be finite (NaN would break equality)
    pub fn new(meta: Metadata, items: ItemList) -> ValidationResult<Self> {
        for (key, value) in &meta {
            if let MetaValue::Float(n) = value {
                validate_finite(&format!("meta.{key}"), *n)?;
            }
        }

        Ok(Receipt { meta, items })
    }

    /// The metadata for the receipt.
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    /// Looks up one metadata entry.
    pub fn meta_value(&self, key: &str) -> Option<&MetaValue> {
        self.meta.get(key)
    }

    /// The list of items on the receipt.
    pub fn items(&self) -> &ItemList {
        &self.items
    }

    /// Iterates the items in receipt order.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Sum of every item's total.
    pub fn total(&self) -> f64 {
        self.items.total()
    }
}

impl<'a> IntoIterator for &'a Receipt {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn item(name: &str, cost: f64) -> Item {
        Item::new(name, cost, 0.0, 0.0).unwrap()
    }

    #[test]
    fn test_item_total_is_derived() {
        let cases = [
            (10.0, 2.35, 0.09),
            (20.0, 4.0, 0.09),
            (0.0, 0.0, 0.0),
            (3.5, 0.0, 0.0725),
            (99.99, 100.0, 0.0),
        ];

        for (cost, discount, tax) in cases {
            let item = Item::new("x", cost, discount, tax).unwrap();
            assert_eq!(item.total(), cost * (1.0 + tax) - discount);
        }
    }

    #[test]
    fn test_item_rejects_negative_fields() {
        for (cost, discount, tax, field) in [
            (-1.0, 0.0, 0.0, "cost"),
            (1.0, -0.5, 0.0, "discount"),
            (1.0, 0.0, -0.09, "tax"),
        ] {
            match Item::new("x", cost, discount, tax) {
                Err(ValidationError::Negative { field: got, .. }) => assert_eq!(got, field),
                other => panic!("expected Negative for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_item_rejects_nan() {
        let err = Item::new("x", 1.0, f64::NAN, 0.0).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotANumber {
                field: "discount".to_string()
            }
        );
    }

    #[test]
    fn test_item_equality_is_structural() {
        assert_eq!(item("a", 1.0), item("a", 1.0));
        assert_ne!(item("a", 1.0), item("b", 1.0));
        assert_ne!(item("a", 1.0), item("a", 2.0));
        assert_ne!(
            Item::new("a", 1.0, 0.0, 0.09).unwrap(),
            Item::new("a", 1.0, 0.0, 0.0).unwrap()
        );
    }

    #[test]
    fn test_item_list_equality_is_order_sensitive() {
        let a = item("a", 1.0);
        let b = item("b", 2.0);

        let ab = ItemList::new(vec![a.clone(), b.clone()]);
        let ba = ItemList::new(vec![b.clone(), a.clone()]);

        assert_ne!(ab, ba);
        assert_eq!(ab, ItemList::new(vec![a.clone(), b]));
        assert_ne!(ab, ItemList::new(vec![a]));
    }

    #[test]
    fn test_item_list_iteration_and_total() {
        let list: ItemList = vec![item("a", 1.5), item("b", 2.5)].into_iter().collect();

        let names: Vec<&str> = list.iter().map(Item::name).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(1).map(Item::name), Some("b"));
        assert_eq!(list.total(), 4.0);
    }

    #[test]
    fn test_receipt_equality_ignores_meta_order() {
        let items = ItemList::new(vec![item("a", 1.0), item("b", 2.0)]);

        let mut first = Metadata::new();
        first.insert("store".into(), "Costco".into());
        first.insert("date".into(), "Jan 27th".into());

        let mut second = Metadata::new();
        second.insert("date".into(), "Jan 27th".into());
        second.insert("store".into(), "Costco".into());

        let r1 = Receipt::new(first.clone(), items.clone()).unwrap();
        let r2 = Receipt::new(second, items).unwrap();
        assert_eq!(r1, r2);

        let reversed = ItemList::new(vec![item("b", 2.0), item("a", 1.0)]);
        let r3 = Receipt::new(first, reversed).unwrap();
        assert_ne!(r1, r3);
    }

    #[test]
    fn test_receipt_rejects_nan_metadata() {
        let mut meta = Metadata::new();
        meta.insert("rate".into(), MetaValue::Float(f64::NAN));

        let err = Receipt::new(meta, ItemList::default()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NotANumber {
                field: "meta.rate".to_string()
            }
        );
    }

    #[test]
    fn test_receipt_iterates_items() {
        let receipt = Receipt::new(
            Metadata::new(),
            ItemList::new(vec![item("a", 1.0), item("b", 2.0)]),
        )
        .unwrap();

        let mut total = 0.0;
        for item in &receipt {
            total += item.total();
        }
        assert_eq!(total, 3.0);
        assert_eq!(receipt.total(), 3.0);
    }

    #[test]
    fn test_meta_value_display_is_unquoted() {
        assert_eq!(MetaValue::from("Berkeley").to_string(), "Berkeley");
        assert_eq!(MetaValue::from(42_i64).to_string(), "42");
        assert_eq!(MetaValue::from(1.0).to_string(), "1.0");
        assert_eq!(MetaValue::from(true).to_string(), "true");
    }
}
