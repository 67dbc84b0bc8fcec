//! # Generic Writer
//!
//! Renders a receipt tree into any text format by handing each node to a
//! caller-supplied conversion function.
//!
//! ## Traversal
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    write(table, variables, receipt)                     │
//! │                                                                         │
//! │  0. Check table has Receipt, ItemList, ItemListSep, Item               │
//! │     └── any missing? → WriteError::MissingConversions (nothing visited)│
//! │                                                                         │
//! │  1. Item      → Item(Name(name), Cost(cost), Discount(d), Tax(t))      │
//! │  2. ItemList  → ItemList( ItemListSep().join(each Item, in order) )    │
//! │  3. Receipt   → Receipt(meta, rendered ItemList, variables)            │
//! │                                                                         │
//! │  Post-order: children are rendered before their parent sees them.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Field Converters Shape the Item Function
//! `Name`, `Cost`, `Discount` and `Tax` are optional. By default names pass
//! through and numbers become their canonical text (`10.0`). Replacing one
//! changes the type handed to `Item`, so field converters are chosen first
//! (`FieldConverters`) and the table is built on top of them:
//!
//! ```rust
//! use costcocr_core::writer::{write, ConversionTable, FieldConverters, Variables};
//! use costcocr_core::{Item, ItemList, Metadata, Receipt};
//!
//! // Cost stays an f64 all the way into Item.
//! let fields = FieldConverters::new().cost(|n| n);
//! let table = ConversionTable::with_fields(fields)
//!     .receipt(|_meta, body, _vars| body)
//!     .item_list(|s| s)
//!     .item_list_sep(|| "\n".to_string())
//!     .item(|name, cost: f64, _discount, _tax| format!("{name}: ${cost:.2}"));
//!
//! let receipt = Receipt::new(
//!     Metadata::new(),
//!     ItemList::new(vec![Item::new("Naan Bread", 4.5, 0.0, 0.0).unwrap()]),
//! )
//! .unwrap();
//!
//! let out = write(&table, &Variables::new(), &receipt).unwrap();
//! assert_eq!(out, "Naan Bread: $4.50");
//! ```
//!
//! ## Partial Application
//! [`writer`] validates a table once and returns a [`ConfiguredWriter`] that
//! renders any number of receipts. [`write`] is exactly
//! `writer(table, variables)?.write(node)`.

use std::collections::BTreeMap;

use crate::amount::format_amount;
use crate::error::{Role, WriteError};
use crate::types::{Item, ItemList, Metadata, Receipt};

/// Free-form values passed through to the `Receipt` conversion function.
pub type Variables = BTreeMap<String, String>;

type NameFn<N> = Box<dyn Fn(&str) -> N + Send + Sync>;
type NumberFn<V> = Box<dyn Fn(f64) -> V + Send + Sync>;
type ReceiptFn = Box<dyn Fn(&Metadata, String, &Variables) -> String + Send + Sync>;
type ItemListFn = Box<dyn Fn(String) -> String + Send + Sync>;
type SeparatorFn = Box<dyn Fn() -> String + Send + Sync>;
type ItemFn<N, C, D, T> = Box<dyn Fn(N, C, D, T) -> String + Send + Sync>;

// =============================================================================
// Nodes
// =============================================================================

/// A borrowed IR node. Dispatch is an exhaustive match over this enum.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Receipt(&'a Receipt),
    ItemList(&'a ItemList),
    Item(&'a Item),
}

impl<'a> From<&'a Receipt> for Node<'a> {
    fn from(receipt: &'a Receipt) -> Self {
        Node::Receipt(receipt)
    }
}

impl<'a> From<&'a ItemList> for Node<'a> {
    fn from(items: &'a ItemList) -> Self {
        Node::ItemList(items)
    }
}

impl<'a> From<&'a Item> for Node<'a> {
    fn from(item: &'a Item) -> Self {
        Node::Item(item)
    }
}

// =============================================================================
// Field Converters
// =============================================================================

/// The optional `Name`, `Cost`, `Discount` and `Tax` conversions.
///
/// Type parameters are the output types of each converter, which are also
/// the argument types of the table's `Item` function.
pub struct FieldConverters<N = String, C = String, D = String, T = String> {
    name: NameFn<N>,
    cost: NumberFn<C>,
    discount: NumberFn<D>,
    tax: NumberFn<T>,
}

impl FieldConverters {
    /// Defaults: names pass through, numbers become canonical text.
    pub fn new() -> Self {
        FieldConverters {
            name: Box::new(|s: &str| s.to_string()),
            cost: Box::new(format_amount),
            discount: Box::new(format_amount),
            tax: Box::new(format_amount),
        }
    }
}

impl Default for FieldConverters {
    fn default() -> Self {
        FieldConverters::new()
    }
}

impl<N, C, D, T> FieldConverters<N, C, D, T> {
    /// Replaces the `Name` converter.
    pub fn name<V>(self, f: impl Fn(&str) -> V + Send + Sync + 'static) -> FieldConverters<V, C, D, T> {
        FieldConverters {
            name: Box::new(f),
            cost: self.cost,
            discount: self.discount,
            tax: self.tax,
        }
    }

    /// Replaces the `Cost` converter.
    pub fn cost<V>(self, f: impl Fn(f64) -> V + Send + Sync + 'static) -> FieldConverters<N, V, D, T> {
        FieldConverters {
            name: self.name,
            cost: Box::new(f),
            discount: self.discount,
            tax: self.tax,
        }
    }

    /// Replaces the `Discount` converter.
    pub fn discount<V>(self, f: impl Fn(f64) -> V + Send + Sync + 'static) -> FieldConverters<N, C, V, T> {
        FieldConverters {
            name: self.name,
            cost: self.cost,
            discount: Box::new(f),
            tax: self.tax,
        }
    }

    /// Replaces the `Tax` converter.
    pub fn tax<V>(self, f: impl Fn(f64) -> V + Send + Sync + 'static) -> FieldConverters<N, C, D, V> {
        FieldConverters {
            name: self.name,
            cost: self.cost,
            discount: self.discount,
            tax: Box::new(f),
        }
    }
}

// =============================================================================
// Conversion Table
// =============================================================================

/// A writer: how to render each node type.
///
/// `Receipt`, `ItemList`, `ItemListSep` and `Item` are required. The table
/// may be built incomplete; completeness is checked by [`writer`] and
/// [`write`] before any node is visited.
pub struct ConversionTable<N = String, C = String, D = String, T = String> {
    fields: FieldConverters<N, C, D, T>,
    receipt: Option<ReceiptFn>,
    item_list: Option<ItemListFn>,
    item_list_sep: Option<SeparatorFn>,
    item: Option<ItemFn<N, C, D, T>>,
}

impl ConversionTable {
    /// An empty table with default field converters.
    pub fn new() -> Self {
        ConversionTable::with_fields(FieldConverters::new())
    }
}

impl Default for ConversionTable {
    fn default() -> Self {
        ConversionTable::new()
    }
}

impl<N, C, D, T> ConversionTable<N, C, D, T> {
    /// An empty table on top of custom field converters.
    pub fn with_fields(fields: FieldConverters<N, C, D, T>) -> Self {
        ConversionTable {
            fields,
            receipt: None,
            item_list: None,
            item_list_sep: None,
            item: None,
        }
    }

    /// Sets `Receipt(meta, body, variables)`.
    pub fn receipt(
        mut self,
        f: impl Fn(&Metadata, String, &Variables) -> String + Send + Sync + 'static,
    ) -> Self {
        self.receipt = Some(Box::new(f));
        self
    }

    /// Sets `ItemList(joined_items)`.
    pub fn item_list(mut self, f: impl Fn(String) -> String + Send + Sync + 'static) -> Self {
        self.item_list = Some(Box::new(f));
        self
    }

    /// Sets `ItemListSep()`.
    pub fn item_list_sep(mut self, f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.item_list_sep = Some(Box::new(f));
        self
    }

    /// Sets `Item(name, cost, discount, tax)`.
    pub fn item(mut self, f: impl Fn(N, C, D, T) -> String + Send + Sync + 'static) -> Self {
        self.item = Some(Box::new(f));
        self
    }

    /// Required roles this table does not provide, in reporting order.
    pub fn missing(&self) -> Vec<Role> {
        let present = [
            self.receipt.is_some(),
            self.item_list.is_some(),
            self.item_list_sep.is_some(),
            self.item.is_some(),
        ];

        Role::REQUIRED
            .into_iter()
            .zip(present)
            .filter_map(|(role, present)| (!present).then_some(role))
            .collect()
    }
}

// =============================================================================
// Configured Writer
// =============================================================================

/// A validated table bound to its variables; renders nodes infallibly.
pub struct ConfiguredWriter<'t, N, C, D, T> {
    fields: &'t FieldConverters<N, C, D, T>,
    receipt: &'t (dyn Fn(&Metadata, String, &Variables) -> String + Send + Sync),
    item_list: &'t (dyn Fn(String) -> String + Send + Sync),
    item_list_sep: &'t (dyn Fn() -> String + Send + Sync),
    item: &'t (dyn Fn(N, C, D, T) -> String + Send + Sync),
    variables: &'t Variables,
}

/// Binds a table and its variables, checking the table is complete.
///
/// ## Errors
/// `WriteError::MissingConversions` naming every missing required role.
pub fn writer<'t, N, C, D, T>(
    table: &'t ConversionTable<N, C, D, T>,
    variables: &'t Variables,
) -> Result<ConfiguredWriter<'t, N, C, D, T>, WriteError> {
    match (
        &table.receipt,
        &table.item_list,
        &table.item_list_sep,
        &table.item,
    ) {
        (Some(receipt), Some(item_list), Some(item_list_sep), Some(item)) => Ok(ConfiguredWriter {
            fields: &table.fields,
            receipt: &**receipt,
            item_list: &**item_list,
            item_list_sep: &**item_list_sep,
            item: &**item,
            variables,
        }),
        _ => Err(WriteError::MissingConversions(table.missing())),
    }
}

/// Renders `node` with `table`. Same as `writer(table, variables)?.write(node)`.
pub fn write<'n, N, C, D, T>(
    table: &ConversionTable<N, C, D, T>,
    variables: &Variables,
    node: impl Into<Node<'n>>,
) -> Result<String, WriteError> {
    Ok(writer(table, variables)?.write(node))
}

impl<'t, N, C, D, T> ConfiguredWriter<'t, N, C, D, T> {
    /// Renders a receipt, item list or single item.
    pub fn write<'n>(&self, node: impl Into<Node<'n>>) -> String {
        self.render(node.into())
    }

    fn render(&self, node: Node<'_>) -> String {
        match node {
            Node::Receipt(receipt) => {
                let body = self.render(Node::ItemList(receipt.items()));
                (self.receipt)(receipt.meta(), body, self.variables)
            }
            Node::ItemList(items) => {
                let sep = (self.item_list_sep)();
                let rendered: Vec<String> = items
                    .iter()
                    .map(|item| self.render(Node::Item(item)))
                    .collect();
                (self.item_list)(rendered.join(&sep))
            }
            Node::Item(item) => {
                let fields = self.fields;
                (self.item)(
                    (fields.name)(item.name()),
                    (fields.cost)(item.cost()),
                    (fields.discount)(item.discount()),
                    (fields.tax)(item.tax()),
                )
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn csv_table() -> ConversionTable {
        ConversionTable::new()
            .receipt(|meta, body, _vars| {
                let mut output = Vec::new();
                for key in ["store", "date", "location"] {
                    if let Some(value) = meta.get(key) {
                        let mut label = key.to_string();
                        label[..1].make_ascii_uppercase();
                        output.push(format!("# {label}: {value}"));
                    }
                }
                output.push(body);
                output.join("\n")
            })
            .item_list(|s| s)
            .item_list_sep(|| "\n".to_string())
            .item(|name, cost, discount, tax| format!("{name}, {cost}, {discount}, {tax}"))
    }

    fn sample_receipt() -> Receipt {
        let mut meta = Metadata::new();
        meta.insert("store".into(), "Costco".into());
        meta.insert("date".into(), "Jan 27th".into());
        meta.insert("location".into(), "Berkeley".into());

        Receipt::new(
            meta,
            ItemList::new(vec![
                Item::new("Food 1", 10.0, 2.35, 0.09).unwrap(),
                Item::new("Food 2", 20.0, 4.0, 0.09).unwrap(),
            ]),
        )
        .unwrap()
    }

    #[test]
    fn test_csv_style_table_renders_receipt() {
        let out = write(&csv_table(), &Variables::new(), &sample_receipt()).unwrap();
        assert_eq!(
            out,
            "# Store: Costco\n\
             # Date: Jan 27th\n\
             # Location: Berkeley\n\
             Food 1, 10.0, 2.35, 0.09\n\
             Food 2, 20.0, 4.0, 0.09"
        );
    }

    #[test]
    fn test_missing_separator_fails_before_any_node() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (c1, c2, c3) = (calls.clone(), calls.clone(), calls.clone());

        let table = ConversionTable::new()
            .receipt(move |_, body, _| {
                c1.fetch_add(1, Ordering::SeqCst);
                body
            })
            .item_list(move |s| {
                c2.fetch_add(1, Ordering::SeqCst);
                s
            })
            .item(move |name, _, _, _| {
                c3.fetch_add(1, Ordering::SeqCst);
                name
            });

        let err = write(&table, &Variables::new(), &sample_receipt()).unwrap_err();
        assert_eq!(err, WriteError::MissingConversions(vec![Role::ItemListSep]));
        assert_eq!(err.to_string(), "Missing conversion functions: ItemListSep");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_table_reports_every_required_role() {
        let err = writer(&ConversionTable::new(), &Variables::new()).err().unwrap();
        assert_eq!(
            err,
            WriteError::MissingConversions(vec![
                Role::Receipt,
                Role::ItemList,
                Role::ItemListSep,
                Role::Item,
            ])
        );
    }

    #[test]
    fn test_traversal_is_post_order_and_in_sequence() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());

        let table = ConversionTable::new()
            .receipt(move |_, body, _| {
                l1.lock().unwrap().push("Receipt".to_string());
                body
            })
            .item_list(move |s| {
                l2.lock().unwrap().push("ItemList".to_string());
                s
            })
            .item_list_sep(|| "|".to_string())
            .item(move |name, _, _, _| {
                l3.lock().unwrap().push(name.clone());
                name
            });

        let out = write(&table, &Variables::new(), &sample_receipt()).unwrap();
        assert_eq!(out, "Food 1|Food 2");
        assert_eq!(
            *log.lock().unwrap(),
            ["Food 1", "Food 2", "ItemList", "Receipt"]
        );
    }

    #[test]
    fn test_variables_reach_receipt_function() {
        let table = ConversionTable::new()
            .receipt(|_, body, vars| format!("{}:{body}", vars["who"]))
            .item_list(|s| format!("[{s}]"))
            .item_list_sep(|| ",".to_string())
            .item(|name, _, _, _| name);

        let mut vars = Variables::new();
        vars.insert("who".into(), "ryan".into());

        let out = write(&table, &vars, &sample_receipt()).unwrap();
        assert_eq!(out, "ryan:[Food 1,Food 2]");
    }

    #[test]
    fn test_custom_field_converters_change_item_argument_types() {
        let fields = FieldConverters::new()
            .name(|s| s.to_uppercase())
            .cost(|n| n)
            .discount(|n| (n * 100.0).round() as i64)
            .tax(|n| n > 0.0);

        let table = ConversionTable::with_fields(fields)
            .receipt(|_, body, _| body)
            .item_list(|s| s)
            .item_list_sep(|| "\n".to_string())
            .item(|name: String, cost: f64, discount_cents: i64, taxed: bool| {
                format!("{name} {cost:.2} -{discount_cents}c taxed={taxed}")
            });

        let out = write(&table, &Variables::new(), &sample_receipt()).unwrap();
        assert_eq!(
            out,
            "FOOD 1 10.00 -235c taxed=true\nFOOD 2 20.00 -400c taxed=true"
        );
    }

    #[test]
    fn test_write_accepts_any_node() {
        let receipt = sample_receipt();
        let table = csv_table();
        let vars = Variables::new();

        let item = receipt.items().get(0).unwrap();
        assert_eq!(write(&table, &vars, item).unwrap(), "Food 1, 10.0, 2.35, 0.09");
        assert_eq!(
            write(&table, &vars, receipt.items()).unwrap(),
            "Food 1, 10.0, 2.35, 0.09\nFood 2, 20.0, 4.0, 0.09"
        );
    }

    #[test]
    fn test_empty_item_list_joins_to_empty_string() {
        let table = ConversionTable::new()
            .receipt(|_, body, _| format!("<{body}>"))
            .item_list(|s| format!("[{s}]"))
            .item_list_sep(|| ",".to_string())
            .item(|name, _, _, _| name);

        let receipt = Receipt::new(Metadata::new(), ItemList::default()).unwrap();
        assert_eq!(write(&table, &Variables::new(), &receipt).unwrap(), "<[]>");
    }

    #[test]
    fn test_configured_writer_matches_direct_write() {
        let table = csv_table();
        let vars = Variables::new();

        let first = sample_receipt();
        let second = Receipt::new(
            Metadata::new(),
            ItemList::new(vec![Item::new("Yakisoba", 12.99, 3.0, 0.0).unwrap()]),
        )
        .unwrap();

        let configured = writer(&table, &vars).unwrap();
        let mapped: Vec<String> = [&first, &second]
            .into_iter()
            .map(|r| configured.write(r))
            .collect();

        assert_eq!(mapped[0], write(&table, &vars, &first).unwrap());
        assert_eq!(mapped[1], write(&table, &vars, &second).unwrap());
        assert_eq!(mapped[1], "Yakisoba, 12.99, 3.0, 0.0");
    }

    #[test]
    fn test_writers_run_in_parallel() {
        fn assert_send_sync<X: Send + Sync>() {}
        assert_send_sync::<ConversionTable>();
        assert_send_sync::<Receipt>();

        let table = csv_table();
        let vars = Variables::new();
        let receipt = sample_receipt();
        let expected = write(&table, &vars, &receipt).unwrap();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| write(&table, &vars, &receipt).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
