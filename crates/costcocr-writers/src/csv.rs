//! # CSV Writer
//!
//! Comment-style header lines for the well-known metadata keys, then one
//! comma-separated line per item.
//!
//! ```text
//! # Store: Costco
//! # Date: Jan 27th
//! # Location: Berkeley
//! Food 1, 10.0, 2.35, 0.09
//! Food 2, 20.0, 4.0, 0.09
//! ```

use costcocr_core::{ConversionTable, Metadata, Variables};

/// Metadata keys printed as headers, in output order.
const HEADER_KEYS: [(&str, &str); 3] = [("store", "Store"), ("date", "Date"), ("location", "Location")];

/// Builds the CSV conversion table.
pub fn table() -> ConversionTable {
    ConversionTable::new()
        .receipt(receipt)
        .item_list(|items| items)
        .item_list_sep(|| "\n".to_string())
        .item(item)
}

fn receipt(meta: &Metadata, body: String, _variables: &Variables) -> String {
    let mut output: Vec<String> = HEADER_KEYS
        .iter()
        .filter_map(|(key, label)| meta.get(*key).map(|value| format!("# {label}: {value}")))
        .collect();

    output.push(body);
    output.join("\n")
}

// Could also collapse or drop fields.
fn item(name: String, cost: String, discount: String, tax: String) -> String {
    format!("{name}, {cost}, {discount}, {tax}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use costcocr_core::{write, Item, ItemList, Receipt};

    fn receipt_with(meta: &[(&str, &str)], items: Vec<Item>) -> Receipt {
        let meta = meta
            .iter()
            .map(|(k, v)| (k.to_string(), (*v).into()))
            .collect();
        Receipt::new(meta, ItemList::new(items)).unwrap()
    }

    #[test]
    fn test_worked_example() {
        let receipt = receipt_with(
            &[("store", "Costco"), ("date", "Jan 27th"), ("location", "Berkeley")],
            vec![
                Item::new("Food 1", 10.00, 2.35, 0.09).unwrap(),
                Item::new("Food 2", 20.00, 4.00, 0.09).unwrap(),
            ],
        );

        let out = write(&table(), &Variables::new(), &receipt).unwrap();
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
    fn test_absent_headers_are_skipped() {
        let receipt = receipt_with(
            &[("location", "Berkeley"), ("cashier", "Sam")],
            vec![Item::new("Yakisoba", 12.99, 0.0, 0.0).unwrap()],
        );

        let out = write(&table(), &Variables::new(), &receipt).unwrap();
        assert_eq!(out, "# Location: Berkeley\nYakisoba, 12.99, 0.0, 0.0");
    }

    #[test]
    fn test_no_metadata_prints_items_only() {
        let receipt = receipt_with(&[], vec![Item::new("Fuji Apples", 7.49, 0.0, 0.0).unwrap()]);

        let out = write(&table(), &Variables::new(), &receipt).unwrap();
        assert_eq!(out, "Fuji Apples, 7.49, 0.0, 0.0");
    }
}
