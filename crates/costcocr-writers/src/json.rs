//! # JSON Writer
//!
//! Renders a receipt as one JSON object:
//!
//! ```json
//! {"meta":{"store":"Costco"},"variables":{},"items":[
//!   {"name":"Food 1","cost":10.0,"discount":2.35,"tax":0.09}
//! ]}
//! ```
//!
//! Amounts stay `f64` through the field converters so they land in the
//! output as JSON numbers, not strings.

use costcocr_core::{ConversionTable, FieldConverters, Metadata, Variables};
use serde_json::json;

/// Builds the JSON conversion table.
pub fn table() -> ConversionTable<String, f64, f64, f64> {
    let fields = FieldConverters::new()
        .cost(|n| n)
        .discount(|n| n)
        .tax(|n| n);

    ConversionTable::with_fields(fields)
        .receipt(receipt)
        .item_list(|items| format!("[{items}]"))
        .item_list_sep(|| ",".to_string())
        .item(item)
}

fn receipt(meta: &Metadata, body: String, variables: &Variables) -> String {
    // `body` is already a rendered JSON array.
    format!(
        r#"{{"meta":{},"variables":{},"items":{body}}}"#,
        json!(meta),
        json!(variables)
    )
}

fn item(name: String, cost: f64, discount: f64, tax: f64) -> String {
    json!({
        "name": name,
        "cost": cost,
        "discount": discount,
        "tax": tax,
    })
    .to_string()
}
