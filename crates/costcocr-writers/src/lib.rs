//! # costcocr-writers: Output Formats
//!
//! Concrete conversion tables for the generic writer in `costcocr-core`.
//!
//! ## Writers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Receipt ──► costcocr_core::write(table, variables, receipt)          │
//! │                          │                                              │
//! │            ┌─────────────┴─────────────┐                                │
//! │            ▼                           ▼                                │
//! │     csv::table()                json::table()                           │
//! │     Item(String, String,        Item(String, f64,                       │
//! │          String, String)             f64, f64)                          │
//! │                                                                         │
//! │   Each table picks its own field types; the core never knows which.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use costcocr_core::{Item, ItemList, Metadata, Receipt, Variables};
//! use costcocr_writers::{render, Format};
//!
//! let receipt = Receipt::new(
//!     Metadata::new(),
//!     ItemList::new(vec![Item::new("Naan Bread", 4.99, 0.0, 0.0).unwrap()]),
//! )
//! .unwrap();
//!
//! let format: Format = "csv".parse().unwrap();
//! let out = render(format, &Variables::new(), &receipt).unwrap();
//! assert_eq!(out, "Naan Bread, 4.99, 0.0, 0.0");
//! ```

pub mod csv;
pub mod json;

use std::fmt;
use std::str::FromStr;

use costcocr_core::{write, writer, Receipt, Variables, WriteError};
use thiserror::Error;
use tracing::debug;

// =============================================================================
// Format
// =============================================================================

/// Output formats with a built-in conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Csv,
    Json,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Csv => write!(f, "csv"),
            Format::Json => write!(f, "json"),
        }
    }
}

/// Unknown format name.
#[derive(Debug, Error)]
#[error("Unknown output format: '{0}'. Valid options: csv, json")]
pub struct UnknownFormat(pub String);

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Renders one receipt in `format`.
pub fn render(format: Format, variables: &Variables, receipt: &Receipt) -> Result<String, WriteError> {
    debug!(%format, items = receipt.items().len(), "Rendering receipt");

    match format {
        Format::Csv => write(&csv::table(), variables, receipt),
        Format::Json => write(&json::table(), variables, receipt),
    }
}

/// Renders many receipts through one configured writer.
pub fn render_all(
    format: Format,
    variables: &Variables,
    receipts: &[Receipt],
) -> Result<Vec<String>, WriteError> {
    debug!(%format, receipts = receipts.len(), "Rendering receipts");

    match format {
        Format::Csv => {
            let table = csv::table();
            let configured = writer(&table, variables)?;
            Ok(receipts.iter().map(|r| configured.write(r)).collect())
        }
        Format::Json => {
            let table = json::table();
            let configured = writer(&table, variables)?;
            Ok(receipts.iter().map(|r| configured.write(r)).collect())
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
