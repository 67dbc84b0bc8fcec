//! # costcocr-core: Receipt Intermediate Representation
//!
//! This crate is the **heart** of costcocr. It defines the receipt IR and the
//! generic writer that turns it into any output format, as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        costcocr Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/cli (costcocr binary)                   │   │
//! │  │        convert ──► render ──► lookup        config, logging     │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────┐   ┌───────────────▼───────────────┐   │
//! │  │  costcocr-ingest            │   │  costcocr-writers             │   │
//! │  │  OCR lines, code book       │   │  CSV, JSON tables             │   │
//! │  └──────────────┬──────────────┘   └───────────────┬───────────────┘   │
//! │                 │ Item::new / Receipt::new         │ ConversionTable    │
//! │  ┌──────────────▼──────────────────────────────────▼───────────────┐   │
//! │  │               ★ costcocr-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │  writer   │  │   repr    │  │ validation│   │   │
//! │  │   │  Receipt  │  │  write()  │  │ Display + │  │  amounts  │   │   │
//! │  │   │ ItemList  │  │  Node     │  │  FromStr  │  │   >= 0    │   │   │
//! │  │   │   Item    │  │           │  │           │  │           │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO LOGGING • NO MUTATION AFTER CONSTRUCTION          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Receipt, ItemList, Item, metadata
//! - [`writer`] - Conversion tables and the `write` traversal
//! - [`repr`] - Printable, re-parseable constructor-call form
//! - [`amount`] - Canonical number formatting
//! - [`validation`] - Amount checks shared by constructors
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use costcocr_core::writer::{write, ConversionTable, Variables};
//! use costcocr_core::{Item, ItemList, Metadata, Receipt};
//!
//! let mut meta = Metadata::new();
//! meta.insert("store".into(), "Costco".into());
//!
//! let receipt = Receipt::new(
//!     meta,
//!     ItemList::new(vec![Item::new("Food 1", 10.0, 2.35, 0.09).unwrap()]),
//! )
//! .unwrap();
//!
//! let table = ConversionTable::new()
//!     .receipt(|meta, body, _vars| format!("# Store: {}\n{body}", meta["store"]))
//!     .item_list(|s| s)
//!     .item_list_sep(|| "\n".to_string())
//!     .item(|name, cost, discount, tax| format!("{name}, {cost}, {discount}, {tax}"));
//!
//! let out = write(&table, &Variables::new(), &receipt).unwrap();
//! assert_eq!(out, "# Store: Costco\nFood 1, 10.0, 2.35, 0.09");
//!
//! // The printed form parses back to an equal receipt.
//! assert_eq!(receipt.to_string().parse::<Receipt>().unwrap(), receipt);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod amount;
pub mod error;
pub mod repr;
pub mod types;
pub mod validation;
pub mod writer;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ReprError, Role, ValidationError, WriteError};
pub use types::*;
pub use writer::{write, writer, ConfiguredWriter, ConversionTable, FieldConverters, Node, Variables};
