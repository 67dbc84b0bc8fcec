//! # costcocr-ingest: OCR Text to Receipt
//!
//! Builds the receipt IR from raw OCR output.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  "123\tKS SALMN\t10.99 A"                                               │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  ┌───────────────┐   ParsedLine { code: "KS SALMN", amount: 10.99,     │
//! │  │ ocr.rs        │──►             kind: Charge { taxable: true } }      │
//! │  └───────────────┘                                                      │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  ┌───────────────┐   ┌───────────────┐                                  │
//! │  │ assemble.rs   │──►│ codes.rs      │  "KS SALMN" → "Kirkland Salmon  │
//! │  │               │   │ CodeBook      │               Slices"           │
//! │  └───────────────┘   └───────────────┘                                  │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  Receipt(meta, ItemList([Item("Kirkland Salmon Slices", ...)]))         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod assemble;
pub mod codes;
pub mod error;
pub mod ocr;

pub use assemble::{ReceiptAssembler, UnknownCodePolicy};
pub use codes::{CodeBook, CodeMatch, DEFAULT_CUTOFF};
pub use error::{IngestError, IngestResult};
pub use ocr::{parse_line, parse_text, LineKind, ParsedLine};
