//! # Ingest Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Ingest Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Line Structure │  │   Code Lookup   │  │     Validation          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │ OrphanAdjustment│  │  UnknownCode    │  │  InvalidItem            │ │
//! │  │                 │  │  (reject mode)  │  │  Validation             │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant that comes from a specific OCR line carries its 1-based
//! line number.

use costcocr_core::ValidationError;
use thiserror::Error;

/// Result type alias for ingest operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors raised while turning OCR text into a receipt.
#[derive(Debug, Error)]
pub enum IngestError {
    /// An adjustment line appeared before any charge line.
    #[error("Line {line}: adjustment has no preceding item")]
    OrphanAdjustment { line: usize },

    /// A code matched nothing in the code book (reject mode only).
    #[error("Line {line}: unknown receipt code '{code}'")]
    UnknownCode { line: usize, code: String },

    /// The line's values do not make a valid item.
    #[error("Line {line}: invalid item: {source}")]
    InvalidItem {
        line: usize,
        #[source]
        source: ValidationError,
    },

    /// Invalid assembler settings or receipt metadata.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}
