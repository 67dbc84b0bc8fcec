//! # Error Types
//!
//! Domain-specific error types for costcocr-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  costcocr-core errors (this file)                                      │
//! │  ├── CoreError        - Umbrella for everything below                  │
//! │  ├── ValidationError  - Item/Receipt construction failures             │
//! │  ├── WriteError       - Conversion table is incomplete                 │
//! │  └── ReprError        - Textual form could not be parsed back          │
//! │                                                                         │
//! │  costcocr-ingest errors (separate crate)                               │
//! │  └── IngestError      - OCR text could not become a Receipt            │
//! │                                                                         │
//! │  Flow: ValidationError → IngestError / ReprError → anyhow (CLI)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, offending value)
//! 3. Errors are enum variants, never String
//! 4. Construction never half-succeeds: an error means no value exists

use std::fmt;

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Any failure raised by the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An IR node could not be constructed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A conversion table was missing required entries.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// A textual receipt could not be parsed.
    #[error(transparent)]
    Repr(#[from] ReprError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Construction-time validation errors.
///
/// Raised by `Item::new` and `Receipt::new` before any value is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Numeric value is NaN or infinite.
    #[error("{field} must be a number")]
    NotANumber { field: String },

    /// Numeric value is below zero.
    #[error("{field} must be positive, got {value}")]
    Negative { field: String, value: f64 },

    /// Numeric value is outside an allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },
}

// =============================================================================
// Write Error
// =============================================================================

/// The roles a conversion table must fill.
///
/// The field converters (`Name`, `Cost`, `Discount`, `Tax`) always have
/// defaults, so they never show up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Receipt,
    ItemList,
    ItemListSep,
    Item,
}

impl Role {
    /// Roles every conversion table must provide, in reporting order.
    pub const REQUIRED: [Role; 4] = [Role::Receipt, Role::ItemList, Role::ItemListSep, Role::Item];

    /// Returns the role name as used in error messages.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Receipt => "Receipt",
            Role::ItemList => "ItemList",
            Role::ItemListSep => "ItemListSep",
            Role::Item => "Item",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration errors raised by `write` before any node is visited.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// One or more required conversion functions were not supplied.
    #[error("Missing conversion functions: {}", join_roles(.0))]
    MissingConversions(Vec<Role>),
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Repr Error
// =============================================================================

/// Errors raised while parsing the textual receipt form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReprError {
    /// The input does not follow the constructor-call grammar.
    #[error("Syntax error at offset {offset}: expected {expected}")]
    Syntax { offset: usize, expected: String },

    /// A complete value was parsed but input remains.
    #[error("Unexpected trailing input at offset {offset}")]
    TrailingInput { offset: usize },

    /// The input is well-formed but describes an invalid value.
    #[error("Invalid value: {0}")]
    Invalid(#[from] ValidationError),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Negative {
            field: "cost".to_string(),
            value: -1.5,
        };
        assert_eq!(err.to_string(), "cost must be positive, got -1.5");

        let err = ValidationError::NotANumber {
            field: "tax".to_string(),
        };
        assert_eq!(err.to_string(), "tax must be a number");
    }

    #[test]
    fn test_missing_conversions_message_names_roles() {
        let err = WriteError::MissingConversions(vec![Role::ItemListSep]);
        assert_eq!(err.to_string(), "Missing conversion functions: ItemListSep");

        let err = WriteError::MissingConversions(vec![Role::Receipt, Role::Item]);
        assert_eq!(err.to_string(), "Missing conversion functions: Receipt, Item");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::NotANumber {
            field: "cost".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
