//! # Validation Module
//!
//! Input validation for IR construction.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Rust types                                                   │
//! │  ├── name is a String, items are Items, meta is a map                  │
//! │  └── Wrong-typed containers cannot be expressed at all                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Amounts must be finite numbers                                    │
//! │  └── Amounts must be >= 0                                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Constructors (Item::new, Receipt::new)                       │
//! │  └── Run every check before building anything                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use costcocr_core::validation::{validate_amount, validate_fraction};
//!
//! assert!(validate_amount("cost", 10.0).is_ok());
//! assert!(validate_amount("cost", -0.01).is_err());
//! assert!(validate_fraction("tax_rate", 0.09).is_ok());
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a finite number.
///
/// ## Rules
/// - NaN and both infinities are rejected
pub fn validate_finite(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotANumber {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates an item amount (cost, discount or tax).
///
/// ## Rules
/// - Must be a finite number
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items, no discount, untaxed)
///
/// ## Example
/// ```rust
/// use costcocr_core::validation::validate_amount;
///
/// assert!(validate_amount("cost", 10.99).is_ok());
/// assert!(validate_amount("discount", 0.0).is_ok());
/// assert!(validate_amount("tax", f64::NAN).is_err());
/// ```
pub fn validate_amount(field: &str, value: f64) -> ValidationResult<()> {
    validate_finite(field, value)?;

    // -0.0 compares equal to 0.0 and is accepted.
    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }

    Ok(())
}

/// Validates a rate expressed as a fraction in `0.0..=1.0`.
///
/// Used for configured tax rates and match cutoffs. Item taxes are only
/// required to be non-negative.
pub fn validate_fraction(field: &str, value: f64) -> ValidationResult<()> {
    validate_amount(field, value)?;

    if value > 1.0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: 1.0,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("cost", 0.0).is_ok());
        assert!(validate_amount("cost", -0.0).is_ok());
        assert!(validate_amount("cost", 1099.5).is_ok());

        assert!(matches!(
            validate_amount("cost", -1.0),
            Err(ValidationError::Negative { .. })
        ));
        assert!(matches!(
            validate_amount("cost", f64::INFINITY),
            Err(ValidationError::NotANumber { .. })
        ));
    }

    #[test]
    fn test_validate_fraction() {
        assert!(validate_fraction("tax_rate", 0.0).is_ok());
        assert!(validate_fraction("tax_rate", 1.0).is_ok());
        assert!(validate_fraction("tax_rate", 1.01).is_err());
        assert!(validate_fraction("tax_rate", -0.1).is_err());
    }

    #[test]
    fn test_error_names_field() {
        let err = validate_amount("discount", -2.0).unwrap_err();
        assert_eq!(err.to_string(), "discount must be positive, got -2");
    }
}
