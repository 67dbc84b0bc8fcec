//! # Amount Formatting
//!
//! Canonical text form for the real numbers carried by receipt items.
//!
//! ## Why a Canonical Form?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE SAME NUMBER MUST ALWAYS PRINT THE SAME WAY                         │
//! │                                                                         │
//! │  Writers:   Cost(10.0)  → "10.0"   (default field converter)           │
//! │  Repr:      Item("Food", 10.0, ...) must parse back to 10.0            │
//! │                                                                         │
//! │  `{}`  prints 10.0 as "10"   ← loses the "this is a real" marker       │
//! │  `{:?}` prints 10.0 as "10.0", 2.35 as "2.35", 0.09 as "0.09"          │
//! │                                                                         │
//! │  Shortest round-trip digits, always with a fractional part             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use costcocr_core::amount::format_amount;
//!
//! assert_eq!(format_amount(10.0), "10.0");
//! assert_eq!(format_amount(2.35), "2.35");
//! assert_eq!(format_amount(0.09), "0.09");
//! ```

/// Formats a number in its canonical text form.
///
/// The output is the shortest decimal that parses back to exactly the same
/// `f64`, with a `.0` suffix for integral values.
pub fn format_amount(value: f64) -> String {
    format!("{value:?}")
}

/// Rounds a value to whole cents, half away from zero.
///
/// ## Example
/// ```rust
/// use costcocr_core::amount::round_cents;
///
/// // 10.00 * 1.09 - 2.35
/// assert_eq!(round_cents(8.550000000000002), 8.55);
/// ```
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Unit Tests
// =============================================================================
