//! # OCR Line Parser
//!
//! OCR output comes as one receipt line per text line, with columns split
//! by tabs. The layout is not fixed, so the parser reads columns from the
//! right:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  E  \t 1234567 \t KS SALMON \t 10.99 \t A                               │
//! │                     ▲            ▲       ▲                              │
//! │                     │            │       └── marker-only column         │
//! │                     │            └── amount: rightmost numeric column   │
//! │                     └── code: the column just before the amount         │
//! │                                                                         │
//! │  Markers (trailing the amount or alone in a later column):              │
//! │    A  → taxable charge                                                  │
//! │    -  → adjustment (instant savings, coupon) of the amount              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines without an amount or code (headers, totals with no code, noise)
//! are skipped.

use tracing::debug;

/// Trailing marker for an adjustment line.
pub const ADJUSTMENT_MARKER: char = '-';

/// Trailing marker for a taxable charge.
pub const TAXABLE_MARKER: char = 'A';

/// What a receipt line does to the running item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A purchased item.
    Charge { taxable: bool },
    /// A reduction applied to the preceding item.
    Adjustment,
}

/// One recognised receipt line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    /// 1-based line number in the OCR text.
    pub line_no: usize,
    pub code: String,
    pub amount: f64,
    pub kind: LineKind,
}

/// Parses a single OCR line. Returns `None` when the line holds no item.
///
/// ## Example
/// ```rust
/// use costcocr_ingest::ocr::{parse_line, LineKind};
///
/// let line = parse_line(1, "1234567\tKS SALMON\t10.99 A").unwrap();
/// assert_eq!(line.code, "KS SALMON");
/// assert_eq!(line.amount, 10.99);
/// assert_eq!(line.kind, LineKind::Charge { taxable: true });
///
/// assert!(parse_line(2, "SUBTOTAL").is_none());
/// ```
pub fn parse_line(line_no: usize, line: &str) -> Option<ParsedLine> {
    let columns: Vec<&str> = line.split('\t').map(str::trim).collect();

    // Marker seen in a marker-only column right of the amount.
    let mut trailing_marker = None;

    for idx in (0..columns.len()).rev() {
        let (value, marker) = strip_markers(columns[idx]);

        if value.is_empty() {
            trailing_marker = strongest(trailing_marker, marker);
            continue;
        }

        let Some(amount) = parse_amount(value) else {
            continue;
        };

        let code = idx.checked_sub(1).map(|i| columns[i]).unwrap_or("");
        if code.is_empty() {
            return None;
        }

        // A printed negative amount is a credit, same as a trailing '-'.
        let kind = if amount.is_sign_negative() {
            LineKind::Adjustment
        } else {
            match strongest(marker, trailing_marker) {
                Some(ADJUSTMENT_MARKER) => LineKind::Adjustment,
                Some(_) => LineKind::Charge { taxable: true },
                None => LineKind::Charge { taxable: false },
            }
        };

        return Some(ParsedLine {
            line_no,
            code: code.to_string(),
            amount: amount.abs(),
            kind,
        });
    }

    None
}

/// Parses every line of OCR text, skipping lines that hold no item.
pub fn parse_text(text: &str) -> Vec<ParsedLine> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| {
            let parsed = parse_line(idx + 1, line);
            if parsed.is_none() {
                debug!(line = idx + 1, text = line, "Skipping OCR line without an item");
            }
            parsed
        })
        .collect()
}

/// Peels every trailing marker ("3.00-A", "3.00 A -"). An adjustment
/// marker anywhere in the stack wins over the taxable one.
fn strip_markers(column: &str) -> (&str, Option<char>) {
    let mut rest = column;
    let mut found = None;

    while let Some(marker) = rest
        .chars()
        .next_back()
        .filter(|c| *c == ADJUSTMENT_MARKER || *c == TAXABLE_MARKER)
    {
        rest = rest[..rest.len() - marker.len_utf8()].trim_end();
        found = strongest(found, Some(marker));
    }

    (rest, found)
}

fn strongest(a: Option<char>, b: Option<char>) -> Option<char> {
    if a == Some(ADJUSTMENT_MARKER) || b == Some(ADJUSTMENT_MARKER) {
        Some(ADJUSTMENT_MARKER)
    } else {
        a.or(b)
    }
}

/// Accepts plain decimal amounts only ("10.99", "4", "-1.50").
/// The sign is kept; `parse_line` turns negatives into adjustments.
fn parse_amount(value: &str) -> Option<f64> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    let plain = !digits.is_empty()
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.');

    if plain {
        value.parse().ok()
    } else {
        None
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
