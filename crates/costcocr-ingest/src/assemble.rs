//! # Receipt Assembly
//!
//! Folds parsed OCR lines into a validated [`Receipt`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line 3  KS SALMON   10.99 A   ──► Item("Kirkland Salmon Slices",       │
//! │                                         10.99, 0.0, tax_rate)           │
//! │  line 4  /1234567     3.00 -   ──► cost of the item above -= 3.00       │
//! │  line 5  /1234567     1.00 -   ──► same item again -= 1.00              │
//! │  line 6  NAAN BREAD   4.99     ──► Item("Naan Bread", 4.99, 0.0, 0.0)   │
//! │                                                                         │
//! │  Adjustment before any item → OrphanAdjustment                          │
//! │  Cost pushed below zero     → InvalidItem                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use costcocr_core::amount::round_cents;
use costcocr_core::validation::validate_fraction;
use costcocr_core::{Item, ItemList, Metadata, Receipt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::codes::CodeBook;
use crate::error::{IngestError, IngestResult};
use crate::ocr::{parse_text, LineKind, ParsedLine};

// =============================================================================
// Unknown Code Policy
// =============================================================================

/// What to do with a code the code book cannot resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCodePolicy {
    /// Keep the raw code as the item name and log a warning.
    #[default]
    Keep,
    /// Fail with [`IngestError::UnknownCode`].
    Reject,
}

impl fmt::Display for UnknownCodePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownCodePolicy::Keep => write!(f, "keep"),
            UnknownCodePolicy::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for UnknownCodePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keep" => Ok(UnknownCodePolicy::Keep),
            "reject" => Ok(UnknownCodePolicy::Reject),
            other => Err(format!(
                "Invalid unknown code policy: '{other}'. Valid options: keep, reject"
            )),
        }
    }
}

// =============================================================================
// Assembler
// =============================================================================

/// Turns OCR text into a [`Receipt`].
///
/// ## Example
/// ```rust
/// use costcocr_core::Metadata;
/// use costcocr_ingest::{CodeBook, ReceiptAssembler};
///
/// let assembler = ReceiptAssembler::new(CodeBook::costco())
///     .with_tax_rate(0.09)
///     .unwrap();
///
/// let text = "111\tKS SALMON\t10.99 A\n222\t/111\t3.00-\n333\tNAAN BREAD\t4.99\n";
/// let receipt = assembler.assemble(text, Metadata::new()).unwrap();
///
/// let items = receipt.items();
/// assert_eq!(items.len(), 2);
/// assert_eq!(items.get(0).unwrap().name(), "Kirkland Salmon Slices");
/// assert_eq!(items.get(0).unwrap().cost(), 7.99);
/// assert_eq!(items.get(0).unwrap().tax(), 0.09);
/// assert_eq!(items.get(1).unwrap().tax(), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct ReceiptAssembler {
    codes: CodeBook,
    tax_rate: f64,
    unknown_codes: UnknownCodePolicy,
}

/// An item still open to adjustments.
struct PendingItem {
    line_no: usize,
    name: String,
    cost: f64,
    tax: f64,
}

impl ReceiptAssembler {
    pub fn new(codes: CodeBook) -> Self {
        ReceiptAssembler {
            codes,
            tax_rate: 0.0,
            unknown_codes: UnknownCodePolicy::default(),
        }
    }

    /// Tax rate applied to lines marked taxable. Must be within `0..=1`.
    pub fn with_tax_rate(mut self, tax_rate: f64) -> IngestResult<Self> {
        validate_fraction("tax_rate", tax_rate)?;
        self.tax_rate = tax_rate;
        Ok(self)
    }

    pub fn with_unknown_codes(mut self, policy: UnknownCodePolicy) -> Self {
        self.unknown_codes = policy;
        self
    }

    /// Parses `text` and builds a receipt carrying `meta`.
    pub fn assemble(&self, text: &str, meta: Metadata) -> IngestResult<Receipt> {
        let lines = parse_text(text);
        let items = self.items(&lines)?;

        info!(
            lines = lines.len(),
            items = items.len(),
            total = items.total(),
            "Assembled receipt"
        );

        Ok(Receipt::new(meta, items)?)
    }

    /// Builds the item list from already parsed lines.
    pub fn items(&self, lines: &[ParsedLine]) -> IngestResult<ItemList> {
        let mut pending: Vec<PendingItem> = Vec::new();

        for line in lines {
            match line.kind {
                LineKind::Charge { taxable } => {
                    pending.push(PendingItem {
                        line_no: line.line_no,
                        name: self.resolve(line)?,
                        cost: line.amount,
                        tax: if taxable { self.tax_rate } else { 0.0 },
                    });
                }
                LineKind::Adjustment => {
                    let target = pending
                        .last_mut()
                        .ok_or(IngestError::OrphanAdjustment { line: line.line_no })?;

                    debug!(
                        line = line.line_no,
                        item = %target.name,
                        amount = line.amount,
                        "Applying adjustment"
                    );
                    target.cost = round_cents(target.cost - line.amount);
                }
            }
        }

        pending
            .into_iter()
            .map(|p| {
                Item::new(p.name, p.cost, 0.0, p.tax).map_err(|source| IngestError::InvalidItem {
                    line: p.line_no,
                    source,
                })
            })
            .collect()
    }

    fn resolve(&self, line: &ParsedLine) -> IngestResult<String> {
        if let Some(found) = self.codes.best_match(&line.code) {
            debug!(
                line = line.line_no,
                code = %line.code,
                name = found.name,
                score = found.score,
                "Resolved receipt code"
            );
            return Ok(found.name.to_string());
        }

        match self.unknown_codes {
            UnknownCodePolicy::Keep => {
                warn!(line = line.line_no, code = %line.code, "Unknown receipt code, keeping it as the name");
                Ok(line.code.clone())
            }
            UnknownCodePolicy::Reject => Err(IngestError::UnknownCode {
                line: line.line_no,
                code: line.code.clone(),
            }),
        }
    }
}

impl Default for ReceiptAssembler {
    fn default() -> Self {
        ReceiptAssembler::new(CodeBook::costco())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
