//! # Textual Round-Trip Form
//!
//! Every IR type prints as the constructor call that rebuilds it, and parses
//! back from that text.
//!
//! ## Format
//! ```text
//! Receipt({"date": "Jan 27th", "store": "Costco"}, ItemList([
//!     Item("Food 1", 10.0, 2.35, 0.09),
//!     Item("Food 2", 20.0, 4.0, 0.09)]))
//!
//! receipt   := "Receipt" "(" metadata "," itemlist ")"
//! itemlist  := "ItemList" "(" "[" [ item { "," item } [","] ] "]" ")"
//! item      := "Item" "(" string "," number "," number "," number ")"
//! metadata  := "{" [ string ":" value { "," string ":" value } [","] ] "}"
//! value     := string | number | "true" | "false"
//! ```
//!
//! Whitespace (including newlines) is allowed between any two tokens, so
//! hand-indented receipts parse too.
//!
//! ## Parse Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   text ──► nom grammar ──► Raw* values ──► Item::new / Receipt::new     │
//! │              │                                   │                      │
//! │              ▼                                   ▼                      │
//! │      ReprError::Syntax              ReprError::Invalid(ValidationError) │
//! │                                                                         │
//! │   No value is ever built without going through the constructors.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use costcocr_core::Item;
//!
//! let item = Item::new("Food 1", 10.0, 2.35, 0.09).unwrap();
//! let text = item.to_string();
//! assert_eq!(text, r#"Item("Food 1", 10.0, 2.35, 0.09)"#);
//! assert_eq!(text.parse::<Item>().unwrap(), item);
//! ```

use std::fmt;
use std::str::FromStr;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, multispace0, none_of},
    combinator::{opt, recognize, value},
    multi::{many0, separated_list0},
    number::complete::double,
    sequence::{delimited, preceded},
};

use crate::amount::format_amount;
use crate::error::{ReprError, ValidationError};
use crate::types::{Item, ItemList, MetaValue, Metadata, Receipt};

// =============================================================================
// Printing
// =============================================================================

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

fn write_meta_value(f: &mut fmt::Formatter<'_>, value: &MetaValue) -> fmt::Result {
    match value {
        MetaValue::Text(s) => write_quoted(f, s),
        other => write!(f, "{other}"),
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Item(")?;
        write_quoted(f, self.name())?;
        write!(
            f,
            ", {}, {}, {})",
            format_amount(self.cost()),
            format_amount(self.discount()),
            format_amount(self.tax())
        )
    }
}

impl fmt::Display for ItemList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ItemList([")?;
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str("])")
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Receipt({")?;
        for (i, (key, value)) in self.meta().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_quoted(f, key)?;
            f.write_str(": ")?;
            write_meta_value(f, value)?;
        }
        write!(f, "}}, {})", self.items())
    }
}

// =============================================================================
// Grammar
// =============================================================================

struct RawItem {
    name: String,
    cost: f64,
    discount: f64,
    tax: f64,
}

impl RawItem {
    fn build(self) -> Result<Item, ValidationError> {
        Item::new(self.name, self.cost, self.discount, self.tax)
    }
}

struct RawReceipt {
    meta: Metadata,
    items: Vec<RawItem>,
}

fn build_items(raw: Vec<RawItem>) -> Result<ItemList, ValidationError> {
    raw.into_iter().map(RawItem::build).collect()
}

/// A single-character token, with leading whitespace skipped.
fn symbol(c: char) -> impl Fn(&str) -> IResult<&str, char> {
    move |input| preceded(multispace0, char(c)).parse(input)
}

fn keyword(word: &'static str) -> impl Fn(&str) -> IResult<&str, &str> {
    move |input| preceded(multispace0, tag(word)).parse(input)
}

fn escaped_char(input: &str) -> IResult<&str, char> {
    preceded(
        char('\\'),
        alt((
            value('"', char('"')),
            value('\\', char('\\')),
            value('\n', char('n')),
            value('\t', char('t')),
            value('\r', char('r')),
        )),
    )
    .parse(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    preceded(
        multispace0,
        delimited(char('"'), many0(alt((none_of("\\\""), escaped_char))), char('"')),
    )
    .map(|chars| chars.into_iter().collect())
    .parse(input)
}

fn number(input: &str) -> IResult<&str, f64> {
    preceded(multispace0, double).parse(input)
}

fn item(input: &str) -> IResult<&str, RawItem> {
    let (input, _) = keyword("Item").parse(input)?;
    let (input, _) = symbol('(').parse(input)?;
    let (input, name) = string_literal(input)?;
    let (input, _) = symbol(',').parse(input)?;
    let (input, cost) = number(input)?;
    let (input, _) = symbol(',').parse(input)?;
    let (input, discount) = number(input)?;
    let (input, _) = symbol(',').parse(input)?;
    let (input, tax) = number(input)?;
    let (input, _) = symbol(')').parse(input)?;

    Ok((
        input,
        RawItem {
            name,
            cost,
            discount,
            tax,
        },
    ))
}

/// Skips a trailing comma, allowed only after at least one element.
fn trailing_comma(input: &str, allowed: bool) -> IResult<&str, ()> {
    if !allowed {
        return Ok((input, ()));
    }
    let (input, _) = opt(symbol(',')).parse(input)?;
    Ok((input, ()))
}

fn item_list(input: &str) -> IResult<&str, Vec<RawItem>> {
    let (input, _) = keyword("ItemList").parse(input)?;
    let (input, _) = symbol('(').parse(input)?;
    let (input, _) = symbol('[').parse(input)?;
    let (input, items) = separated_list0(symbol(','), item).parse(input)?;
    let (input, _) = trailing_comma(input, !items.is_empty())?;
    let (input, _) = symbol(']').parse(input)?;
    let (input, _) = symbol(')').parse(input)?;
    Ok((input, items))
}

fn meta_number(input: &str) -> IResult<&str, MetaValue> {
    let (rest, text) = recognize(number).parse(input)?;
    let value = match text.trim_start().parse::<i64>() {
        Ok(n) => MetaValue::Integer(n),
        Err(_) => MetaValue::Float(number(text)?.1),
    };
    Ok((rest, value))
}

fn meta_value(input: &str) -> IResult<&str, MetaValue> {
    alt((
        string_literal.map(MetaValue::Text),
        value(MetaValue::Bool(true), keyword("true")),
        value(MetaValue::Bool(false), keyword("false")),
        meta_number,
    ))
    .parse(input)
}

fn meta_entry(input: &str) -> IResult<&str, (String, MetaValue)> {
    let (input, key) = string_literal(input)?;
    let (input, _) = symbol(':').parse(input)?;
    let (input, value) = meta_value(input)?;
    Ok((input, (key, value)))
}

fn metadata(input: &str) -> IResult<&str, Metadata> {
    let (input, _) = symbol('{').parse(input)?;
    let (input, entries) = separated_list0(symbol(','), meta_entry).parse(input)?;
    let (input, _) = trailing_comma(input, !entries.is_empty())?;
    let (input, _) = symbol('}').parse(input)?;
    Ok((input, entries.into_iter().collect()))
}

fn receipt(input: &str) -> IResult<&str, RawReceipt> {
    let (input, _) = keyword("Receipt").parse(input)?;
    let (input, _) = symbol('(').parse(input)?;
    let (input, meta) = metadata(input)?;
    let (input, _) = symbol(',').parse(input)?;
    let (input, items) = item_list(input)?;
    let (input, _) = symbol(')').parse(input)?;
    Ok((input, RawReceipt { meta, items }))
}

// =============================================================================
// Entry Points
// =============================================================================

/// Runs `parser` over the whole of `source`, allowing trailing whitespace.
fn parse_complete<T>(
    source: &str,
    parser: fn(&str) -> IResult<&str, T>,
) -> Result<T, ReprError> {
    match parser(source) {
        Ok((rest, parsed)) => {
            let rest = rest.trim_start();
            if rest.is_empty() {
                Ok(parsed)
            } else {
                Err(ReprError::TrailingInput {
                    offset: source.len() - rest.len(),
                })
            }
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(ReprError::Syntax {
            offset: source.len() - e.input.len(),
            expected: e.code.description().to_string(),
        }),
        Err(nom::Err::Incomplete(_)) => Err(ReprError::Syntax {
            offset: source.len(),
            expected: "more input".to_string(),
        }),
    }
}

impl FromStr for Item {
    type Err = ReprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_complete(s, item)?.build()?)
    }
}

impl FromStr for ItemList {
    type Err = ReprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(build_items(parse_complete(s, item_list)?)?)
    }
}

impl FromStr for Receipt {
    type Err = ReprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = parse_complete(s, receipt)?;
        let items = build_items(raw.items)?;
        Ok(Receipt::new(raw.meta, items)?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
