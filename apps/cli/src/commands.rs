//! Subcommand implementations.
//!
//! Every command reads its input, builds receipts through the library
//! crates, and hands the rendered text to [`emit`]. No command touches the
//! filesystem except through [`read_input`] and [`emit`].

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use costcocr_core::{MetaValue, Metadata, Receipt, Variables};
use costcocr_ingest::{CodeBook, ReceiptAssembler};
use costcocr_writers::render_all;
use tracing::{info, warn};

use crate::config::{AppConfig, OutputFormat};
use crate::{ConvertArgs, OutputArgs, RenderArgs};

// =============================================================================
// convert
// =============================================================================

pub fn convert(mut config: AppConfig, args: ConvertArgs) -> Result<()> {
    if let Some(rate) = args.tax_rate {
        config.ingest.tax_rate = rate;
    }
    config.validate()?;

    let assembler = ReceiptAssembler::new(
        CodeBook::costco().with_cutoff(config.ingest.match_cutoff),
    )
    .with_tax_rate(config.ingest.tax_rate)?
    .with_unknown_codes(config.ingest.unknown_codes);

    let text = read_input(&args.input)?;
    let meta = metadata(&config, &args);

    let receipt = assembler
        .assemble(&text, meta)
        .with_context(|| format!("Failed to assemble receipt from {}", args.input.display()))?;

    info!(
        items = receipt.items().len(),
        total = receipt.total(),
        "Converted receipt"
    );

    emit(&config, &args.output, &[receipt])
}

/// Receipt metadata from flags, falling back to config.
fn metadata(config: &AppConfig, args: &ConvertArgs) -> Metadata {
    let mut meta = Metadata::new();

    let store = args.store.clone().or_else(|| config.receipt.store.clone());
    let location = args.location.clone().or_else(|| config.receipt.location.clone());
    let date = match (&args.date, args.no_date) {
        (Some(date), _) => Some(date.clone()),
        (None, false) => Some(today()),
        (None, true) => None,
    };

    for (key, value) in [("store", store), ("date", date), ("location", location)] {
        if let Some(value) = value {
            meta.insert(key.to_string(), MetaValue::Text(value));
        }
    }

    meta
}

fn today() -> String {
    chrono::Local::now().format("%b %-d, %Y").to_string()
}

// =============================================================================
// render
// =============================================================================

pub fn render(config: AppConfig, args: RenderArgs) -> Result<()> {
    let receipts = args
        .inputs
        .iter()
        .map(|path| {
            let text = read_input(path)?;
            text.trim()
                .parse::<Receipt>()
                .with_context(|| format!("Failed to parse receipt in {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    emit(&config, &args.output, &receipts)
}

// =============================================================================
// lookup
// =============================================================================

pub fn lookup(config: &AppConfig, codes: &[String]) -> Result<()> {
    let book = CodeBook::costco().with_cutoff(config.ingest.match_cutoff);

    for code in codes {
        match book.best_match(code) {
            Some(found) => println!("{code}\t{}\t{:.2}", found.name, found.score),
            None => {
                warn!(code = %code, "No matching item");
                println!("{code}\t-");
            }
        }
    }

    Ok(())
}

// =============================================================================
// I/O
// =============================================================================

/// Reads a file, or stdin for `-`.
fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Renders receipts and writes them to the output file or stdout.
fn emit(config: &AppConfig, args: &OutputArgs, receipts: &[Receipt]) -> Result<()> {
    let format = args.format.unwrap_or(config.output.format);
    let variables: Variables = args.vars.iter().cloned().collect();

    let text = format_receipts(format, &variables, receipts)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{text}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), %format, "Wrote output");
        }
        None => println!("{text}"),
    }

    Ok(())
}

/// One rendered receipt per line block. JSON output is one object per line.
fn format_receipts(format: OutputFormat, variables: &Variables, receipts: &[Receipt]) -> Result<String> {
    let rendered = match format.writer_format() {
        Some(writer_format) => render_all(writer_format, variables, receipts)?,
        None => {
            if !variables.is_empty() {
                warn!("Variables are ignored for ir output");
            }
            receipts.iter().map(Receipt::to_string).collect()
        }
    };

    Ok(rendered.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use costcocr_core::{Item, ItemList};
    use std::path::PathBuf;

    fn convert_args(date: Option<&str>, no_date: bool) -> ConvertArgs {
        ConvertArgs {
            input: PathBuf::from("-"),
            store: Some("Costco".to_string()),
            location: None,
            date: date.map(str::to_string),
            no_date,
            tax_rate: None,
            output: OutputArgs {
                format: None,
                vars: Vec::new(),
                output: None,
            },
        }
    }

    fn sample_receipt() -> Receipt {
        let mut meta = Metadata::new();
        meta.insert("store".into(), "Costco".into());
        Receipt::new(
            meta,
            ItemList::new(vec![Item::new("Naan Bread", 4.99, 0.0, 0.0).unwrap()]),
        )
        .unwrap()
    }

    #[test]
    fn test_metadata_prefers_flags_over_config() {
        let mut config = AppConfig::default();
        config.receipt.store = Some("Other".to_string());
        config.receipt.location = Some("Berkeley".to_string());

        let meta = metadata(&config, &convert_args(Some("Jan 27th"), false));

        assert_eq!(meta.get("store").and_then(MetaValue::as_str), Some("Costco"));
        assert_eq!(meta.get("location").and_then(MetaValue::as_str), Some("Berkeley"));
        assert_eq!(meta.get("date").and_then(MetaValue::as_str), Some("Jan 27th"));
    }

    #[test]
    fn test_metadata_date_defaults_to_today() {
        let config = AppConfig::default();

        let meta = metadata(&config, &convert_args(None, false));
        assert_eq!(meta.get("date").and_then(MetaValue::as_str), Some(today().as_str()));

        let meta = metadata(&config, &convert_args(None, true));
        assert!(!meta.contains_key("date"));
    }

    #[test]
    fn test_format_receipts_csv() {
        let out = format_receipts(OutputFormat::Csv, &Variables::new(), &[sample_receipt()]).unwrap();
        assert_eq!(out, "# Store: Costco\nNaan Bread, 4.99, 0.0, 0.0");
    }

    #[test]
    fn test_format_receipts_ir_round_trips() {
        let receipt = sample_receipt();
        let out = format_receipts(OutputFormat::Ir, &Variables::new(), &[receipt.clone()]).unwrap();
        assert_eq!(out.parse::<Receipt>().unwrap(), receipt);
    }

    #[test]
    fn test_format_receipts_json_one_per_line() {
        let receipts = [sample_receipt(), sample_receipt()];
        let out = format_receipts(OutputFormat::Json, &Variables::new(), &receipts).unwrap();
        assert_eq!(out.lines().count(), 2);
    }
}
