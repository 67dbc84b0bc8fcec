//! # costcocr
//!
//! Command-line front end: OCR text in, CSV / JSON / IR out.
//!
//! ## Commands
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  costcocr convert scan.txt --store Costco --to csv                      │
//! │      OCR text ──► ReceiptAssembler ──► Receipt ──► writer ──► stdout    │
//! │                                                                         │
//! │  costcocr render receipt.ir --to json                                   │
//! │      Receipt(...) text ──► parse ──► Receipt ──► writer ──► stdout      │
//! │                                                                         │
//! │  costcocr lookup "KS SALMN" "NAAN BRD"                                  │
//! │      code ──► CodeBook ──► canonical name                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logs go to stderr so stdout can be piped. Set `RUST_LOG` to change the
//! filter (default `warn,costcocr=info`).

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, OutputFormat};

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "costcocr")]
#[command(about = "Turn Costco receipt OCR output into CSV or JSON")]
#[command(version)]
struct Cli {
    /// Config file [default: platform config dir / costcocr.toml]
    #[arg(long, global = true, env = "COSTCOCR_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert OCR text into a receipt and render it
    #[command(after_help = "\
Examples:
  costcocr convert scan.txt --store Costco --location Berkeley
  tesseract receipt.png - | costcocr convert - --to json --tax-rate 0.0925")]
    Convert(ConvertArgs),

    /// Render receipts written in textual IR form
    Render(RenderArgs),

    /// Resolve receipt codes to item names
    Lookup {
        /// Codes as printed on the receipt
        #[arg(required = true)]
        codes: Vec<String>,
    },
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// OCR text file, or - for stdin
    input: PathBuf,

    #[arg(long)]
    store: Option<String>,

    #[arg(long)]
    location: Option<String>,

    /// Receipt date [default: today]
    #[arg(long, conflicts_with = "no_date")]
    date: Option<String>,

    /// Leave the date out of the metadata
    #[arg(long)]
    no_date: bool,

    /// Tax rate for taxable lines, as a fraction (0.0925)
    #[arg(long, value_name = "RATE")]
    tax_rate: Option<f64>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Files holding one Receipt(...) each, or - for stdin
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Output format: csv, json or ir
    #[arg(long = "to", short = 't', value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Variable passed to the writer (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    vars: Vec<(String, String)>,

    /// Write to a file instead of stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

// =============================================================================
// Entry Point
// =============================================================================

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Convert(args) => commands::convert(config, args),
        Command::Render(args) => commands::render(config, args),
        Command::Lookup { codes } => commands::lookup(&config, &codes),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,costcocr=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(
            parse_var("user=ryan").unwrap(),
            ("user".to_string(), "ryan".to_string())
        );
        assert_eq!(
            parse_var("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_var("empty=").unwrap().1, "");
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=value").is_err());
    }

    #[test]
    fn test_convert_arguments() {
        let cli = Cli::try_parse_from([
            "costcocr", "convert", "scan.txt", "--store", "Costco", "--tax-rate", "0.09",
            "--to", "json", "--var", "a=1", "--var", "b=2", "-o", "out.json",
        ])
        .unwrap();

        let Command::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.input, PathBuf::from("scan.txt"));
        assert_eq!(args.store.as_deref(), Some("Costco"));
        assert_eq!(args.tax_rate, Some(0.09));
        assert_eq!(args.output.format, Some(OutputFormat::Json));
        assert_eq!(args.output.vars.len(), 2);
        assert_eq!(args.output.output, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_date_conflicts_with_no_date() {
        let result = Cli::try_parse_from([
            "costcocr", "convert", "-", "--date", "Jan 27th", "--no-date",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_lookup_requires_codes() {
        assert!(Cli::try_parse_from(["costcocr", "lookup"]).is_err());
        assert!(Cli::try_parse_from(["costcocr", "lookup", "KS TUNA"]).is_ok());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["costcocr", "render", "r.ir", "--to", "xml"]).is_err());
    }
}
