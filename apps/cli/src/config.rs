//! # CLI Configuration
//!
//! Settings for the `costcocr` binary, loaded from TOML and environment.
//!
//! ## Load Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   defaults ──► costcocr.toml ──► COSTCOCR_* env ──► CLI flags          │
//! │                                                                         │
//! │   Later sources override earlier ones. validate() runs last.           │
//! │                                                                         │
//! │   Default file location (directories::ProjectDirs):                     │
//! │     Linux:   ~/.config/costcocr/costcocr.toml                           │
//! │     macOS:   ~/Library/Application Support/com.costcocr.costcocr/...    │
//! │     Windows: %APPDATA%\costcocr\costcocr\config\costcocr.toml           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! CLI flags are applied by `commands::convert` on top of the loaded config,
//! and the result is validated again.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use costcocr_core::validation::validate_fraction;
use costcocr_core::ValidationError;
use costcocr_ingest::{UnknownCodePolicy, DEFAULT_CUTOFF};
use costcocr_writers::Format;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidValue(#[from] ValidationError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Output Format
// =============================================================================

/// What the CLI prints: a writer format, or the textual IR itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    /// `Receipt({...}, ItemList([...]))`, parseable by `costcocr render`.
    Ir,
}

impl OutputFormat {
    /// The writer behind this format, if any.
    pub fn writer_format(self) -> Option<Format> {
        match self {
            OutputFormat::Csv => Some(Format::Csv),
            OutputFormat::Json => Some(Format::Json),
            OutputFormat::Ir => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Ir => write!(f, "ir"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "ir" => Ok(OutputFormat::Ir),
            other => Err(format!(
                "Invalid output format: '{other}'. Valid options: csv, json, ir"
            )),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Metadata stamped on every converted receipt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiptSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// OCR ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSettings {
    /// Tax rate for lines marked taxable, as a fraction.
    #[serde(default)]
    pub tax_rate: f64,

    /// Minimum similarity for a fuzzy code match.
    #[serde(default = "default_match_cutoff")]
    pub match_cutoff: f64,

    #[serde(default)]
    pub unknown_codes: UnknownCodePolicy,
}

fn default_match_cutoff() -> f64 {
    DEFAULT_CUTOFF
}

impl Default for IngestSettings {
    fn default() -> Self {
        IngestSettings {
            tax_rate: 0.0,
            match_cutoff: default_match_cutoff(),
            unknown_codes: UnknownCodePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete CLI configuration.
///
/// ## Example Config File
/// ```toml
/// [receipt]
/// store = "Costco"
/// location = "Berkeley"
///
/// [ingest]
/// tax_rate = 0.09
/// match_cutoff = 0.6
/// unknown_codes = "keep"
///
/// [output]
/// format = "csv"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub receipt: ReceiptSettings,

    #[serde(default)]
    pub ingest: IngestSettings,

    #[serde(default)]
    pub output: OutputSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// An explicit `config_path` must exist; the default path is optional.
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> ConfigResult<Self> {
        info!(?path, "Loading config from file");

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_fraction("ingest.tax_rate", self.ingest.tax_rate)?;
        validate_fraction("ingest.match_cutoff", self.ingest.match_cutoff)?;
        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (the process environment in
    /// production, a map in tests).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(store) = lookup("COSTCOCR_STORE") {
            debug!(store = %store, "Overriding store from environment");
            self.receipt.store = Some(store);
        }

        if let Some(location) = lookup("COSTCOCR_LOCATION") {
            self.receipt.location = Some(location);
        }

        if let Some(rate) = lookup("COSTCOCR_TAX_RATE") {
            match rate.parse::<f64>() {
                Ok(r) => self.ingest.tax_rate = r,
                Err(_) => warn!(value = %rate, "Ignoring non-numeric COSTCOCR_TAX_RATE"),
            }
        }

        if let Some(cutoff) = lookup("COSTCOCR_MATCH_CUTOFF") {
            match cutoff.parse::<f64>() {
                Ok(c) => self.ingest.match_cutoff = c,
                Err(_) => warn!(value = %cutoff, "Ignoring non-numeric COSTCOCR_MATCH_CUTOFF"),
            }
        }

        if let Some(format) = lookup("COSTCOCR_FORMAT") {
            match format.parse() {
                Ok(parsed) => {
                    debug!(format = %format, "Overriding output format from environment");
                    self.output.format = parsed;
                }
                Err(e) => warn!("{e}"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "costcocr", "costcocr")
            .map(|dirs| dirs.config_dir().join("costcocr.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.ingest.tax_rate, 0.0);
        assert_eq!(config.ingest.match_cutoff, 0.6);
        assert_eq!(config.ingest.unknown_codes, UnknownCodePolicy::Keep);
        assert_eq!(config.output.format, OutputFormat::Csv);
        assert!(config.receipt.store.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_file() {
        let config = AppConfig::from_toml(
            r#"
            [receipt]
            store = "Costco"
            location = "Berkeley"

            [ingest]
            tax_rate = 0.09
            match_cutoff = 0.75
            unknown_codes = "reject"

            [output]
            format = "ir"
            "#,
        )
        .unwrap();

        assert_eq!(config.receipt.store.as_deref(), Some("Costco"));
        assert_eq!(config.receipt.location.as_deref(), Some("Berkeley"));
        assert_eq!(config.ingest.tax_rate, 0.09);
        assert_eq!(config.ingest.match_cutoff, 0.75);
        assert_eq!(config.ingest.unknown_codes, UnknownCodePolicy::Reject);
        assert_eq!(config.output.format, OutputFormat::Ir);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml("[ingest]\ntax_rate = 0.0725\n").unwrap();
        assert_eq!(config.ingest.tax_rate, 0.0725);
        assert_eq!(config.ingest.match_cutoff, 0.6);
        assert_eq!(config.output.format, OutputFormat::Csv);
    }

    #[test]
    fn test_unknown_enum_value_is_a_parse_error() {
        assert!(AppConfig::from_toml("[output]\nformat = \"xml\"\n").is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.ingest.tax_rate = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(ValidationError::OutOfRange { .. }))
        ));

        config.ingest.tax_rate = 0.09;
        config.ingest.match_cutoff = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("COSTCOCR_STORE", "Costco"),
            ("COSTCOCR_TAX_RATE", "0.09"),
            ("COSTCOCR_MATCH_CUTOFF", "not-a-number"),
            ("COSTCOCR_FORMAT", "json"),
        ]);

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.receipt.store.as_deref(), Some("Costco"));
        assert!(config.receipt.location.is_none());
        assert_eq!(config.ingest.tax_rate, 0.09);
        assert_eq!(config.ingest.match_cutoff, 0.6);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("ir".parse::<OutputFormat>().unwrap(), OutputFormat::Ir);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Ir.writer_format(), None);
        assert_eq!(OutputFormat::Json.writer_format(), Some(Format::Json));
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).unwrap();
        assert!(toml_str.contains("[ingest]"));
        assert!(toml_str.contains("[output]"));
    }
}
