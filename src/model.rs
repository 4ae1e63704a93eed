/// Core data types for the water-body severity engine.
///
/// This module defines the shared input model imported by all other
/// modules: the crowd-sourced `Report` and the error enums raised by the
/// surrounding operations (config loading, payload ingestion). The engine
/// itself never returns an error. It contains no logic, only types.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Moderation state of a report. Only `Verified` reports participate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Verified,
    #[default]
    Pending,
    Rejected,
}

/// A single crowd-sourced pollution observation for one water body.
///
/// Every numeric field is optional. The severity extractor and the weight
/// model fall through to their defaults when a field is absent or
/// non-finite, so a sparse report is still usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    /// Explicit severity percentage, 0-100.
    pub severity_percentage: Option<f64>,
    /// Raw pixel counts from the image segmentation step.
    pub polluted_pixels: Option<f64>,
    pub water_pixels: Option<f64>,
    /// Categorical labels, e.g. "High" or "critical pollution".
    pub ai_severity_label: Option<String>,
    pub user_severity_label: Option<String>,
    pub status: VerificationStatus,
    /// Model confidence, 0-100. Defaults to 50 when absent.
    pub ai_confidence: Option<f64>,
    /// Reports by the same submitter in the same locality. Defaults to 1.
    pub submitter_locality_reports: Option<u32>,
    pub submitted_at: String, // ISO 8601, e.g. "2024-05-01T12:00:00+00:00"
    /// Image quality score, 0-1. Defaults to 1 when absent.
    pub quality_score: Option<f64>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when loading engine configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io(std::io::Error),
    /// The file is not valid TOML for `EngineConfig`.
    Parse(String),
    /// A value parsed but is outside its allowed range.
    Invalid { field: &'static str, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "Config read error: {}", err),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Invalid { field, reason } => {
                write!(f, "Invalid config value for {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

/// Errors that can arise when parsing a report payload.
#[derive(Debug, PartialEq)]
pub enum IngestError {
    /// The payload is not a JSON array of objects.
    Parse(String),
    /// A report at the given position has no usable identifier.
    MissingField { index: usize, field: &'static str },
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::Parse(msg) => write!(f, "Parse error: {}", msg),
            IngestError::MissingField { index, field } => {
                write!(f, "Report {} is missing required field '{}'", index, field)
            }
        }
    }
}

impl std::error::Error for IngestError {}
