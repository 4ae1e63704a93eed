//! Engine configuration.
//!
//! The three tuning parameters (κ, α, δ) are selectable per call; the grid
//! resolutions are exposed here so the display layer and the engine agree
//! on them. Configuration is read from TOML, every section optional. A
//! partial file overrides only the values it names.
//!
//! ```toml
//! [tuning]
//! kappa = 20.0
//! alpha = 0.7
//! delta = 10.0
//!
//! [grid]
//! histogram_bins = 20
//! kde_points = 500
//! bandwidth = 8.0
//!
//! [logging]
//! level = "info"
//! timestamps = true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::logging::{self, LogLevel, Stage};
use crate::model::ConfigError;

/// Environment variable naming the config file read by `EngineConfig::from_env`.
pub const CONFIG_PATH_ENV: &str = "WBSI_CONFIG";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Per-call tuning parameters, echoed back in every result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningParams {
    /// Shrinkage strength: factor = n / (n + kappa).
    pub kappa: f64,
    /// Blend between modal severity and consensus in `wbsi_consensus`.
    pub alpha: f64,
    /// Consensus tolerance around the modal severity.
    pub delta: f64,
}

impl Default for TuningParams {
    fn default() -> Self {
        Self {
            kappa: 20.0,
            alpha: 0.7,
            delta: 10.0,
        }
    }
}

/// Histogram and KDE resolutions over the [0, 100] severity domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub histogram_bins: usize,
    pub kde_points: usize,
    /// Gaussian kernel bandwidth in severity units.
    pub bandwidth: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            histogram_bins: 20,
            kde_points: 500,
            bandwidth: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tuning: TuningParams,
    pub grid: GridConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let loaded = fs::read_to_string(path)
            .map_err(ConfigError::from)
            .and_then(|contents| Self::from_toml_str(&contents));

        match &loaded {
            Ok(_) => logging::debug(
                Stage::Config,
                None,
                &format!("Loaded config from {}", path.display()),
            ),
            Err(e) => logging::error(
                Stage::Config,
                None,
                &format!("Failed to load config from {}: {}", path.display(), e),
            ),
        }
        loaded
    }

    /// Loads `.env` if present, then the file named by `WBSI_CONFIG`.
    /// An unset variable yields the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load(Path::new(path.trim())),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tuning.validate()?;
        self.grid.validate()?;
        if LogLevel::parse(&self.logging.level).is_none() {
            return Err(ConfigError::Invalid {
                field: "logging.level",
                reason: format!("unknown level '{}'", self.logging.level),
            });
        }
        Ok(())
    }
}

impl TuningParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(kappa_valid(self.kappa), "tuning.kappa", || {
            format!("must be a positive number, got {}", self.kappa)
        })?;
        require(alpha_valid(self.alpha), "tuning.alpha", || {
            format!("must be within [0, 1], got {}", self.alpha)
        })?;
        require(delta_valid(self.delta), "tuning.delta", || {
            format!("must be a positive number, got {}", self.delta)
        })
    }

    /// Copy with every non-finite or out-of-range field replaced by its
    /// default. Per-call parameters go through this instead of `validate`
    /// because the engine never fails.
    pub fn sanitized(&self) -> TuningParams {
        let defaults = TuningParams::default();
        TuningParams {
            kappa: checked("tuning.kappa", self.kappa, defaults.kappa, kappa_valid),
            alpha: checked("tuning.alpha", self.alpha, defaults.alpha, alpha_valid),
            delta: checked("tuning.delta", self.delta, defaults.delta, delta_valid),
        }
    }
}

fn kappa_valid(kappa: f64) -> bool {
    kappa.is_finite() && kappa > 0.0
}

fn alpha_valid(alpha: f64) -> bool {
    alpha.is_finite() && (0.0..=1.0).contains(&alpha)
}

fn delta_valid(delta: f64) -> bool {
    delta.is_finite() && delta > 0.0
}

fn checked(field: &str, value: f64, default: f64, valid: fn(f64) -> bool) -> f64 {
    if valid(value) {
        return value;
    }
    logging::debug(
        Stage::Config,
        None,
        &format!("{} = {} is out of range, using {}", field, value, default),
    );
    default
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(self.histogram_bins >= 2, "grid.histogram_bins", || {
            format!("needs at least 2 bins, got {}", self.histogram_bins)
        })?;
        require(self.kde_points >= 2, "grid.kde_points", || {
            format!("needs at least 2 points, got {}", self.kde_points)
        })?;
        require(
            self.bandwidth.is_finite() && self.bandwidth > 0.0,
            "grid.bandwidth",
            || format!("must be a positive number, got {}", self.bandwidth),
        )
    }
}

fn require(
    ok: bool,
    field: &'static str,
    reason: impl FnOnce() -> String,
) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: reason(),
        })
    }
}

/// Initializes the global logger from the `[logging]` section.
/// Unknown level names fall back to Info.
pub fn init_logger_from_config(config: &LoggingConfig) {
    let level = LogLevel::parse(&config.level).unwrap_or(LogLevel::Info);
    logging::init_logger(level, config.file.as_deref(), config.timestamps);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
