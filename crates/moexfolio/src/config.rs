//! Run configuration for one analysis.
//!
//! Defaults mirror the two classic MOEX studies: a 20-ticker random
//! portfolio map over 2023-2025 and a 10-ticker correlation scan from 2015.
//! A YAML file can replace any field; CLI flags override both.

use std::path::Path;

use jiff::civil::{Date, date};
use serde::{Deserialize, Serialize};

use moexfolio_core::{DEFAULT_CORRELATION_THRESHOLD, DEFAULT_DISPLAY_THRESHOLD};

use crate::moex::{DEFAULT_BASE_URL, DEFAULT_BOARD};

/// Members of the MOEX index used for the portfolio map
pub const PORTFOLIO_TICKERS: &[&str] = &[
    "GAZP", "SBER", "LKOH", "GMKN", "ROSN", "NVTK", "TATN", "MTSS", "ALRS", "PLZL", "MGNT", "CHMF",
    "SNGS", "SNGSP", "TATNP", "PHOR", "RUAL", "AFKS", "VTBR", "MOEX",
];

/// Blue chips used for the correlation scan
pub const CORRELATION_TICKERS: &[&str] = &[
    "GAZP", "SBER", "LKOH", "GMKN", "ROSN", "NVTK", "TATN", "MTSS", "ALRS", "PLZL",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Tickers to fetch, in column order
    pub tickers: Vec<String>,
    /// First trading date requested (inclusive)
    pub start_date: Date,
    /// Last trading date requested (inclusive)
    pub end_date: Date,
    /// Number of random portfolios to draw
    pub num_portfolios: usize,
    /// Minimum weight for an asset to be listed in a composition
    pub display_threshold: f64,
    /// Pairs with |correlation| below this are reported
    pub correlation_threshold: f64,
    /// Seed for the portfolio sampler; random when absent
    pub seed: Option<u64>,
    /// ISS trading board
    pub board: String,
    /// ISS endpoint root
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tickers: PORTFOLIO_TICKERS.iter().map(|t| t.to_string()).collect(),
            start_date: date(2023, 1, 1),
            end_date: date(2025, 3, 5),
            num_portfolios: 10_000,
            display_threshold: DEFAULT_DISPLAY_THRESHOLD,
            correlation_threshold: DEFAULT_CORRELATION_THRESHOLD,
            seed: None,
            board: DEFAULT_BOARD.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl AnalysisConfig {
    /// Defaults for the correlation scan: fewer tickers, a longer history.
    #[must_use]
    pub fn for_correlation() -> Self {
        Self {
            tickers: CORRELATION_TICKERS.iter().map(|t| t.to_string()).collect(),
            start_date: date(2015, 1, 1),
            ..Self::default()
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_saphyr::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a YAML config file. Fields it leaves out keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&content)
    }

    /// Apply command-line overrides on top of the loaded values.
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(tickers) = &overrides.tickers {
            self.tickers = tickers.iter().map(|t| t.trim().to_uppercase()).collect();
        }
        if let Some(from) = overrides.from {
            self.start_date = from;
        }
        if let Some(till) = overrides.till {
            self.end_date = till;
        }
        if let Some(samples) = overrides.samples {
            self.num_portfolios = samples;
        }
        if let Some(seed) = overrides.seed {
            self.seed = Some(seed);
        }
        if let Some(threshold) = overrides.display_threshold {
            self.display_threshold = threshold;
        }
        if let Some(threshold) = overrides.correlation_threshold {
            self.correlation_threshold = threshold;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tickers.len() < 2 {
            return Err(ConfigError::Invalid(
                "at least 2 tickers are required".to_string(),
            ));
        }
        if self.start_date >= self.end_date {
            return Err(ConfigError::Invalid(format!(
                "start date {} must be before end date {}",
                self.start_date, self.end_date
            )));
        }
        if self.num_portfolios == 0 {
            return Err(ConfigError::Invalid(
                "number of portfolios must be at least 1".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.display_threshold) {
            return Err(ConfigError::Invalid(format!(
                "display threshold {} must be in [0, 1)",
                self.display_threshold
            )));
        }
        if !(self.correlation_threshold > 0.0 && self.correlation_threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "correlation threshold {} must be in (0, 1]",
                self.correlation_threshold
            )));
        }
        Ok(())
    }
}

/// Values supplied on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub tickers: Option<Vec<String>>,
    pub from: Option<Date>,
    pub till: Option<Date>,
    pub samples: Option<usize>,
    pub seed: Option<u64>,
    pub display_threshold: Option<f64>,
    pub correlation_threshold: Option<f64>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
