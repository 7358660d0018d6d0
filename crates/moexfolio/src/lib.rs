//! Terminal frontend for the MOEX portfolio explorer
//!
//! Fetches daily closes from the MOEX ISS API, then either samples random
//! portfolios and lets the user pick points on the risk/return map, or scans
//! the tickers for weakly correlated pairs.

pub mod app;
pub mod components;
pub mod config;
pub mod logging;
pub mod moex;
pub mod pipeline;
pub mod report;
pub mod screens;
pub mod util;

pub use app::{App, Screen};
pub use config::{AnalysisConfig, ConfigError, ConfigOverrides};
pub use logging::init_logging;
pub use moex::{FetchError, MoexClient, PriceSource};
pub use pipeline::{
    CorrelationAnalysis, PipelineError, analyze_correlation, collect_series, resolve_seed,
    sample_explorer,
};
