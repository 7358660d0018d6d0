//! Portfolio sampling and correlation analysis library
//!
//! This crate provides the numerical core of the MOEX portfolio explorer.
//! It supports:
//! - Aligning per-ticker closing-price series into a daily returns matrix
//! - Monte Carlo sampling of random long-only portfolios (return, risk, Sharpe)
//! - Nearest-portfolio selection in risk/return space with composition filtering
//! - Pairwise Pearson correlation of daily returns and low-correlation pair search
//!
//! # Example
//!
//! ```ignore
//! use moexfolio_core::{PriceSeries, ReturnsMatrix, sample_portfolios, Explorer};
//! use rand::SeedableRng;
//!
//! let matrix = ReturnsMatrix::from_prices(&series)?;
//! let mut rng = rand::rngs::SmallRng::seed_from_u64(7);
//! let buffer = sample_portfolios(&matrix, 10_000, &mut rng)?;
//!
//! let explorer = Explorer::new(buffer);
//! let composition = explorer.select_nearest(0.25, 0.18)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod correlation;
pub mod error;
pub mod explorer;
pub mod sampler;
pub mod stats;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use correlation::{
    CorrelationMatrix, DEFAULT_CORRELATION_THRESHOLD, LowCorrelationPair, correlation_matrix,
    low_correlation_pairs, unique_tickers,
};
pub use error::{CorrelationError, DataError, ExplorerError, SamplingError};
pub use explorer::{
    DEFAULT_DISPLAY_THRESHOLD, Explorer, filter_weights, nearest_index, select_nearest,
    select_nearest_with_threshold,
};
pub use model::{PortfolioComposition, PortfolioSample, PriceSeries, ReturnsMatrix, SampleBuffer};
pub use sampler::{PortfolioSampler, TRADING_DAYS_PER_YEAR, sample_portfolios};

#[cfg(feature = "parallel")]
pub use sampler::sample_portfolios_parallel;
