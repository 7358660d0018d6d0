use serde::{Deserialize, Serialize};

use crate::error::SamplingError;

/// One randomly drawn portfolio and its annualized statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSample {
    /// Annualized expected return
    pub expected_return: f64,
    /// Annualized standard deviation of returns
    pub risk: f64,
    /// `expected_return / risk`; not finite when risk is zero
    pub sharpe: f64,
    /// One weight per asset, in the buffer's ticker order
    pub weights: Vec<f64>,
}

/// The fixed set of sampled portfolios for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleBuffer {
    tickers: Vec<String>,
    samples: Vec<PortfolioSample>,
}

impl SampleBuffer {
    /// Wrap samples drawn over `tickers`.
    ///
    /// Every sample must carry exactly one weight per ticker.
    pub fn new(tickers: Vec<String>, samples: Vec<PortfolioSample>) -> Result<Self, SamplingError> {
        if let Some(bad) = samples.iter().find(|s| s.weights.len() != tickers.len()) {
            return Err(SamplingError::WeightCount {
                expected: tickers.len(),
                found: bad.weights.len(),
            });
        }
        Ok(Self { tickers, samples })
    }

    #[must_use]
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    #[must_use]
    pub fn samples(&self) -> &[PortfolioSample] {
        &self.samples
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PortfolioSample> {
        self.samples.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PortfolioSample> {
        self.samples.iter()
    }

    /// Index of the sample with the highest finite Sharpe ratio
    #[must_use]
    pub fn max_sharpe(&self) -> Option<usize> {
        self.samples
            .iter()
            .enumerate()
            .filter(|(_, s)| s.sharpe.is_finite())
            .max_by(|(_, a), (_, b)| a.sharpe.total_cmp(&b.sharpe))
            .map(|(i, _)| i)
    }

    /// Index of the sample with the lowest finite risk
    #[must_use]
    pub fn min_risk(&self) -> Option<usize> {
        self.samples
            .iter()
            .enumerate()
            .filter(|(_, s)| s.risk.is_finite())
            .min_by(|(_, a), (_, b)| a.risk.total_cmp(&b.risk))
            .map(|(i, _)| i)
    }

    /// (min, max) of finite risk values
    #[must_use]
    pub fn risk_bounds(&self) -> Option<(f64, f64)> {
        finite_bounds(self.samples.iter().map(|s| s.risk))
    }

    /// (min, max) of finite return values
    #[must_use]
    pub fn return_bounds(&self) -> Option<(f64, f64)> {
        finite_bounds(self.samples.iter().map(|s| s.expected_return))
    }

    /// (min, max) of finite Sharpe values
    #[must_use]
    pub fn sharpe_bounds(&self) -> Option<(f64, f64)> {
        finite_bounds(self.samples.iter().map(|s| s.sharpe))
    }
}

impl<'a> IntoIterator for &'a SampleBuffer {
    type Item = &'a PortfolioSample;
    type IntoIter = std::slice::Iter<'a, PortfolioSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

fn finite_bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// The answer to a point query against a sample buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioComposition {
    /// Position of the selected sample in the buffer
    pub selected_index: usize,
    pub selected_return: f64,
    pub selected_risk: f64,
    pub selected_sharpe: f64,
    /// (ticker, weight) pairs that clear the display threshold, in asset order
    pub filtered_weights: Vec<(String, f64)>,
}

impl PortfolioComposition {
    /// Share of the portfolio not shown individually
    #[must_use]
    pub fn hidden_weight(&self) -> f64 {
        let shown: f64 = self.filtered_weights.iter().map(|(_, w)| w).sum();
        (1.0 - shown).max(0.0)
    }
}
