//! Point queries against a sampled portfolio buffer.
//!
//! Given a point in (risk, return) space, find the closest sampled portfolio
//! and describe its composition. The buffer is never mutated, so queries are
//! idempotent and may run concurrently.

use crate::error::ExplorerError;
use crate::model::{PortfolioComposition, SampleBuffer};

/// Minimum weight for an asset to be listed individually
pub const DEFAULT_DISPLAY_THRESHOLD: f64 = 0.10;

/// Owns a sample buffer for the session and answers point queries on it.
#[derive(Debug, Clone)]
pub struct Explorer {
    buffer: SampleBuffer,
    display_threshold: f64,
}

impl Explorer {
    #[must_use]
    pub fn new(buffer: SampleBuffer) -> Self {
        Self {
            buffer,
            display_threshold: DEFAULT_DISPLAY_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, display_threshold: f64) -> Self {
        self.display_threshold = display_threshold;
        self
    }

    #[must_use]
    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    #[must_use]
    pub fn display_threshold(&self) -> f64 {
        self.display_threshold
    }

    /// Index of the sample closest to `(risk, ret)`.
    pub fn nearest_index(&self, risk: f64, ret: f64) -> Result<usize, ExplorerError> {
        nearest_index(&self.buffer, risk, ret)
    }

    /// Composition of the sample closest to `(risk, ret)`.
    pub fn select_nearest(&self, risk: f64, ret: f64) -> Result<PortfolioComposition, ExplorerError> {
        select_nearest_with_threshold(&self.buffer, risk, ret, self.display_threshold)
    }

    /// Composition of the sample at `index`, if there is one.
    #[must_use]
    pub fn composition(&self, index: usize) -> Option<PortfolioComposition> {
        composition_at(&self.buffer, index, self.display_threshold)
    }
}

/// Select the nearest sample using the default display threshold.
pub fn select_nearest(
    buffer: &SampleBuffer,
    click_risk: f64,
    click_return: f64,
) -> Result<PortfolioComposition, ExplorerError> {
    select_nearest_with_threshold(buffer, click_risk, click_return, DEFAULT_DISPLAY_THRESHOLD)
}

pub fn select_nearest_with_threshold(
    buffer: &SampleBuffer,
    click_risk: f64,
    click_return: f64,
    display_threshold: f64,
) -> Result<PortfolioComposition, ExplorerError> {
    let index = nearest_index(buffer, click_risk, click_return)?;
    composition_at(buffer, index, display_threshold).ok_or(ExplorerError::EmptyBuffer)
}

/// Index of the sample closest to `(risk, ret)` by Euclidean distance.
///
/// Ties resolve to the earliest sample. Samples with non-finite
/// coordinates only win when no sample has finite ones.
pub fn nearest_index(buffer: &SampleBuffer, risk: f64, ret: f64) -> Result<usize, ExplorerError> {
    if buffer.is_empty() {
        return Err(ExplorerError::EmptyBuffer);
    }

    let mut best: Option<(usize, f64)> = None;
    for (i, sample) in buffer.iter().enumerate() {
        let distance = (sample.risk - risk).hypot(sample.expected_return - ret);
        if !distance.is_finite() {
            continue;
        }
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((i, distance)),
        }
    }

    Ok(best.map_or(0, |(i, _)| i))
}

fn composition_at(
    buffer: &SampleBuffer,
    index: usize,
    display_threshold: f64,
) -> Option<PortfolioComposition> {
    let sample = buffer.get(index)?;
    Some(PortfolioComposition {
        selected_index: index,
        selected_return: sample.expected_return,
        selected_risk: sample.risk,
        selected_sharpe: sample.sharpe,
        filtered_weights: filter_weights(buffer.tickers(), &sample.weights, display_threshold),
    })
}

/// Keep `(ticker, weight)` pairs above `threshold`, in asset order.
///
/// When nothing clears the threshold, the single heaviest asset is kept
/// (the first one on ties).
#[must_use]
pub fn filter_weights(tickers: &[String], weights: &[f64], threshold: f64) -> Vec<(String, f64)> {
    let filtered: Vec<(String, f64)> = tickers
        .iter()
        .zip(weights)
        .filter(|(_, w)| **w > threshold)
        .map(|(t, w)| (t.clone(), *w))
        .collect();

    if !filtered.is_empty() {
        return filtered;
    }

    let mut heaviest: Option<(usize, f64)> = None;
    for (i, &w) in weights.iter().enumerate() {
        match heaviest {
            Some((_, max)) if max >= w => {}
            _ => heaviest = Some((i, w)),
        }
    }

    heaviest
        .and_then(|(i, w)| tickers.get(i).map(|t| (t.clone(), w)))
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tickers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filter_weights_keeps_order() {
        let result = filter_weights(&tickers(&["A", "B", "C"]), &[0.2, 0.05, 0.75], 0.10);
        assert_eq!(
            result,
            vec![("A".to_string(), 0.2), ("C".to_string(), 0.75)]
        );
    }

    #[test]
    fn test_filter_weights_threshold_is_exclusive() {
        let result = filter_weights(&tickers(&["A", "B"]), &[0.10, 0.90], 0.10);
        assert_eq!(result, vec![("B".to_string(), 0.90)]);
    }

    #[test]
    fn test_filter_weights_fallback_picks_first_max() {
        let result = filter_weights(&tickers(&["A", "B", "C"]), &[0.05, 0.08, 0.08], 0.10);
        assert_eq!(result, vec![("B".to_string(), 0.08)]);
    }
}
