//! Pairwise correlation of daily returns and low-correlation pair search.

use std::collections::BTreeSet;

use jiff::civil::Date;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{CorrelationError, DataError};
use crate::model::PriceSeries;
use crate::stats::pearson;

/// Pairs with an absolute correlation below this are reported
pub const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.1;

/// Symmetric matrix of Pearson coefficients between tickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    tickers: Vec<String>,
    values: Vec<Vec<f64>>,
    /// Number of common return observations behind each entry
    observations: Vec<Vec<usize>>,
}

impl CorrelationMatrix {
    #[must_use]
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// Coefficient between tickers `i` and `j`; NaN when undefined.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    #[must_use]
    pub fn observations(&self, i: usize, j: usize) -> usize {
        self.observations[i][j]
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.values
    }
}

/// Correlate the daily returns of every pair of series.
///
/// Each ticker's returns are taken over its own consecutive closes; a pair
/// is then correlated over the return dates both tickers have. Entries with
/// fewer than two shared observations, or a flat series, are NaN.
pub fn correlation_matrix(series: &[PriceSeries]) -> Result<CorrelationMatrix, CorrelationError> {
    if series.len() < 2 {
        return Err(CorrelationError::InvalidInput(
            "need at least 2 price series to correlate",
        ));
    }

    let mut seen = FxHashSet::default();
    for s in series {
        if !seen.insert(s.ticker()) {
            return Err(DataError::DuplicateTicker(s.ticker().to_string()).into());
        }
    }

    let returns: Vec<Vec<(Date, f64)>> = series.iter().map(PriceSeries::daily_returns).collect();
    let lookups: Vec<FxHashMap<Date, f64>> = returns
        .iter()
        .map(|r| r.iter().copied().collect())
        .collect();

    let n = series.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    let mut observations = vec![vec![0; n]; n];

    for i in 0..n {
        for j in i..n {
            let (xs, ys): (Vec<f64>, Vec<f64>) = returns[i]
                .iter()
                .filter_map(|(date, x)| lookups[j].get(date).map(|y| (*x, *y)))
                .unzip();

            let corr = if i == j {
                // Self-correlation is exactly one whenever it is defined
                if pearson(&xs, &ys).is_nan() { f64::NAN } else { 1.0 }
            } else {
                pearson(&xs, &ys)
            };

            values[i][j] = corr;
            values[j][i] = corr;
            observations[i][j] = xs.len();
            observations[j][i] = xs.len();
        }
    }

    Ok(CorrelationMatrix {
        tickers: series.iter().map(|s| s.ticker().to_string()).collect(),
        values,
        observations,
    })
}

/// Two tickers whose returns barely move together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowCorrelationPair {
    pub first: String,
    pub second: String,
    pub correlation: f64,
}

/// Pairs `i < j` whose finite correlation has magnitude below `threshold`,
/// in row-major order.
#[must_use]
pub fn low_correlation_pairs(matrix: &CorrelationMatrix, threshold: f64) -> Vec<LowCorrelationPair> {
    let n = matrix.len();
    let mut pairs = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let corr = matrix.get(i, j);
            if corr.is_finite() && corr.abs() < threshold {
                pairs.push(LowCorrelationPair {
                    first: matrix.tickers[i].clone(),
                    second: matrix.tickers[j].clone(),
                    correlation: corr,
                });
            }
        }
    }
    pairs
}

/// Every ticker that appears in at least one pair, sorted.
#[must_use]
pub fn unique_tickers(pairs: &[LowCorrelationPair]) -> Vec<String> {
    pairs
        .iter()
        .flat_map(|p| [p.first.as_str(), p.second.as_str()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
