use jiff::civil::Date;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::model::PriceSeries;

/// Daily returns for several tickers over a shared date index.
///
/// `rows[t][i]` is the return of `tickers[i]` on `dates[t]`. Every row is
/// complete: dates where any ticker lacks a value never make it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsMatrix {
    tickers: Vec<String>,
    dates: Vec<Date>,
    rows: Vec<Vec<f64>>,
}

impl ReturnsMatrix {
    /// Build a matrix from already-computed return rows.
    ///
    /// Rows containing a non-finite value are dropped.
    pub fn from_rows(
        tickers: Vec<String>,
        rows: impl IntoIterator<Item = (Date, Vec<f64>)>,
    ) -> Result<Self, DataError> {
        check_unique(&tickers)?;

        let mut dates = Vec::new();
        let mut values = Vec::new();
        for (date, row) in rows {
            if row.len() != tickers.len() {
                return Err(DataError::RowWidth {
                    expected: tickers.len(),
                    found: row.len(),
                });
            }
            if row.iter().all(|r| r.is_finite()) {
                dates.push(date);
                values.push(row);
            }
        }

        Ok(Self {
            tickers,
            dates,
            rows: values,
        })
    }

    /// Align closing prices on the dates every series has, then take
    /// day-over-day returns.
    ///
    /// The first aligned date has no predecessor and produces no row.
    pub fn from_prices(series: &[PriceSeries]) -> Result<Self, DataError> {
        let Some((first, rest)) = series.split_first() else {
            return Err(DataError::NoSeries);
        };

        let tickers: Vec<String> = series.iter().map(|s| s.ticker().to_string()).collect();
        check_unique(&tickers)?;

        let lookups: Vec<FxHashMap<Date, f64>> = rest
            .iter()
            .map(|s| s.points().iter().copied().collect())
            .collect();

        let aligned: Vec<(Date, Vec<f64>)> = first
            .points()
            .iter()
            .filter_map(|&(date, close)| {
                let mut row = Vec::with_capacity(series.len());
                row.push(close);
                for lookup in &lookups {
                    row.push(*lookup.get(&date)?);
                }
                Some((date, row))
            })
            .collect();

        if aligned.len() < 2 {
            return Err(DataError::InsufficientOverlap {
                common_dates: aligned.len(),
            });
        }

        let rows = aligned.windows(2).map(|w| {
            let (_, prev) = &w[0];
            let (date, curr) = &w[1];
            let row = curr.iter().zip(prev).map(|(c, p)| c / p - 1.0).collect();
            (*date, row)
        });

        Self::from_rows(tickers, rows)
    }

    #[must_use]
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of assets (columns).
    #[must_use]
    pub fn num_assets(&self) -> usize {
        self.tickers.len()
    }

    /// Number of observations (rows).
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns of a single asset in date order.
    pub fn column(&self, asset: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(move |row| row[asset])
    }
}

fn check_unique(tickers: &[String]) -> Result<(), DataError> {
    let mut seen = FxHashSet::default();
    for ticker in tickers {
        if !seen.insert(ticker.as_str()) {
            return Err(DataError::DuplicateTicker(ticker.clone()));
        }
    }
    Ok(())
}
