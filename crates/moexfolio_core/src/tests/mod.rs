//! Integration tests for the moexfolio core
//!
//! Tests are organized by topic:
//! - `returns` - Price alignment and the returns matrix
//! - `sampler` - Random portfolio generation and annualized statistics
//! - `explorer` - Nearest-point selection and composition filtering
//! - `correlation` - Pairwise correlation and low-correlation pairs

mod explorer;
mod returns;

use jiff::ToSpan;
use jiff::civil::{Date, date};

use crate::model::{PriceSeries, ReturnsMatrix};

/// Consecutive calendar days starting 2024-01-01
fn day(offset: usize) -> Date {
    date(2024, 1, 1).saturating_add((offset as i64).days())
}

fn tickers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Build a matrix from per-asset columns of equal length
fn matrix_from_columns(names: &[&str], columns: &[Vec<f64>]) -> ReturnsMatrix {
    let rows = (0..columns[0].len()).map(|t| (day(t), columns.iter().map(|c| c[t]).collect()));
    ReturnsMatrix::from_rows(tickers(names), rows).unwrap()
}

/// A closing-price series whose daily returns are `returns`, starting at 100
fn series_from_returns(ticker: &str, returns: &[f64]) -> PriceSeries {
    let mut price = 100.0;
    let mut points = vec![(day(0), price)];
    for (t, r) in returns.iter().enumerate() {
        price *= 1.0 + r;
        points.push((day(t + 1), price));
    }
    PriceSeries::new(ticker, points)
}
