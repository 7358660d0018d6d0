//! Tests for building the returns matrix from closing prices
//!
//! These tests verify that:
//! - Series are inner-joined on date
//! - The first aligned date produces no return row
//! - Rows with missing or non-finite values are dropped
//! - Degenerate input is rejected

use super::{day, tickers};
use crate::error::DataError;
use crate::model::{PriceSeries, ReturnsMatrix};

#[test]
fn test_from_prices_inner_joins_dates() {
    let gazp = PriceSeries::new(
        "GAZP",
        [(day(0), 100.0), (day(1), 110.0), (day(2), 121.0), (day(3), 133.1)],
    );
    // SBER is missing day(2)
    let sber = PriceSeries::new("SBER", [(day(0), 50.0), (day(1), 55.0), (day(3), 60.5)]);

    let matrix = ReturnsMatrix::from_prices(&[gazp, sber]).unwrap();

    assert_eq!(matrix.tickers(), &tickers(&["GAZP", "SBER"]));
    assert_eq!(matrix.dates(), &[day(1), day(3)]);
    assert_eq!(matrix.num_rows(), 2);

    // day(1): both +10%
    assert!((matrix.rows()[0][0] - 0.10).abs() < 1e-12);
    assert!((matrix.rows()[0][1] - 0.10).abs() < 1e-12);
    // day(3) vs day(1): GAZP 133.1/110, SBER 60.5/55
    assert!((matrix.rows()[1][0] - 0.21).abs() < 1e-12);
    assert!((matrix.rows()[1][1] - 0.10).abs() < 1e-12);
}

#[test]
fn test_column_iterates_in_date_order() {
    let a = PriceSeries::new("A", [(day(0), 1.0), (day(1), 2.0), (day(2), 3.0)]);
    let b = PriceSeries::new("B", [(day(0), 4.0), (day(1), 2.0), (day(2), 1.0)]);

    let matrix = ReturnsMatrix::from_prices(&[a, b]).unwrap();
    let col: Vec<f64> = matrix.column(1).collect();

    assert_eq!(col, vec![-0.5, -0.5]);
}

#[test]
fn test_from_prices_rejects_no_series() {
    assert_eq!(ReturnsMatrix::from_prices(&[]), Err(DataError::NoSeries));
}

#[test]
fn test_from_prices_rejects_duplicate_ticker() {
    let a = PriceSeries::new("A", [(day(0), 1.0), (day(1), 2.0)]);
    let result = ReturnsMatrix::from_prices(&[a.clone(), a]);
    assert_eq!(result, Err(DataError::DuplicateTicker("A".to_string())));
}

#[test]
fn test_from_prices_needs_two_common_dates() {
    let a = PriceSeries::new("A", [(day(0), 1.0), (day(1), 2.0)]);
    let b = PriceSeries::new("B", [(day(1), 1.0), (day(2), 2.0)]);

    let result = ReturnsMatrix::from_prices(&[a, b]);
    assert_eq!(
        result,
        Err(DataError::InsufficientOverlap { common_dates: 1 })
    );
}

#[test]
fn test_from_rows_drops_non_finite_rows() {
    let rows = vec![
        (day(0), vec![0.01, 0.02]),
        (day(1), vec![f64::NAN, 0.02]),
        (day(2), vec![0.03, f64::INFINITY]),
        (day(3), vec![0.04, 0.05]),
    ];

    let matrix = ReturnsMatrix::from_rows(tickers(&["A", "B"]), rows).unwrap();

    assert_eq!(matrix.dates(), &[day(0), day(3)]);
    assert_eq!(matrix.rows(), &[vec![0.01, 0.02], vec![0.04, 0.05]]);
}

#[test]
fn test_from_rows_rejects_ragged_rows() {
    let rows = vec![(day(0), vec![0.01, 0.02]), (day(1), vec![0.01])];

    let result = ReturnsMatrix::from_rows(tickers(&["A", "B"]), rows);
    assert_eq!(
        result,
        Err(DataError::RowWidth {
            expected: 2,
            found: 1
        })
    );
}
