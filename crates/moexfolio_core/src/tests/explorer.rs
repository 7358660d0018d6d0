//! Tests for point queries against a sample buffer
//!
//! These tests verify that:
//! - The nearest sample by Euclidean distance is selected
//! - Ties resolve to the earliest sample
//! - Composition filtering honors the display threshold and its fallback
//! - Queries are idempotent and reject empty buffers

use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::{matrix_from_columns, tickers};
use crate::error::ExplorerError;
use crate::explorer::{Explorer, nearest_index, select_nearest};
use crate::model::{PortfolioSample, SampleBuffer};
use crate::sampler::sample_portfolios;

fn sample(expected_return: f64, risk: f64, weights: &[f64]) -> PortfolioSample {
    PortfolioSample {
        expected_return,
        risk,
        sharpe: expected_return / risk,
        weights: weights.to_vec(),
    }
}

fn three_asset_buffer(samples: Vec<PortfolioSample>) -> SampleBuffer {
    SampleBuffer::new(tickers(&["asset1", "asset2", "asset3"]), samples).unwrap()
}

#[test]
fn test_single_sample_always_selected() {
    let buffer = three_asset_buffer(vec![sample(0.15, 0.20, &[0.2, 0.3, 0.5])]);

    for (risk, ret) in [(0.0, 0.0), (0.20, 0.15), (10.0, -5.0), (-3.0, 42.0)] {
        let composition = select_nearest(&buffer, risk, ret).unwrap();
        assert_eq!(composition.selected_index, 0);
        assert_eq!(composition.selected_return, 0.15);
        assert_eq!(composition.selected_risk, 0.20);
    }
}

#[test]
fn test_selects_nearest_point() {
    let buffer = three_asset_buffer(vec![
        sample(0.10, 0.10, &[0.4, 0.3, 0.3]),
        sample(0.20, 0.30, &[0.3, 0.4, 0.3]),
        sample(0.30, 0.50, &[0.3, 0.3, 0.4]),
    ]);

    assert_eq!(nearest_index(&buffer, 0.29, 0.21).unwrap(), 1);
    assert_eq!(nearest_index(&buffer, 0.90, 0.90).unwrap(), 2);
    assert_eq!(nearest_index(&buffer, -1.0, -1.0).unwrap(), 0);
}

#[test]
fn test_tie_resolves_to_first() {
    let buffer = three_asset_buffer(vec![
        sample(0.25, 0.5, &[0.4, 0.3, 0.3]),
        sample(0.75, 0.5, &[0.3, 0.4, 0.3]),
    ]);

    // Equidistant from both samples
    assert_eq!(nearest_index(&buffer, 0.5, 0.5).unwrap(), 0);
}

#[test]
fn test_non_finite_samples_never_win() {
    let buffer = three_asset_buffer(vec![
        sample(f64::NAN, 0.20, &[0.4, 0.3, 0.3]),
        sample(0.50, 0.90, &[0.3, 0.4, 0.3]),
    ]);

    assert_eq!(nearest_index(&buffer, 0.20, 0.0).unwrap(), 1);
}

#[test]
fn test_threshold_fallback_to_heaviest_asset() {
    let buffer = three_asset_buffer(vec![sample(0.12, 0.25, &[0.05, 0.05, 0.9])]);
    let explorer = Explorer::new(buffer.clone());
    let composition = explorer.select_nearest(0.25, 0.12).unwrap();
    assert_eq!(
        composition.filtered_weights,
        vec![("asset3".to_string(), 0.9)]
    );

    // Nothing clears 0.95, so the heaviest asset stands in
    let strict = Explorer::new(buffer).with_threshold(0.95);
    let composition = strict.select_nearest(0.25, 0.12).unwrap();
    assert_eq!(
        composition.filtered_weights,
        vec![("asset3".to_string(), 0.9)]
    );
}

#[test]
fn test_threshold_inclusion() {
    let buffer = three_asset_buffer(vec![sample(0.12, 0.25, &[0.5, 0.3, 0.2])]);

    let composition = select_nearest(&buffer, 0.25, 0.12).unwrap();
    let names: Vec<&str> = composition
        .filtered_weights
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();

    assert!(names.contains(&"asset1"));
    assert!(names.contains(&"asset2"));
    assert!(names.contains(&"asset3"), "0.2 clears the default 0.10 threshold");

    let explorer = Explorer::new(buffer).with_threshold(0.25);
    let composition = explorer.select_nearest(0.25, 0.12).unwrap();
    assert_eq!(
        composition.filtered_weights,
        vec![("asset1".to_string(), 0.5), ("asset2".to_string(), 0.3)]
    );
    assert!((composition.hidden_weight() - 0.2).abs() < 1e-12);
}

#[test]
fn test_select_nearest_is_idempotent() {
    let a: Vec<f64> = (0..60).map(|t| 0.01 * ((t % 4) as f64 - 1.5)).collect();
    let b: Vec<f64> = (0..60).map(|t| 0.02 * ((t % 3) as f64 - 1.0)).collect();
    let c: Vec<f64> = (0..60).map(|t| 0.005 * ((t % 5) as f64 - 2.0)).collect();
    let matrix = matrix_from_columns(&["asset1", "asset2", "asset3"], &[a, b, c]);
    let buffer = sample_portfolios(&matrix, 1_000, &mut SmallRng::seed_from_u64(8)).unwrap();
    let explorer = Explorer::new(buffer);

    let first = explorer.select_nearest(0.15, 0.02).unwrap();
    let second = explorer.select_nearest(0.15, 0.02).unwrap();

    assert_eq!(first, second);
    assert_eq!(explorer.composition(first.selected_index), Some(first));
}

#[test]
fn test_empty_buffer_is_an_error() {
    let buffer = three_asset_buffer(Vec::new());

    assert_eq!(
        select_nearest(&buffer, 0.1, 0.1),
        Err(ExplorerError::EmptyBuffer)
    );
    assert_eq!(
        Explorer::new(buffer).nearest_index(0.1, 0.1),
        Err(ExplorerError::EmptyBuffer)
    );
}

#[test]
fn test_buffer_rejects_mismatched_weights() {
    let result = SampleBuffer::new(
        tickers(&["asset1", "asset2"]),
        vec![sample(0.1, 0.1, &[0.2, 0.3, 0.5])],
    );
    assert!(result.is_err());
}
