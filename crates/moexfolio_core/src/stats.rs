//! Descriptive statistics over return series.
//!
//! Sums are accumulated around the first observation (shifted data), so a
//! constant series has a mean equal to that constant and a variance of
//! exactly zero.

use crate::model::ReturnsMatrix;

/// Arithmetic mean; NaN for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    let Some(&shift) = values.first() else {
        return f64::NAN;
    };
    let n = values.len() as f64;
    shift + values.iter().map(|v| v - shift).sum::<f64>() / n
}

/// Sample covariance (n - 1 divisor); NaN with fewer than two pairs.
#[must_use]
pub fn covariance(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let (kx, ky) = (xs[0], ys[0]);
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    for (x, y) in xs.iter().zip(ys).take(n) {
        let (dx, dy) = (x - kx, y - ky);
        sum_x += dx;
        sum_y += dy;
        sum_xy += dx * dy;
    }
    let n = n as f64;
    (sum_xy - sum_x * sum_y / n) / (n - 1.0)
}

/// Pearson correlation coefficient.
///
/// NaN with fewer than two pairs or when either side has zero variance.
#[must_use]
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let var_x = covariance(xs, xs);
    let var_y = covariance(ys, ys);
    if !(var_x > 0.0 && var_y > 0.0) {
        return f64::NAN;
    }
    (covariance(xs, ys) / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

/// Mean daily return of every column.
#[must_use]
pub fn column_means(matrix: &ReturnsMatrix) -> Vec<f64> {
    (0..matrix.num_assets())
        .map(|i| mean(&matrix.column(i).collect::<Vec<_>>()))
        .collect()
}

/// Sample covariance matrix of the columns, `cov[i][j]`.
#[must_use]
pub fn covariance_matrix(matrix: &ReturnsMatrix) -> Vec<Vec<f64>> {
    let columns: Vec<Vec<f64>> = (0..matrix.num_assets())
        .map(|i| matrix.column(i).collect())
        .collect();

    let n = columns.len();
    let mut cov = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let c = covariance(&columns[i], &columns[j]);
            cov[i][j] = c;
            cov[j][i] = c;
        }
    }
    cov
}

/// `wᵀ · m · w`
#[must_use]
pub fn quadratic_form(weights: &[f64], m: &[Vec<f64>]) -> f64 {
    weights
        .iter()
        .zip(m)
        .map(|(wi, row)| wi * row.iter().zip(weights).map(|(m_ij, wj)| m_ij * wj).sum::<f64>())
        .sum()
}
