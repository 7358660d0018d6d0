//! Monte Carlo sampling of random long-only portfolios.

use rand::Rng;

use crate::error::SamplingError;
use crate::model::{PortfolioSample, ReturnsMatrix, SampleBuffer};
use crate::stats::{column_means, covariance_matrix, quadratic_form};

/// Trading days used to annualize daily statistics
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annualized moments of a returns matrix, ready to evaluate weight vectors.
///
/// Means and covariance are computed once here; every draw reuses them.
#[derive(Debug, Clone)]
pub struct PortfolioSampler {
    tickers: Vec<String>,
    annual_means: Vec<f64>,
    annual_cov: Vec<Vec<f64>>,
}

impl PortfolioSampler {
    pub fn new(matrix: &ReturnsMatrix) -> Result<Self, SamplingError> {
        if matrix.num_assets() < 2 {
            return Err(SamplingError::InvalidInput(
                "returns matrix needs at least 2 assets",
            ));
        }
        if matrix.is_empty() {
            return Err(SamplingError::InvalidInput("returns matrix has no rows"));
        }

        let annual_means = column_means(matrix)
            .into_iter()
            .map(|m| m * TRADING_DAYS_PER_YEAR)
            .collect();
        let annual_cov = covariance_matrix(matrix)
            .into_iter()
            .map(|row| row.into_iter().map(|c| c * TRADING_DAYS_PER_YEAR).collect())
            .collect();

        Ok(Self {
            tickers: matrix.tickers().to_vec(),
            annual_means,
            annual_cov,
        })
    }

    #[must_use]
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    #[must_use]
    pub fn num_assets(&self) -> usize {
        self.tickers.len()
    }

    /// Evaluate an explicit weight vector.
    pub fn evaluate(&self, weights: Vec<f64>) -> Result<PortfolioSample, SamplingError> {
        if weights.len() != self.num_assets() {
            return Err(SamplingError::WeightCount {
                expected: self.num_assets(),
                found: weights.len(),
            });
        }
        Ok(self.portfolio(weights))
    }

    /// Draw one portfolio with uniformly random, normalized weights.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> PortfolioSample {
        self.portfolio(random_weights(rng, self.num_assets()))
    }

    fn portfolio(&self, weights: Vec<f64>) -> PortfolioSample {
        let expected_return: f64 = self
            .annual_means
            .iter()
            .zip(&weights)
            .map(|(m, w)| m * w)
            .sum();
        // Rounding can push a zero variance slightly negative. NaN (one return
        // row) must stay NaN, so no `f64::max` here.
        let variance = quadratic_form(&weights, &self.annual_cov);
        let risk = if variance < 0.0 { 0.0 } else { variance.sqrt() };

        PortfolioSample {
            expected_return,
            risk,
            sharpe: expected_return / risk,
            weights,
        }
    }

    /// Draw `count` portfolios in generation order.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<SampleBuffer, SamplingError> {
        if count == 0 {
            return Err(SamplingError::InvalidInput("sample count must be at least 1"));
        }
        let samples = (0..count).map(|_| self.draw(rng)).collect();
        SampleBuffer::new(self.tickers.clone(), samples)
    }
}

/// `count` independent uniform draws in [0, 1), scaled to sum to one.
pub fn random_weights<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<f64> {
    loop {
        let raw: Vec<f64> = (0..count).map(|_| rng.random::<f64>()).collect();
        let total: f64 = raw.iter().sum();
        if total > 0.0 {
            return raw.into_iter().map(|w| w / total).collect();
        }
    }
}

/// Sample `count` random portfolios over `matrix`.
pub fn sample_portfolios<R: Rng + ?Sized>(
    matrix: &ReturnsMatrix,
    count: usize,
    rng: &mut R,
) -> Result<SampleBuffer, SamplingError> {
    PortfolioSampler::new(matrix)?.sample(count, rng)
}

/// Sample `count` random portfolios across the rayon pool.
///
/// Draws are split into batches of 100; batch `i` uses its own generator
/// seeded from `seed` and `i`, so the result depends only on `seed`.
#[cfg(feature = "parallel")]
pub fn sample_portfolios_parallel(
    matrix: &ReturnsMatrix,
    count: usize,
    seed: u64,
) -> Result<SampleBuffer, SamplingError> {
    use rand::SeedableRng;
    use rayon::iter::{IntoParallelIterator, ParallelIterator};

    const MAX_BATCH_SIZE: usize = 100;

    if count == 0 {
        return Err(SamplingError::InvalidInput("sample count must be at least 1"));
    }
    let sampler = PortfolioSampler::new(matrix)?;
    let num_batches = count.div_ceil(MAX_BATCH_SIZE);

    let samples = (0..num_batches)
        .into_par_iter()
        .flat_map_iter(|i| {
            let batch_seed = seed ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
            let mut rng = rand::rngs::SmallRng::seed_from_u64(batch_seed);

            let batch_size = if i == num_batches - 1 {
                count - i * MAX_BATCH_SIZE
            } else {
                MAX_BATCH_SIZE
            };

            (0..batch_size)
                .map(|_| sampler.draw(&mut rng))
                .collect::<Vec<_>>()
        })
        .collect();

    SampleBuffer::new(sampler.tickers, samples)
}
