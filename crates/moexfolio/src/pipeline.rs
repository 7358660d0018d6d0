//! One analysis run: fetch prices, then sample portfolios or correlate.

use tracing::{info, warn};

use moexfolio_core::{
    CorrelationError, CorrelationMatrix, DataError, Explorer, LowCorrelationPair, PriceSeries,
    ReturnsMatrix, SampleBuffer, SamplingError, correlation_matrix, low_correlation_pairs,
    unique_tickers,
};

use crate::config::AnalysisConfig;
use crate::moex::PriceSource;

#[derive(Debug)]
pub enum PipelineError {
    /// Too few tickers returned usable prices
    NotEnoughTickers { fetched: usize },
    Data(DataError),
    Sampling(SamplingError),
    Correlation(CorrelationError),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::NotEnoughTickers { fetched } => write!(
                f,
                "need price data for at least 2 tickers, got {}",
                fetched
            ),
            PipelineError::Data(e) => write!(f, "{}", e),
            PipelineError::Sampling(e) => write!(f, "{}", e),
            PipelineError::Correlation(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::NotEnoughTickers { .. } => None,
            PipelineError::Data(e) => Some(e),
            PipelineError::Sampling(e) => Some(e),
            PipelineError::Correlation(e) => Some(e),
        }
    }
}

impl From<DataError> for PipelineError {
    fn from(e: DataError) -> Self {
        PipelineError::Data(e)
    }
}

impl From<SamplingError> for PipelineError {
    fn from(e: SamplingError) -> Self {
        PipelineError::Sampling(e)
    }
}

impl From<CorrelationError> for PipelineError {
    fn from(e: CorrelationError) -> Self {
        PipelineError::Correlation(e)
    }
}

/// Fetch every configured ticker in order.
///
/// A ticker that fails or comes back empty is logged and skipped. Fails only
/// when fewer than two tickers are left to analyze.
pub fn collect_series<S: PriceSource + ?Sized>(
    source: &S,
    config: &AnalysisConfig,
) -> Result<Vec<PriceSeries>, PipelineError> {
    let mut series = Vec::with_capacity(config.tickers.len());

    for ticker in &config.tickers {
        match source.fetch_closes(ticker, config.start_date, config.end_date) {
            Ok(s) if !s.is_empty() => {
                info!(ticker = %ticker, points = s.len(), "Fetched closing prices");
                series.push(s);
            }
            Ok(_) => warn!(ticker = %ticker, "No closing prices, skipping"),
            Err(e) => warn!(ticker = %ticker, error = %e, "Failed to fetch prices, skipping"),
        }
    }

    if series.len() < 2 {
        return Err(PipelineError::NotEnoughTickers {
            fetched: series.len(),
        });
    }
    Ok(series)
}

/// Seed used for sampling: the configured one, or a fresh random seed.
pub fn resolve_seed(config: &AnalysisConfig) -> u64 {
    config.seed.unwrap_or_else(rand::random)
}

/// Build the returns matrix and sample `config.num_portfolios` portfolios.
pub fn sample_explorer(
    series: &[PriceSeries],
    config: &AnalysisConfig,
    seed: u64,
) -> Result<Explorer, PipelineError> {
    let matrix = ReturnsMatrix::from_prices(series)?;
    info!(
        assets = matrix.num_assets(),
        rows = matrix.num_rows(),
        samples = config.num_portfolios,
        seed,
        "Sampling portfolios"
    );

    let buffer = draw_samples(&matrix, config.num_portfolios, seed)?;
    Ok(Explorer::new(buffer).with_threshold(config.display_threshold))
}

#[cfg(feature = "parallel")]
fn draw_samples(
    matrix: &ReturnsMatrix,
    count: usize,
    seed: u64,
) -> Result<SampleBuffer, SamplingError> {
    moexfolio_core::sample_portfolios_parallel(matrix, count, seed)
}

#[cfg(not(feature = "parallel"))]
fn draw_samples(
    matrix: &ReturnsMatrix,
    count: usize,
    seed: u64,
) -> Result<SampleBuffer, SamplingError> {
    use rand::SeedableRng;

    let mut rng = rand::rngs::SmallRng::seed_from_u64(seed);
    moexfolio_core::sample_portfolios(matrix, count, &mut rng)
}

/// Correlation matrix plus the pairs that fall under the threshold
#[derive(Debug, Clone)]
pub struct CorrelationAnalysis {
    pub matrix: CorrelationMatrix,
    pub pairs: Vec<LowCorrelationPair>,
    pub unique_tickers: Vec<String>,
    pub threshold: f64,
}

pub fn analyze_correlation(
    series: &[PriceSeries],
    config: &AnalysisConfig,
) -> Result<CorrelationAnalysis, PipelineError> {
    let matrix = correlation_matrix(series)?;
    let pairs = low_correlation_pairs(&matrix, config.correlation_threshold);
    let unique = unique_tickers(&pairs);
    info!(
        tickers = matrix.len(),
        pairs = pairs.len(),
        threshold = config.correlation_threshold,
        "Correlation analysis complete"
    );

    Ok(CorrelationAnalysis {
        matrix,
        pairs,
        unique_tickers: unique,
        threshold: config.correlation_threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moex::FetchError;
    use jiff::ToSpan;
    use jiff::civil::{Date, date};

    /// Serves synthetic prices; tickers listed in `missing` fail like ISS does
    struct StubSource {
        missing: Vec<&'static str>,
    }

    impl PriceSource for StubSource {
        fn fetch_closes(
            &self,
            ticker: &str,
            from: Date,
            _till: Date,
        ) -> Result<PriceSeries, FetchError> {
            if self.missing.iter().any(|m| *m == ticker) {
                return Err(FetchError::NoData(ticker.to_string()));
            }
            let salt = ticker.bytes().map(f64::from).sum::<f64>();
            let points = (0..40i64).map(|t| {
                let day = from.saturating_add(t.days());
                let wiggle = ((t as f64) * 0.7 + salt).sin();
                (day, 100.0 + t as f64 * 0.1 + wiggle)
            });
            Ok(PriceSeries::new(ticker, points))
        }
    }

    fn config(tickers: &[&str]) -> AnalysisConfig {
        AnalysisConfig {
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            start_date: date(2024, 1, 1),
            end_date: date(2024, 3, 1),
            num_portfolios: 250,
            seed: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn test_collect_series_skips_failures() {
        let source = StubSource {
            missing: vec!["VTBR"],
        };
        let series = collect_series(&source, &config(&["SBER", "VTBR", "GAZP"])).unwrap();

        let names: Vec<&str> = series.iter().map(|s| s.ticker()).collect();
        assert_eq!(names, vec!["SBER", "GAZP"]);
    }

    #[test]
    fn test_collect_series_needs_two_tickers() {
        let source = StubSource {
            missing: vec!["VTBR", "AFKS"],
        };
        let result = collect_series(&source, &config(&["SBER", "VTBR", "AFKS"]));

        assert!(matches!(
            result,
            Err(PipelineError::NotEnoughTickers { fetched: 1 })
        ));
    }

    #[test]
    fn test_sample_explorer_is_seeded() {
        let source = StubSource { missing: vec![] };
        let cfg = config(&["SBER", "GAZP", "LKOH"]);
        let series = collect_series(&source, &cfg).unwrap();

        let first = sample_explorer(&series, &cfg, 9).unwrap();
        let second = sample_explorer(&series, &cfg, 9).unwrap();

        assert_eq!(first.buffer().len(), 250);
        assert_eq!(first.buffer(), second.buffer());
        assert_eq!(first.display_threshold(), cfg.display_threshold);
        assert_eq!(resolve_seed(&cfg), 3);
    }

    #[test]
    fn test_analyze_correlation_uses_threshold() {
        let source = StubSource { missing: vec![] };
        let mut cfg = config(&["SBER", "GAZP", "LKOH", "ROSN"]);
        cfg.correlation_threshold = 1.0;
        let series = collect_series(&source, &cfg).unwrap();

        let analysis = analyze_correlation(&series, &cfg).unwrap();

        assert_eq!(analysis.matrix.len(), 4);
        assert!(analysis.pairs.iter().all(|p| p.correlation.abs() < 1.0));
        assert_eq!(analysis.unique_tickers, unique_tickers(&analysis.pairs));
    }
}
