use std::fmt;

/// Errors raised while building a returns matrix from price series
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// No price series were supplied
    NoSeries,
    /// Two series share the same ticker
    DuplicateTicker(String),
    /// Fewer than two dates are common to every series
    InsufficientOverlap { common_dates: usize },
    /// A row length did not match the number of tickers
    RowWidth { expected: usize, found: usize },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::NoSeries => write!(f, "no price series supplied"),
            DataError::DuplicateTicker(ticker) => write!(f, "ticker {ticker} supplied twice"),
            DataError::InsufficientOverlap { common_dates } => write!(
                f,
                "price series share {common_dates} common dates, need at least 2"
            ),
            DataError::RowWidth { expected, found } => {
                write!(f, "row has {found} values, expected {expected}")
            }
        }
    }
}

impl std::error::Error for DataError {}

/// Errors raised by the portfolio sampler
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingError {
    /// The returns matrix cannot support sampling
    InvalidInput(&'static str),
    /// An explicit weight vector does not match the asset count
    WeightCount { expected: usize, found: usize },
}

impl fmt::Display for SamplingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingError::InvalidInput(reason) => write!(f, "invalid input: {reason}"),
            SamplingError::WeightCount { expected, found } => {
                write!(f, "got {found} weights for {expected} assets")
            }
        }
    }
}

impl std::error::Error for SamplingError {}

/// Errors raised when querying a sample buffer
#[derive(Debug, Clone, PartialEq)]
pub enum ExplorerError {
    /// The buffer holds no samples
    EmptyBuffer,
}

impl fmt::Display for ExplorerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplorerError::EmptyBuffer => write!(f, "sample buffer is empty"),
        }
    }
}

impl std::error::Error for ExplorerError {}

/// Errors raised by the correlation analyzer
#[derive(Debug, Clone, PartialEq)]
pub enum CorrelationError {
    /// Fewer than two series were supplied
    InvalidInput(&'static str),
    Data(DataError),
}

impl fmt::Display for CorrelationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationError::InvalidInput(reason) => write!(f, "invalid input: {reason}"),
            CorrelationError::Data(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CorrelationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CorrelationError::Data(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DataError> for CorrelationError {
    fn from(err: DataError) -> Self {
        CorrelationError::Data(err)
    }
}
