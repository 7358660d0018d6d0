mod portfolio;
mod prices;
mod returns;

pub use portfolio::{PortfolioComposition, PortfolioSample, SampleBuffer};
pub use prices::PriceSeries;
pub use returns::ReturnsMatrix;
