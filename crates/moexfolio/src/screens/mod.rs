pub mod correlation;
pub mod explorer;

pub use correlation::CorrelationScreen;
pub use explorer::ExplorerScreen;
