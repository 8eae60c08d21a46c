pub mod conventions;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "fixed_income")]
pub mod fixed_income;

#[cfg(feature = "report")]
pub mod report;

pub use conventions::PricingConventions;
pub use error::PricerError;
pub use types::*;

/// Standard result type for all bond-pricer operations
pub type PricerResult<T> = Result<T, PricerError>;
