pub mod amortization;
pub mod client;
pub mod config;
pub mod error;
pub mod schedule;
pub mod types;

#[cfg(feature = "treasury")]
pub mod treasury;

#[cfg(feature = "ledger")]
pub mod ledger;

#[cfg(feature = "redirection")]
pub mod redirection;

#[cfg(feature = "lending")]
pub mod lending;

pub use error::LendingError;
pub use types::*;

/// Standard result type for all lending operations
pub type LendingResult<T> = Result<T, LendingError>;
