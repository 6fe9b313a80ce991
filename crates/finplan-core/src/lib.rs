pub mod error;
pub mod policy;
pub mod tax;
pub mod types;

#[cfg(feature = "retirement")]
pub mod retirement;

#[cfg(feature = "mortgage")]
pub mod mortgage;

pub use error::FinPlanError;
pub use types::*;

/// Standard result type for all projection operations
pub type FinPlanResult<T> = Result<T, FinPlanError>;
