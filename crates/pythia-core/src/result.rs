//! Convenience result type alias for Pythia.

use crate::error::AppError;

/// A specialized `Result` type for Pythia operations.
pub type AppResult<T> = Result<T, AppError>;
