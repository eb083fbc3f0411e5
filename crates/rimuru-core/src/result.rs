//! Convenience result type alias for Rimuru.

use crate::error::AppError;

/// A specialized `Result` type for Rimuru operations.
///
/// Hook handlers return this from `invoke`, so an `Err` here is what the
/// dispatcher records as a handler failure.
pub type AppResult<T> = Result<T, AppError>;
