//! Convenience result type alias for Mailgate.

use crate::error::AppError;

/// A specialized `Result` type for Mailgate operations.
pub type AppResult<T> = Result<T, AppError>;
