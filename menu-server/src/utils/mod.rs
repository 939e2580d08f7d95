//! Utilities
//!
//! Error types, response envelope and logging setup.

pub mod error;
pub mod logger;

pub use error::{AppError, AppResponse};

/// Application result type
pub type AppResult<T> = Result<T, AppError>;
