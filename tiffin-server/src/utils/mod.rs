//! Cross-cutting helpers: error envelope, validation, logging

pub mod error;
pub mod logger;
pub mod validation;

pub use error::{AppError, AppResponse, AppResult, ok};
