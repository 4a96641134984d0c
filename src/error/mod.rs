//! The unified error handling system for the application.

pub use store_api::StoreApiError;
pub use types::AppError;

/// A unified `Result` type for the entire application.
///
/// All functions that can fail should return this type.
pub type Result<T> = std::result::Result<T, AppError>;

pub mod store_api;
pub mod types;

#[cfg(test)]
mod tests;
