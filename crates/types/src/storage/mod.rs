//! Storage error types shared by storage backends

pub mod errors;

pub use errors::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
