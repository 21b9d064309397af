//! Error types for storage operations

use thiserror::Error;

/// Storage error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
	#[error("Item not found: {id}")]
	NotFound { id: String },
	#[error("Item already exists: {id}")]
	AlreadyExists { id: String },
	#[error("Storage operation failed: {message}")]
	Operation { message: String },
}
