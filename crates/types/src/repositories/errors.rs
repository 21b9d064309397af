//! Error types for collaborator repositories

use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
	#[error("Network error: {0}")]
	Network(String),

	#[error("Request timed out")]
	Timeout,

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Unsupported chain: {0}")]
	UnsupportedChain(String),

	#[error("Selection channel closed")]
	ChannelClosed,

	#[error("Storage error: {0}")]
	Storage(String),

	#[error("{0}")]
	Other(String),
}

impl From<StorageError> for RepositoryError {
	fn from(error: StorageError) -> Self {
		match error {
			StorageError::NotFound { id } => RepositoryError::NotFound(id),
			other => RepositoryError::Storage(other.to_string()),
		}
	}
}
