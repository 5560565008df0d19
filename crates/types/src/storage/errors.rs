//! Error types for storage operations

use thiserror::Error;

/// Storage error type
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
	#[error("Item not found: {id}")]
	NotFound { id: String },
	#[error("Item already exists: {id}")]
	AlreadyExists { id: String },
	#[error("Concurrent modification of {id}: expected version {expected}, found {actual}")]
	Conflict {
		id: String,
		expected: u64,
		actual: u64,
	},
	#[error("Connection error: {message}")]
	Connection { message: String },
	#[error("Serialization error: {message}")]
	Serialization { message: String },
	#[error("Storage operation failed: {message}")]
	Operation { message: String },
}

impl StorageError {
	/// Failures of the backing store itself, as opposed to data-level outcomes
	pub fn is_infrastructure(&self) -> bool {
		matches!(
			self,
			StorageError::Connection { .. }
				| StorageError::Serialization { .. }
				| StorageError::Operation { .. }
		)
	}
}
