//! Background job types and definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during job processing
#[derive(Debug, Error)]
pub enum JobError {
	#[error("Job processing failed: {message}")]
	ProcessingFailed { message: String },

	#[error("Job with ID '{id}' is already scheduled")]
	Duplicate { id: String },

	#[error("Storage error: {0}")]
	Storage(String),

	#[error("Invalid job configuration: {0}")]
	InvalidConfig(String),
}

/// Result type for job operations
pub type JobResult<T = ()> = Result<T, JobError>;

/// Maintenance sweeps run in the background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackgroundJob {
	/// Move overdue SENT/ACCEPTED quotes to EXPIRED
	ExpireOverdueQuotes,

	/// Mark pending prospects whose invitation lapsed as EXPIRED
	ExpireStaleProspects,
}

impl BackgroundJob {
	/// Get a human-readable description of the job
	pub fn description(&self) -> String {
		match self {
			BackgroundJob::ExpireOverdueQuotes => "Expire overdue quotes".to_string(),
			BackgroundJob::ExpireStaleProspects => "Expire stale prospects".to_string(),
		}
	}

	/// Stable schedule id, also used to keep runs from overlapping
	pub fn schedule_id(&self) -> &'static str {
		match self {
			BackgroundJob::ExpireOverdueQuotes => "quote-expiry-sweep",
			BackgroundJob::ExpireStaleProspects => "prospect-expiry-sweep",
		}
	}
}
