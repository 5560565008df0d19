//! Generic job handler with type-safe parameters

use async_trait::async_trait;
use freight_types::chrono::{DateTime, Utc};

use crate::jobs::types::JobResult;

/// Generic trait for job handlers with typed parameters
#[async_trait]
pub trait GenericJobHandler<T>: Send + Sync {
	async fn handle(&self, params: T) -> JobResult<()>;
}

/// Parameters shared by the expiry sweeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepParams {
	/// Records overdue at this instant are expired
	pub as_of: DateTime<Utc>,
}

impl SweepParams {
	pub fn new(as_of: DateTime<Utc>) -> Self {
		Self { as_of }
	}

	pub fn now() -> Self {
		Self::new(Utc::now())
	}
}
