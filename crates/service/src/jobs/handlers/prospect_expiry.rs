//! Prospect expiry sweep handler

use async_trait::async_trait;
use std::sync::Arc;

use crate::jobs::generic_handler::{GenericJobHandler, SweepParams};
use crate::jobs::types::{JobError, JobResult};
use crate::prospects::{ProspectError, ProspectServiceTrait};

/// Marks pending prospects with a lapsed invitation as expired
pub struct ProspectExpiryHandler {
	prospects: Arc<dyn ProspectServiceTrait>,
}

impl ProspectExpiryHandler {
	pub fn new(prospects: Arc<dyn ProspectServiceTrait>) -> Self {
		Self { prospects }
	}
}

#[async_trait]
impl GenericJobHandler<SweepParams> for ProspectExpiryHandler {
	async fn handle(&self, params: SweepParams) -> JobResult<()> {
		match self.prospects.expire_stale(params.as_of).await {
			Ok(expired) => {
				tracing::debug!("Prospect expiry sweep finished: {} expired", expired);
				Ok(())
			},
			Err(ProspectError::Storage(e)) => {
				let error_msg = format!("Storage error during prospect expiry: {}", e);
				tracing::error!("{}", error_msg);
				Err(JobError::Storage(error_msg))
			},
			Err(e) => Err(JobError::ProcessingFailed {
				message: format!("Prospect expiry failed: {}", e),
			}),
		}
	}
}
