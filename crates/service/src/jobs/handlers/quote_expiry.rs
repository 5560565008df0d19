//! Quote expiry sweep handler

use async_trait::async_trait;
use std::sync::Arc;

use crate::jobs::generic_handler::{GenericJobHandler, SweepParams};
use crate::jobs::types::{JobError, JobResult};
use crate::lifecycle::{LifecycleError, QuoteLifecycleTrait};

/// Expires SENT/ACCEPTED quotes whose validity window has elapsed
pub struct QuoteExpiryHandler {
	lifecycle: Arc<dyn QuoteLifecycleTrait>,
}

impl QuoteExpiryHandler {
	pub fn new(lifecycle: Arc<dyn QuoteLifecycleTrait>) -> Self {
		Self { lifecycle }
	}
}

#[async_trait]
impl GenericJobHandler<SweepParams> for QuoteExpiryHandler {
	async fn handle(&self, params: SweepParams) -> JobResult<()> {
		match self.lifecycle.expire_overdue(params.as_of).await {
			Ok(expired) => {
				tracing::debug!("Quote expiry sweep finished: {} expired", expired);
				Ok(())
			},
			Err(LifecycleError::Storage(e)) => {
				let error_msg = format!("Storage error during quote expiry: {}", e);
				tracing::error!("{}", error_msg);
				Err(JobError::Storage(error_msg))
			},
			Err(e) => {
				let error_msg = format!("Quote expiry failed: {}", e);
				tracing::error!("{}", error_msg);
				Err(JobError::ProcessingFailed { message: error_msg })
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::lifecycle::MockQuoteLifecycleTrait;
	use freight_types::chrono::Utc;

	#[tokio::test]
	async fn test_quote_expiry_handler_passes_sweep_instant() {
		let as_of = Utc::now();
		let mut lifecycle = MockQuoteLifecycleTrait::new();
		lifecycle
			.expect_expire_overdue()
			.with(mockall::predicate::eq(as_of))
			.times(1)
			.returning(|_| Ok(3));

		let handler = QuoteExpiryHandler::new(Arc::new(lifecycle));
		assert!(handler.handle(SweepParams::new(as_of)).await.is_ok());
	}

	#[tokio::test]
	async fn test_quote_expiry_handler_storage_error() {
		let mut lifecycle = MockQuoteLifecycleTrait::new();
		lifecycle
			.expect_expire_overdue()
			.returning(|_| Err(LifecycleError::Storage("store offline".to_string())));

		let handler = QuoteExpiryHandler::new(Arc::new(lifecycle));
		match handler.handle(SweepParams::now()).await {
			Err(JobError::Storage(msg)) => assert!(msg.contains("store offline")),
			other => panic!("Expected Storage error, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_quote_expiry_handler_other_error() {
		let mut lifecycle = MockQuoteLifecycleTrait::new();
		lifecycle
			.expect_expire_overdue()
			.returning(|_| Err(LifecycleError::NotFound("q-1".to_string())));

		let handler = QuoteExpiryHandler::new(Arc::new(lifecycle));
		assert!(matches!(
			handler.handle(SweepParams::now()).await,
			Err(JobError::ProcessingFailed { .. })
		));
	}
}
