//! Job handler implementations organized by functionality

use async_trait::async_trait;
use std::sync::Arc;

use crate::lifecycle::QuoteLifecycleTrait;
use crate::prospects::ProspectServiceTrait;

use super::generic_handler::{GenericJobHandler, SweepParams};
use super::processor::JobHandler;
use super::types::{BackgroundJob, JobResult};

pub mod prospect_expiry;
pub mod quote_expiry;

pub use prospect_expiry::ProspectExpiryHandler;
pub use quote_expiry::QuoteExpiryHandler;

/// Routes each background job to its handler
pub struct BackgroundJobHandler {
	quote_expiry_handler: QuoteExpiryHandler,
	prospect_expiry_handler: ProspectExpiryHandler,
}

impl BackgroundJobHandler {
	pub fn new(
		lifecycle: Arc<dyn QuoteLifecycleTrait>,
		prospects: Arc<dyn ProspectServiceTrait>,
	) -> Self {
		Self {
			quote_expiry_handler: QuoteExpiryHandler::new(lifecycle),
			prospect_expiry_handler: ProspectExpiryHandler::new(prospects),
		}
	}
}

#[async_trait]
impl JobHandler for BackgroundJobHandler {
	async fn handle(&self, job: BackgroundJob) -> JobResult {
		match job {
			BackgroundJob::ExpireOverdueQuotes => {
				self.quote_expiry_handler.handle(SweepParams::now()).await
			},
			BackgroundJob::ExpireStaleProspects => {
				self.prospect_expiry_handler.handle(SweepParams::now()).await
			},
		}
	}
}
