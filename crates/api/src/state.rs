use std::sync::Arc;

use freight_service::{PricingService, ProspectService, QuoteLifecycle, ReconciliationService};
use freight_storage::Storage;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
	pub pricing_service: Arc<PricingService>,
	pub quote_lifecycle: Arc<QuoteLifecycle>,
	pub prospect_service: Arc<ProspectService>,
	pub reconciliation_service: Arc<ReconciliationService>,
	pub storage: Arc<dyn Storage>,
}
