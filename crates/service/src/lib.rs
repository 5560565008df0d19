//! Freight Service
//!
//! Pricing, quote lifecycle, token, prospect and reconciliation services, plus
//! the background sweeps that keep expiry up to date.

pub mod jobs;
pub mod lifecycle;
pub mod notifier;
pub mod pricing;
pub mod prospects;
pub mod reconciliation;
pub mod tokens;

pub use lifecycle::{LifecycleError, LifecyclePolicy, QuoteLifecycle, QuoteLifecycleTrait};
pub use notifier::{
	dispatch, ChannelNotifier, EventNotifier, LoggingNotifier, NotifyError, NOTIFICATION_TARGET,
};
pub use pricing::{
	CachedConfigProvider, ConfigProvider, DistanceLookup, PricingEngine, PricingError,
	PricingService, PricingServiceTrait,
};
pub use prospects::{ProspectError, ProspectService, ProspectServiceTrait};
pub use reconciliation::{
	OrphanRepository, PickupOrphans, PurchaseOrphans, QuoteOrphans, ReconciliationError,
	ReconciliationResult, ReconciliationService,
};
pub use tokens::TokenService;
