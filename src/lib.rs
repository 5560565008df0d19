//! Freight Quoter Library
//!
//! Freight pricing and quote management served over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use freight_service::jobs::{BackgroundJob, BackgroundJobHandler, JobProcessor, JobProcessorConfig};
use tracing::{info, warn};

// Core domain types
pub use freight_types::{
	chrono, rust_decimal, serde_json, Actor, ContactIdentity, ContactSnapshot, CountryDistance,
	DomainEvent, EstimateResult, EventName, NewQuote, Prospect, ProspectRequest, Quote,
	QuoteSnapshot, QuoteStatus, ShipmentInput, TransitionAction, TransitionPayload,
	TransitionRecord,
};

// Service layer
pub use freight_service::{
	CachedConfigProvider, ChannelNotifier, EventNotifier, LifecycleError, LifecyclePolicy,
	LoggingNotifier, PricingError, PricingService, PricingServiceTrait, ProspectError,
	ProspectService, ProspectServiceTrait, QuoteLifecycle, QuoteLifecycleTrait,
	ReconciliationError, ReconciliationResult, ReconciliationService, TokenService,
};

// Storage layer
pub use freight_storage::{MemoryStore, Storage, StorageError, StorageResult};

// API layer
pub use freight_api::{create_router, AppState};

// Config
pub use freight_config::{
	load_config, log_service_info, log_service_shutdown, log_settings_summary,
	log_startup_complete, LogFormat, Settings,
};

pub mod service {
	pub use freight_service::*;
}

pub mod models {
	pub use freight_types::*;
}

/// Builder wiring storage, services and the HTTP router
pub struct QuoterBuilder<S = MemoryStore>
where
	S: Storage + Clone + 'static,
{
	settings: Option<Settings>,
	storage: S,
	notifier: Option<Arc<dyn EventNotifier>>,
	distances: Vec<(String, String, u32)>,
}

impl Default for QuoterBuilder<MemoryStore> {
	fn default() -> Self {
		Self::new()
	}
}

impl QuoterBuilder<MemoryStore> {
	/// Create a builder backed by the in-memory store
	pub fn new() -> Self {
		Self::with_storage(MemoryStore::new())
	}
}

impl<S> QuoterBuilder<S>
where
	S: Storage + Clone + 'static,
{
	pub fn with_storage(storage: S) -> Self {
		Self {
			settings: None,
			storage,
			notifier: None,
			distances: Vec::new(),
		}
	}

	/// Set custom settings
	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Route domain events somewhere other than the log
	pub fn with_notifier(mut self, notifier: Arc<dyn EventNotifier>) -> Self {
		self.notifier = Some(notifier);
		self
	}

	/// Seed a country-pair distance at startup
	pub fn with_distance(mut self, origin: &str, destination: &str, distance_km: u32) -> Self {
		self.distances
			.push((origin.to_string(), destination.to_string(), distance_km));
		self
	}

	pub fn settings(&self) -> Option<&Settings> {
		self.settings.as_ref()
	}

	/// Initialize tracing with configuration-based settings
	fn init_tracing_from_settings(settings: &Settings) {
		let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.level));

		// try_init: a subscriber may already be installed by an embedding process
		let installed = match settings.logging.format {
			LogFormat::Json => {
				let subscriber = tracing_subscriber::fmt().json().with_env_filter(env_filter);
				if settings.logging.structured {
					subscriber.with_target(true).with_thread_ids(true).try_init()
				} else {
					subscriber.try_init()
				}
			},
			LogFormat::Pretty => {
				let subscriber = tracing_subscriber::fmt()
					.pretty()
					.with_env_filter(env_filter);
				if settings.logging.structured {
					subscriber.with_target(true).with_thread_ids(true).try_init()
				} else {
					subscriber.try_init()
				}
			},
			LogFormat::Compact => {
				let subscriber = tracing_subscriber::fmt()
					.compact()
					.with_env_filter(env_filter);
				if settings.logging.structured {
					subscriber.with_target(true).with_thread_ids(true).try_init()
				} else {
					subscriber.try_init()
				}
			},
		};
		if installed.is_err() {
			warn!("Tracing subscriber already installed; keeping the existing one");
		}

		info!(
			"Logging configuration applied: level={}, format={:?}, structured={}",
			settings.logging.level, settings.logging.format, settings.logging.structured
		);
	}

	/// Build the services and return the router with its state
	pub async fn start(self) -> Result<(axum::Router, AppState), Box<dyn std::error::Error>> {
		let settings = self.settings.clone().unwrap_or_default();
		let storage: Arc<dyn Storage> = Arc::new(self.storage.clone());
		let notifier = self
			.notifier
			.clone()
			.unwrap_or_else(|| Arc::new(LoggingNotifier) as Arc<dyn EventNotifier>);

		let provider = Arc::new(CachedConfigProvider::with_settings(
			Arc::clone(&storage),
			Duration::from_secs(settings.pricing.cache_ttl_seconds),
			settings.pricing.default_distance_km,
		));
		let pricing_service = Arc::new(PricingService::new(Arc::clone(&storage), provider));

		for (origin, destination, distance_km) in &self.distances {
			pricing_service
				.upsert_distance(origin, destination, *distance_km)
				.await
				.map_err(|e| format!("Failed to seed distance {}-{}: {}", origin, destination, e))?;
		}
		if !self.distances.is_empty() {
			info!("Seeded {} country distance(s)", self.distances.len());
		}

		let tokens = TokenService::new(Arc::clone(&storage)).with_ttls(
			chrono::Duration::hours(i64::from(settings.quotes.tracking_token_ttl_hours)),
			chrono::Duration::days(i64::from(settings.prospects.invitation_ttl_days)),
		);
		let policy = LifecyclePolicy {
			number_prefix: settings.quotes.number_prefix.trim().to_string(),
			validity: chrono::Duration::days(i64::from(settings.quotes.validity_days)),
			min_reason_length: settings.quotes.min_reason_length,
		};

		let quote_lifecycle = Arc::new(QuoteLifecycle::new(
			Arc::clone(&storage),
			Arc::clone(&pricing_service) as Arc<dyn PricingServiceTrait>,
			tokens.clone(),
			Arc::clone(&notifier),
			policy,
		));
		let prospect_service = Arc::new(ProspectService::new(
			Arc::clone(&storage),
			tokens,
			Arc::clone(&notifier),
		));
		let reconciliation_service = Arc::new(ReconciliationService::new(
			Arc::clone(&storage),
			Arc::clone(&prospect_service) as Arc<dyn ProspectServiceTrait>,
			notifier,
		));

		let app_state = AppState {
			pricing_service,
			quote_lifecycle,
			prospect_service,
			reconciliation_service,
			storage,
		};

		let router = create_router().with_state(app_state.clone());

		Ok((router, app_state))
	}

	/// Start the complete server:
	/// - Loading .env file
	/// - Loading configuration with defaults
	/// - Initializing tracing
	/// - Scheduling the expiry sweeps
	/// - Binding and serving until ctrl-c
	pub async fn start_server(mut self) -> Result<(), Box<dyn std::error::Error>> {
		dotenvy::dotenv().ok();

		let settings = match self.settings.take() {
			Some(settings) => settings,
			None => load_config()?,
		};

		Self::init_tracing_from_settings(&settings);
		log_service_info();
		log_settings_summary(&settings);

		let bind_addr = settings.bind_address();
		let addr: SocketAddr = bind_addr
			.parse()
			.map_err(|e| format!("Invalid bind address '{}': {}", bind_addr, e))?;

		self.settings = Some(settings.clone());
		let (app, state) = self.start().await?;

		let processor = if settings.jobs.enabled {
			Some(start_sweeps(&settings, &state).await?)
		} else {
			None
		};

		let listener = tokio::net::TcpListener::bind(addr).await?;

		log_startup_complete(&bind_addr);
		info!("API endpoints available:");
		info!("  GET  /health");
		info!("  GET  /ready");
		info!("  POST /api/v1/estimates");
		info!("  POST /api/v1/quotes");
		info!("  GET  /api/v1/quotes/{{id}}");
		info!("  GET  /api/v1/quotes/{{id}}/history");
		info!("  POST /api/v1/quotes/{{id}}/transitions");
		info!("  GET  /api/v1/tracking/{{token}}");
		info!("  POST /api/v1/prospects");
		info!("  GET  /api/v1/invitations/{{token}}");
		info!("  POST /api/v1/accounts/{{account_id}}/reconcile");
		info!("  GET  /api/v1/admin/pricing-config");
		info!("  PUT  /api/v1/admin/pricing-config");
		info!("  PUT  /api/v1/admin/distances");

		axum::serve(listener, app)
			.with_graceful_shutdown(shutdown_signal())
			.await?;

		if let Some(processor) = processor {
			if let Err(e) = processor.shutdown().await {
				warn!("Job processor shutdown failed: {}", e);
			}
		}
		if let Err(e) = state.storage.close().await {
			warn!("Storage close failed: {}", e);
		}
		log_service_shutdown();

		Ok(())
	}
}

/// Schedule the quote and prospect expiry sweeps
async fn start_sweeps(
	settings: &Settings,
	state: &AppState,
) -> Result<JobProcessor, Box<dyn std::error::Error>> {
	let handler = Arc::new(BackgroundJobHandler::new(
		Arc::clone(&state.quote_lifecycle) as Arc<dyn QuoteLifecycleTrait>,
		Arc::clone(&state.prospect_service) as Arc<dyn ProspectServiceTrait>,
	));
	let processor = JobProcessor::new(handler, JobProcessorConfig::default())?;

	let sweeps = [
		(
			BackgroundJob::ExpireOverdueQuotes,
			settings.jobs.quote_expiry_interval_minutes,
		),
		(
			BackgroundJob::ExpireStaleProspects,
			settings.jobs.prospect_expiry_interval_minutes,
		),
	];
	for (job, interval_minutes) in sweeps {
		processor
			.schedule_job(interval_minutes, job, job.description(), job.schedule_id())
			.await?;
	}
	info!(
		"Scheduled {} background sweep(s)",
		processor.get_scheduled_jobs().await.len()
	);

	Ok(processor)
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		warn!("Failed to listen for shutdown signal: {}", e);
		return;
	}
	info!("Shutdown signal received");
}
