//! Pricing service
//!
//! Wraps the pure engine with configuration lookups and administrator updates.

pub mod config_provider;
pub mod distances;
pub mod engine;

use std::sync::Arc;

use async_trait::async_trait;
use freight_storage::Storage;
use freight_types::chrono::Utc;
use freight_types::{
	CountryDistance, EstimateResult, InvalidShipmentError, PricingConfig, PricingConfigError,
	ShipmentInput,
};
use thiserror::Error;
use tracing::info;

pub use config_provider::{CachedConfigProvider, ConfigProvider, DistanceLookup};
pub use engine::PricingEngine;

#[derive(Debug, Error)]
pub enum PricingError {
	#[error(transparent)]
	InvalidShipment(#[from] InvalidShipmentError),
	#[error(transparent)]
	InvalidConfig(#[from] PricingConfigError),
	#[error("invalid distance: {0}")]
	InvalidDistance(String),
	#[error("storage error: {0}")]
	Storage(String),
}

/// Trait for pricing operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PricingServiceTrait: Send + Sync {
	/// Price a shipment with the current configuration and attach route information
	async fn estimate(&self, shipment: &ShipmentInput) -> Result<EstimateResult, PricingError>;
}

#[derive(Clone)]
pub struct PricingService {
	storage: Arc<dyn Storage>,
	provider: Arc<dyn ConfigProvider>,
	engine: PricingEngine,
}

impl PricingService {
	pub fn new(storage: Arc<dyn Storage>, provider: Arc<dyn ConfigProvider>) -> Self {
		Self {
			storage,
			provider,
			engine: PricingEngine::new(),
		}
	}

	/// Validate, version and persist a new configuration, then drop cached copies
	pub async fn update_pricing_config(
		&self,
		mut config: PricingConfig,
	) -> Result<PricingConfig, PricingError> {
		config.validate()?;
		config.currency = config.currency.to_uppercase();

		let current_version = self
			.storage
			.get_pricing_config()
			.await
			.map_err(|e| PricingError::Storage(e.to_string()))?
			.map(|c| c.version)
			.unwrap_or(0);
		config.version = current_version + 1;
		config.updated_at = Utc::now();

		self.storage
			.save_pricing_config(config.clone())
			.await
			.map_err(|e| PricingError::Storage(e.to_string()))?;
		self.provider.invalidate();

		info!("Pricing configuration updated to version {}", config.version);
		Ok(config)
	}

	/// Stored configuration, bypassing the cache; the defaults when none is stored
	pub async fn current_pricing_config(&self) -> Result<PricingConfig, PricingError> {
		Ok(self
			.storage
			.get_pricing_config()
			.await
			.map_err(|e| PricingError::Storage(e.to_string()))?
			.unwrap_or_default())
	}

	/// Create or replace the distance for an ordered country pair
	pub async fn upsert_distance(
		&self,
		origin: &str,
		destination: &str,
		distance_km: u32,
	) -> Result<CountryDistance, PricingError> {
		for code in [origin, destination] {
			let code = code.trim();
			if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
				return Err(PricingError::InvalidDistance(format!(
					"'{}' is not a two-letter country code",
					code
				)));
			}
		}
		if distance_km == 0 {
			return Err(PricingError::InvalidDistance(
				"distance must be greater than zero".to_string(),
			));
		}

		let distance = CountryDistance::new(origin, destination, distance_km);
		self.storage
			.upsert_distance(distance.clone())
			.await
			.map_err(|e| PricingError::Storage(e.to_string()))?;
		self.provider.invalidate();

		info!(
			"Distance {}->{} set to {} km",
			distance.origin, distance.destination, distance.distance_km
		);
		Ok(distance)
	}
}

#[async_trait]
impl PricingServiceTrait for PricingService {
	async fn estimate(&self, shipment: &ShipmentInput) -> Result<EstimateResult, PricingError> {
		let mut shipment = shipment.clone();
		shipment.normalize();

		let config = self.provider.pricing_config().await;
		let estimate = self.engine.compute_estimate(&shipment, &config)?;
		let route = self
			.provider
			.distance_km(&shipment.origin_country, &shipment.destination_country)
			.await;

		Ok(estimate.with_route(route.into()))
	}
}
