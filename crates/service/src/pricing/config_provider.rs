//! Cached access to pricing parameters and country distances
//!
//! Reads never fail: a missing or unreachable store resolves to the hard-coded
//! defaults, logged as degraded input.

use async_trait::async_trait;
use dashmap::DashMap;
use freight_storage::Storage;
use freight_types::{DistanceSource, PricingConfig, RouteInfo};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::distances::static_distance_km;

/// Default cache lifetime for pricing data
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Distance used when a route is neither configured nor in the static table
pub const DEFAULT_DISTANCE_KM: u32 = 5000;

/// Distance between two countries and where it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceLookup {
	pub distance_km: u32,
	pub source: DistanceSource,
}

impl From<DistanceLookup> for RouteInfo {
	fn from(lookup: DistanceLookup) -> Self {
		RouteInfo {
			distance_km: lookup.distance_km,
			distance_source: lookup.source,
		}
	}
}

/// Source of pricing parameters and distances
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigProvider: Send + Sync {
	/// Current pricing configuration, falling back to the defaults
	async fn pricing_config(&self) -> PricingConfig;

	/// Distance for the ordered pair, falling back to the static table then a constant
	async fn distance_km(&self, origin: &str, destination: &str) -> DistanceLookup;

	/// Drop every cached entry
	fn invalidate(&self);
}

#[derive(Debug, Clone)]
struct Cached<T> {
	value: T,
	loaded_at: Instant,
}

impl<T: Clone> Cached<T> {
	fn new(value: T) -> Self {
		Self {
			value,
			loaded_at: Instant::now(),
		}
	}

	fn fresh(&self, ttl: Duration) -> Option<T> {
		(self.loaded_at.elapsed() < ttl).then(|| self.value.clone())
	}
}

/// Store-backed provider with a time-boxed cache
pub struct CachedConfigProvider {
	storage: Arc<dyn Storage>,
	ttl: Duration,
	default_distance_km: u32,
	config: RwLock<Option<Cached<PricingConfig>>>,
	distances: DashMap<(String, String), Cached<DistanceLookup>>,
}

impl CachedConfigProvider {
	pub fn new(storage: Arc<dyn Storage>) -> Self {
		Self::with_settings(storage, DEFAULT_CACHE_TTL, DEFAULT_DISTANCE_KM)
	}

	pub fn with_settings(storage: Arc<dyn Storage>, ttl: Duration, default_distance_km: u32) -> Self {
		Self {
			storage,
			ttl,
			default_distance_km,
			config: RwLock::new(None),
			distances: DashMap::new(),
		}
	}

	fn cached_config(&self) -> Option<PricingConfig> {
		let guard = self.config.read().ok()?;
		guard.as_ref().and_then(|c| c.fresh(self.ttl))
	}

	fn store_config(&self, config: &PricingConfig) {
		if let Ok(mut guard) = self.config.write() {
			*guard = Some(Cached::new(config.clone()));
		}
	}

	async fn load_distance(&self, origin: &str, destination: &str) -> DistanceLookup {
		match self.storage.get_distance(origin, destination).await {
			Ok(Some(distance)) => {
				return DistanceLookup {
					distance_km: distance.distance_km,
					source: DistanceSource::Configured,
				}
			},
			Ok(None) => {},
			Err(e) => warn!(
				"Distance lookup for {}->{} failed, using fallback: {}",
				origin, destination, e
			),
		}

		if let Some(km) = static_distance_km(origin, destination) {
			return DistanceLookup {
				distance_km: km,
				source: DistanceSource::StaticTable,
			};
		}

		warn!(
			"No distance known for {}->{}, using default of {} km",
			origin, destination, self.default_distance_km
		);
		DistanceLookup {
			distance_km: self.default_distance_km,
			source: DistanceSource::Default,
		}
	}
}

#[async_trait]
impl ConfigProvider for CachedConfigProvider {
	async fn pricing_config(&self) -> PricingConfig {
		if let Some(config) = self.cached_config() {
			return config;
		}

		match self.storage.get_pricing_config().await {
			Ok(Some(config)) => {
				debug!("Loaded pricing configuration version {}", config.version);
				self.store_config(&config);
				config
			},
			Ok(None) => {
				warn!("No pricing configuration stored, using built-in defaults");
				let config = PricingConfig::default();
				self.store_config(&config);
				config
			},
			Err(e) => {
				// Not cached, so the next read retries the store
				warn!("Pricing configuration unavailable, using built-in defaults: {}", e);
				PricingConfig::default()
			},
		}
	}

	async fn distance_km(&self, origin: &str, destination: &str) -> DistanceLookup {
		let key = (origin.trim().to_uppercase(), destination.trim().to_uppercase());
		if let Some(hit) = self.distances.get(&key).and_then(|c| c.fresh(self.ttl)) {
			return hit;
		}
		let lookup = self.load_distance(&key.0, &key.1).await;
		self.distances.insert(key, Cached::new(lookup));
		lookup
	}

	fn invalidate(&self) {
		if let Ok(mut guard) = self.config.write() {
			*guard = None;
		}
		self.distances.clear();
		debug!("Pricing configuration cache invalidated");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use freight_storage::{MemoryStore, PricingConfigStorage};
	use freight_types::rust_decimal::Decimal;
	use freight_types::CountryDistance;

	fn provider(store: &Arc<MemoryStore>) -> CachedConfigProvider {
		CachedConfigProvider::new(Arc::clone(store) as Arc<dyn Storage>)
	}

	#[tokio::test]
	async fn test_defaults_when_store_is_empty() {
		let store = Arc::new(MemoryStore::new());
		let config = provider(&store).pricing_config().await;
		assert_eq!(config, PricingConfig::default());
	}

	#[tokio::test]
	async fn test_cache_serves_stale_until_invalidated() {
		let store = Arc::new(MemoryStore::new());
		let provider = provider(&store);
		let first = PricingConfig {
			version: 1,
			..PricingConfig::default()
		};
		store.save_pricing_config(first).await.unwrap();
		assert_eq!(provider.pricing_config().await.version, 1);

		let second = PricingConfig {
			version: 2,
			default_rate_per_kg: Decimal::from(2),
			..PricingConfig::default()
		};
		store.save_pricing_config(second).await.unwrap();
		assert_eq!(provider.pricing_config().await.version, 1);

		provider.invalidate();
		assert_eq!(provider.pricing_config().await.version, 2);
	}

	#[tokio::test]
	async fn test_zero_ttl_always_reloads() {
		let store = Arc::new(MemoryStore::new());
		let provider = CachedConfigProvider::with_settings(
			Arc::clone(&store) as Arc<dyn Storage>,
			Duration::ZERO,
			DEFAULT_DISTANCE_KM,
		);
		assert_eq!(provider.pricing_config().await.version, 0);
		store
			.save_pricing_config(PricingConfig {
				version: 7,
				..PricingConfig::default()
			})
			.await
			.unwrap();
		assert_eq!(provider.pricing_config().await.version, 7);
	}

	#[tokio::test]
	async fn test_distance_fallback_chain() {
		let store = Arc::new(MemoryStore::new());
		store
			.upsert_distance(CountryDistance::new("FR", "DE", 999))
			.await
			.unwrap();
		let provider = CachedConfigProvider::with_settings(
			Arc::clone(&store) as Arc<dyn Storage>,
			DEFAULT_CACHE_TTL,
			4321,
		);

		let configured = provider.distance_km("fr", "de").await;
		assert_eq!(configured.distance_km, 999);
		assert_eq!(configured.source, DistanceSource::Configured);

		let table = provider.distance_km("DE", "FR").await;
		assert_eq!(table.distance_km, 1050);
		assert_eq!(table.source, DistanceSource::StaticTable);

		let fallback = provider.distance_km("XX", "YY").await;
		assert_eq!(fallback.distance_km, 4321);
		assert_eq!(fallback.source, DistanceSource::Default);
	}
}
