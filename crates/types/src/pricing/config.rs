//! Pricing parameters and inter-country distances

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use super::{CargoType, Priority, TransportMode};

/// Transit time range for a transport mode, in days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryWindow {
	pub min_days: u32,
	pub max_days: u32,
}

impl DeliveryWindow {
	pub fn new(min_days: u32, max_days: u32) -> Self {
		Self { min_days, max_days }
	}
}

/// Errors raised when an administrator submits an invalid pricing configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingConfigError {
	#[error("Invalid currency code: '{0}' (expected three letters)")]
	InvalidCurrency(String),

	#[error("Rate must be greater than zero: {field} = {value}")]
	NonPositiveRate { field: String, value: Decimal },

	#[error("Multiplier for {mode} must be greater than zero (got {value})")]
	NonPositiveMultiplier { mode: TransportMode, value: Decimal },

	#[error("Volumetric ratio for {mode} must be greater than zero (got {value})")]
	NonPositiveRatio { mode: TransportMode, value: Decimal },

	#[error("Surcharge for {key} must be greater than -1 (got {value})")]
	SurchargeOutOfRange { key: String, value: Decimal },

	#[error("Delivery window for {mode} is inverted: {min_days} > {max_days}")]
	InvertedDeliveryWindow {
		mode: TransportMode,
		min_days: u32,
		max_days: u32,
	},
}

/// Process-wide pricing parameters.
///
/// Maps are keyed by enum so a partially configured record is representable; the
/// pricing engine falls back to [`PricingConfig::default`] for missing entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
	#[serde(default)]
	pub version: u32,
	pub currency: String,
	pub default_rate_per_kg: Decimal,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default_rate_per_m3: Option<Decimal>,
	#[serde(default)]
	pub mode_multipliers: BTreeMap<TransportMode, Decimal>,
	#[serde(default)]
	pub cargo_surcharges: BTreeMap<CargoType, Decimal>,
	#[serde(default)]
	pub priority_surcharges: BTreeMap<Priority, Decimal>,
	#[serde(default)]
	pub volumetric_ratios: BTreeMap<TransportMode, Decimal>,
	#[serde(default)]
	pub volumetric_enabled: BTreeMap<TransportMode, bool>,
	#[serde(default)]
	pub delivery_days: BTreeMap<TransportMode, DeliveryWindow>,
	#[serde(default = "Utc::now")]
	pub updated_at: DateTime<Utc>,
}

impl Default for PricingConfig {
	fn default() -> Self {
		Self {
			version: 0,
			currency: "EUR".to_string(),
			default_rate_per_kg: Decimal::ONE,
			default_rate_per_m3: Some(Decimal::from(250)),
			mode_multipliers: BTreeMap::from([
				(TransportMode::Road, Decimal::ONE),
				(TransportMode::Sea, Decimal::new(6, 1)),
				(TransportMode::Air, Decimal::from(3)),
				(TransportMode::Rail, Decimal::new(8, 1)),
			]),
			cargo_surcharges: BTreeMap::from([
				(CargoType::General, Decimal::ZERO),
				(CargoType::Fragile, Decimal::new(3, 1)),
				(CargoType::Perishable, Decimal::new(4, 1)),
				(CargoType::Dangerous, Decimal::new(5, 1)),
				(CargoType::Oversized, Decimal::new(25, 2)),
			]),
			priority_surcharges: BTreeMap::from([
				(Priority::Standard, Decimal::ZERO),
				(Priority::Express, Decimal::new(5, 1)),
				(Priority::Urgent, Decimal::ONE),
			]),
			// cm³ per kg
			volumetric_ratios: BTreeMap::from([
				(TransportMode::Road, Decimal::from(5000)),
				(TransportMode::Sea, Decimal::from(1000)),
				(TransportMode::Air, Decimal::from(6000)),
				(TransportMode::Rail, Decimal::from(5000)),
			]),
			// Sea freight is charged weight-or-measure on actual weight
			volumetric_enabled: BTreeMap::from([
				(TransportMode::Road, true),
				(TransportMode::Sea, false),
				(TransportMode::Air, true),
				(TransportMode::Rail, true),
			]),
			delivery_days: BTreeMap::from([
				(TransportMode::Road, DeliveryWindow::new(3, 7)),
				(TransportMode::Sea, DeliveryWindow::new(20, 45)),
				(TransportMode::Air, DeliveryWindow::new(1, 3)),
				(TransportMode::Rail, DeliveryWindow::new(10, 20)),
			]),
			updated_at: DateTime::<Utc>::UNIX_EPOCH,
		}
	}
}

impl PricingConfig {
	/// Validate a configuration submitted by an administrator
	pub fn validate(&self) -> Result<(), PricingConfigError> {
		if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
			return Err(PricingConfigError::InvalidCurrency(self.currency.clone()));
		}
		if self.default_rate_per_kg <= Decimal::ZERO {
			return Err(PricingConfigError::NonPositiveRate {
				field: "defaultRatePerKg".to_string(),
				value: self.default_rate_per_kg,
			});
		}
		if let Some(rate) = self.default_rate_per_m3 {
			if rate <= Decimal::ZERO {
				return Err(PricingConfigError::NonPositiveRate {
					field: "defaultRatePerM3".to_string(),
					value: rate,
				});
			}
		}
		for (mode, value) in &self.mode_multipliers {
			if *value <= Decimal::ZERO {
				return Err(PricingConfigError::NonPositiveMultiplier {
					mode: *mode,
					value: *value,
				});
			}
		}
		for (mode, value) in &self.volumetric_ratios {
			if *value <= Decimal::ZERO {
				return Err(PricingConfigError::NonPositiveRatio {
					mode: *mode,
					value: *value,
				});
			}
		}
		let surcharges = self
			.cargo_surcharges
			.iter()
			.map(|(k, v)| (k.as_str(), *v))
			.chain(self.priority_surcharges.iter().map(|(k, v)| (k.as_str(), *v)));
		for (key, value) in surcharges {
			if value <= Decimal::NEGATIVE_ONE {
				return Err(PricingConfigError::SurchargeOutOfRange {
					key: key.to_string(),
					value,
				});
			}
		}
		for (mode, window) in &self.delivery_days {
			if window.min_days > window.max_days {
				return Err(PricingConfigError::InvertedDeliveryWindow {
					mode: *mode,
					min_days: window.min_days,
					max_days: window.max_days,
				});
			}
		}
		Ok(())
	}

	/// A flat configuration (every multiplier 1, no surcharges) at the given per-kg rate
	pub fn flat(rate_per_kg: Decimal) -> Self {
		let mut config = Self {
			default_rate_per_kg: rate_per_kg,
			..Self::default()
		};
		for mode in TransportMode::ALL {
			config.mode_multipliers.insert(mode, Decimal::ONE);
		}
		for cargo in CargoType::ALL {
			config.cargo_surcharges.insert(cargo, Decimal::ZERO);
		}
		for priority in Priority::ALL {
			config.priority_surcharges.insert(priority, Decimal::ZERO);
		}
		config
	}
}

/// Distance between an ordered pair of countries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryDistance {
	pub origin: String,
	pub destination: String,
	pub distance_km: u32,
	pub updated_at: DateTime<Utc>,
}

impl CountryDistance {
	pub fn new(origin: &str, destination: &str, distance_km: u32) -> Self {
		Self {
			origin: origin.trim().to_uppercase(),
			destination: destination.trim().to_uppercase(),
			distance_km,
			updated_at: Utc::now(),
		}
	}

	pub fn key(&self) -> (String, String) {
		(self.origin.clone(), self.destination.clone())
	}
}
