//! Shipment description and estimate models used by the pricing engine

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod config;
pub mod errors;

pub use config::{CountryDistance, DeliveryWindow, PricingConfig, PricingConfigError};
pub use errors::InvalidShipmentError;

/// Result type for shipment validation
pub type ShipmentValidationResult<T> = Result<T, InvalidShipmentError>;

/// Maximum number of distinct transport modes a shipment may request
pub const MAX_TRANSPORT_MODES: usize = 4;

/// Upper bounds on shipment inputs. Keep every intermediate product well inside
/// the `Decimal` range.
pub const MAX_PACKAGES: usize = 1_000;
pub const MAX_PACKAGE_QUANTITY: u32 = 10_000;
pub const MAX_UNIT_WEIGHT_KG: i64 = 100_000;
pub const MAX_LINE_WEIGHT_KG: i64 = 1_000_000;
pub const MAX_DIMENSION_CM: i64 = 10_000;
pub const MAX_VOLUME_M3: i64 = 1_000_000;
pub const MAX_UNIT_PRICE: i64 = 1_000_000_000;

const CM3_PER_M3: i64 = 1_000_000;

/// Transport modes offered by the platform.
///
/// Declaration order is the stable enumeration order used to break pricing ties.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportMode {
	Road,
	Sea,
	Air,
	Rail,
}

impl TransportMode {
	pub const ALL: [TransportMode; 4] = [
		TransportMode::Road,
		TransportMode::Sea,
		TransportMode::Air,
		TransportMode::Rail,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			TransportMode::Road => "ROAD",
			TransportMode::Sea => "SEA",
			TransportMode::Air => "AIR",
			TransportMode::Rail => "RAIL",
		}
	}
}

impl fmt::Display for TransportMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for TransportMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_uppercase().as_str() {
			"ROAD" => Ok(TransportMode::Road),
			"SEA" => Ok(TransportMode::Sea),
			"AIR" => Ok(TransportMode::Air),
			"RAIL" => Ok(TransportMode::Rail),
			_ => Err(format!("Unknown transport mode: {s}")),
		}
	}
}

/// Cargo categories, each carrying its own surcharge
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CargoType {
	General,
	Fragile,
	Perishable,
	Dangerous,
	Oversized,
}

impl CargoType {
	pub const ALL: [CargoType; 5] = [
		CargoType::General,
		CargoType::Fragile,
		CargoType::Perishable,
		CargoType::Dangerous,
		CargoType::Oversized,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			CargoType::General => "GENERAL",
			CargoType::Fragile => "FRAGILE",
			CargoType::Perishable => "PERISHABLE",
			CargoType::Dangerous => "DANGEROUS",
			CargoType::Oversized => "OVERSIZED",
		}
	}
}

impl fmt::Display for CargoType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// Service priority tiers
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
	Standard,
	Express,
	Urgent,
}

impl Priority {
	pub const ALL: [Priority; 3] = [Priority::Standard, Priority::Express, Priority::Urgent];

	pub fn as_str(&self) -> &'static str {
		match self {
			Priority::Standard => "STANDARD",
			Priority::Express => "EXPRESS",
			Priority::Urgent => "URGENT",
		}
	}
}

impl fmt::Display for Priority {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// Per-unit package dimensions in centimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
	pub length_cm: Decimal,
	pub width_cm: Decimal,
	pub height_cm: Decimal,
}

impl Dimensions {
	pub fn new(length_cm: Decimal, width_cm: Decimal, height_cm: Decimal) -> Self {
		Self {
			length_cm,
			width_cm,
			height_cm,
		}
	}

	pub fn volume_cm3(&self) -> Decimal {
		self.length_cm * self.width_cm * self.height_cm
	}

	pub fn volume_m3(&self) -> Decimal {
		self.volume_cm3() / Decimal::from(CM3_PER_M3)
	}

	fn validate(&self) -> Result<(), String> {
		let limit = Decimal::from(MAX_DIMENSION_CM);
		for (name, value) in [
			("length", self.length_cm),
			("width", self.width_cm),
			("height", self.height_cm),
		] {
			if value <= Decimal::ZERO {
				return Err(format!("{} must be greater than zero (got {})", name, value));
			}
			if value > limit {
				return Err(format!("{} exceeds {} cm (got {})", name, limit, value));
			}
		}
		Ok(())
	}
}

/// A package line item. Weight, dimensions and price are per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub quantity: u32,
	pub cargo_type: CargoType,
	pub unit_weight_kg: Decimal,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub unit_dimensions: Option<Dimensions>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub unit_price: Option<Decimal>,
}

impl Package {
	pub fn new(quantity: u32, cargo_type: CargoType, unit_weight_kg: Decimal) -> Self {
		Self {
			description: None,
			quantity,
			cargo_type,
			unit_weight_kg,
			unit_dimensions: None,
			unit_price: None,
		}
	}

	pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
		self.unit_dimensions = Some(dimensions);
		self
	}

	pub fn with_unit_price(mut self, price: Decimal) -> Self {
		self.unit_price = Some(price);
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn total_weight_kg(&self) -> Decimal {
		Decimal::from(self.quantity) * self.unit_weight_kg
	}

	/// Total volume in m³, `None` when the unit dimensions are unknown
	pub fn total_volume_m3(&self) -> Option<Decimal> {
		self.unit_dimensions
			.map(|d| Decimal::from(self.quantity) * d.volume_m3())
	}

	fn validate(&self, index: usize) -> ShipmentValidationResult<()> {
		if self.quantity < 1 {
			return Err(InvalidShipmentError::InvalidPackage {
				index,
				reason: "quantity must be at least 1".to_string(),
			});
		}
		if self.quantity > MAX_PACKAGE_QUANTITY {
			return Err(InvalidShipmentError::InvalidPackage {
				index,
				reason: format!(
					"quantity exceeds {} (got {})",
					MAX_PACKAGE_QUANTITY, self.quantity
				),
			});
		}
		if self.unit_weight_kg <= Decimal::ZERO {
			return Err(InvalidShipmentError::InvalidPackage {
				index,
				reason: format!(
					"unit weight must be greater than zero (got {})",
					self.unit_weight_kg
				),
			});
		}
		if self.unit_weight_kg > Decimal::from(MAX_UNIT_WEIGHT_KG) {
			return Err(InvalidShipmentError::InvalidPackage {
				index,
				reason: format!(
					"unit weight exceeds {} kg (got {})",
					MAX_UNIT_WEIGHT_KG, self.unit_weight_kg
				),
			});
		}
		if self.total_weight_kg() > Decimal::from(MAX_LINE_WEIGHT_KG) {
			return Err(InvalidShipmentError::InvalidPackage {
				index,
				reason: format!(
					"line weight exceeds {} kg (got {})",
					MAX_LINE_WEIGHT_KG,
					self.total_weight_kg()
				),
			});
		}
		if let Some(dimensions) = &self.unit_dimensions {
			dimensions
				.validate()
				.map_err(|reason| InvalidShipmentError::InvalidPackage { index, reason })?;
		}
		if let Some(price) = self.unit_price {
			if price < Decimal::ZERO {
				return Err(InvalidShipmentError::InvalidPackage {
					index,
					reason: format!("unit price cannot be negative (got {})", price),
				});
			}
			if price > Decimal::from(MAX_UNIT_PRICE) {
				return Err(InvalidShipmentError::InvalidPackage {
					index,
					reason: format!("unit price exceeds {} (got {})", MAX_UNIT_PRICE, price),
				});
			}
		}
		Ok(())
	}
}

/// A pricing line: either a declared package or the implicit single line of a
/// shipment described only by its overall weight and dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentLine {
	pub quantity: u32,
	pub unit_weight_kg: Decimal,
	pub unit_dimensions: Option<Dimensions>,
}

impl ShipmentLine {
	pub fn total_weight_kg(&self) -> Decimal {
		Decimal::from(self.quantity) * self.unit_weight_kg
	}

	pub fn total_volume_cm3(&self) -> Option<Decimal> {
		self.unit_dimensions
			.map(|d| Decimal::from(self.quantity) * d.volume_cm3())
	}
}

/// Shipment description submitted for pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentInput {
	pub origin_country: String,
	pub destination_country: String,
	pub cargo_type: CargoType,
	/// Overall actual weight, used when no packages are declared
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub weight_kg: Option<Decimal>,
	/// Overall dimensions, used when no packages are declared
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dimensions: Option<Dimensions>,
	/// Declared volume for volume-rated shipments without a known weight
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub volume_m3: Option<Decimal>,
	#[serde(default)]
	pub packages: Vec<Package>,
	pub transport_modes: Vec<TransportMode>,
	pub priority: Priority,
}

impl ShipmentInput {
	/// Create a single-line shipment by weight
	pub fn new(
		origin_country: impl Into<String>,
		destination_country: impl Into<String>,
		cargo_type: CargoType,
		weight_kg: Decimal,
		transport_modes: Vec<TransportMode>,
		priority: Priority,
	) -> Self {
		Self {
			origin_country: origin_country.into(),
			destination_country: destination_country.into(),
			cargo_type,
			weight_kg: Some(weight_kg),
			dimensions: None,
			volume_m3: None,
			packages: Vec::new(),
			transport_modes,
			priority,
		}
	}

	pub fn with_packages(mut self, packages: Vec<Package>) -> Self {
		self.packages = packages;
		self
	}

	pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
		self.dimensions = Some(dimensions);
		self
	}

	/// Upper-case country codes and de-duplicate transport modes in enumeration order
	pub fn normalize(&mut self) {
		self.origin_country = self.origin_country.trim().to_uppercase();
		self.destination_country = self.destination_country.trim().to_uppercase();
		self.transport_modes = self.distinct_modes();
	}

	/// Requested modes, de-duplicated and sorted in the stable enumeration order
	pub fn distinct_modes(&self) -> Vec<TransportMode> {
		let mut modes = self.transport_modes.clone();
		modes.sort();
		modes.dedup();
		modes
	}

	/// Pricing lines for this shipment
	pub fn lines(&self) -> Vec<ShipmentLine> {
		if self.packages.is_empty() {
			match (self.weight_kg, self.dimensions) {
				(None, None) => Vec::new(),
				(weight, dimensions) => vec![ShipmentLine {
					quantity: 1,
					unit_weight_kg: weight.unwrap_or(Decimal::ZERO),
					unit_dimensions: dimensions,
				}],
			}
		} else {
			self.packages
				.iter()
				.map(|p| ShipmentLine {
					quantity: p.quantity,
					unit_weight_kg: p.unit_weight_kg,
					unit_dimensions: p.unit_dimensions,
				})
				.collect()
		}
	}

	/// Aggregate actual weight (sum of `quantity × unit weight` over packages)
	pub fn total_weight_kg(&self) -> Decimal {
		self.lines().iter().map(ShipmentLine::total_weight_kg).sum()
	}

	/// Aggregate known volume in m³; declared volume wins when no dimensions are known
	pub fn total_volume_m3(&self) -> Option<Decimal> {
		let from_lines: Vec<Decimal> = self
			.lines()
			.iter()
			.filter_map(ShipmentLine::total_volume_cm3)
			.collect();
		if from_lines.is_empty() {
			self.volume_m3
		} else {
			Some(from_lines.into_iter().sum::<Decimal>() / Decimal::from(CM3_PER_M3))
		}
	}

	/// Validate the shipment. Runs before any pricing arithmetic.
	pub fn validate(&self) -> ShipmentValidationResult<()> {
		validate_country_code("originCountry", &self.origin_country)?;
		validate_country_code("destinationCountry", &self.destination_country)?;

		if self.transport_modes.is_empty() {
			return Err(InvalidShipmentError::NoTransportMode);
		}
		let distinct = self.distinct_modes().len();
		if distinct > MAX_TRANSPORT_MODES {
			return Err(InvalidShipmentError::TooManyTransportModes { count: distinct });
		}

		if self.packages.len() > MAX_PACKAGES {
			return Err(InvalidShipmentError::ExceedsLimit {
				field: "packages".to_string(),
				value: Decimal::from(self.packages.len() as u64),
				limit: Decimal::from(MAX_PACKAGES as u64),
			});
		}
		for (index, package) in self.packages.iter().enumerate() {
			package.validate(index)?;
		}

		if let Some(weight) = self.weight_kg {
			if weight <= Decimal::ZERO {
				return Err(InvalidShipmentError::NonPositiveWeight { value: weight });
			}
			if weight > Decimal::from(MAX_LINE_WEIGHT_KG) {
				return Err(InvalidShipmentError::ExceedsLimit {
					field: "weightKg".to_string(),
					value: weight,
					limit: Decimal::from(MAX_LINE_WEIGHT_KG),
				});
			}
		}
		if let Some(dimensions) = &self.dimensions {
			dimensions
				.validate()
				.map_err(|reason| InvalidShipmentError::InvalidDimensions { reason })?;
		}
		if let Some(volume) = self.volume_m3 {
			if volume <= Decimal::ZERO {
				return Err(InvalidShipmentError::InvalidDimensions {
					reason: format!("volume must be greater than zero (got {})", volume),
				});
			}
			if volume > Decimal::from(MAX_VOLUME_M3) {
				return Err(InvalidShipmentError::ExceedsLimit {
					field: "volumeM3".to_string(),
					value: volume,
					limit: Decimal::from(MAX_VOLUME_M3),
				});
			}
		}

		if self.packages.is_empty()
			&& self.weight_kg.is_none()
			&& self.dimensions.is_none()
			&& self.volume_m3.is_none()
		{
			return Err(InvalidShipmentError::MissingWeight);
		}

		Ok(())
	}
}

fn validate_country_code(field: &str, value: &str) -> ShipmentValidationResult<()> {
	let trimmed = value.trim();
	if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
		Ok(())
	} else {
		Err(InvalidShipmentError::InvalidCountryCode {
			field: field.to_string(),
			value: value.to_string(),
		})
	}
}

/// Round a money amount to 2 decimal places, half away from zero
pub fn round_money(amount: Decimal) -> Decimal {
	amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a weight to gram precision
pub fn round_weight(weight: Decimal) -> Decimal {
	weight.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
}

/// Which base pricing path produced an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingBasis {
	Weight,
	Volume,
}

/// Where a per-package presentation price came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackagePriceSource {
	Stored,
	Distributed,
}

/// Presentation-only price of one package line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagePrice {
	pub index: usize,
	pub total_weight_kg: Decimal,
	pub price: Decimal,
	pub source: PackagePriceSource,
}

/// Modifiers applied on top of the base cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
	pub base_cost: Decimal,
	pub mode_multiplier: Decimal,
	pub cargo_surcharge: Decimal,
	pub priority_surcharge: Decimal,
}

/// Chargeable weight evaluated for one requested mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeEvaluation {
	pub mode: TransportMode,
	pub chargeable_weight_kg: Decimal,
	pub cost: Decimal,
}

/// Source of the distance attached to an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistanceSource {
	Configured,
	StaticTable,
	Default,
}

/// Route information resolved by the configuration provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInfo {
	pub distance_km: u32,
	pub distance_source: DistanceSource,
}

/// Outcome of a pricing computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResult {
	pub chargeable_weight_kg: Decimal,
	pub actual_weight_kg: Decimal,
	pub estimated_cost: Decimal,
	pub currency: String,
	pub selected_mode: TransportMode,
	pub basis: PricingBasis,
	pub breakdown: CostBreakdown,
	pub modes_considered: Vec<ModeEvaluation>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub package_prices: Vec<PackagePrice>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub delivery_window: Option<DeliveryWindow>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub route: Option<RouteInfo>,
	pub config_version: u32,
}

impl EstimateResult {
	pub fn with_route(mut self, route: RouteInfo) -> Self {
		self.route = Some(route);
		self
	}
}
