//! Pure pricing computation
//!
//! Turns a shipment description and a pricing configuration into an estimate.
//! No I/O and no clock: identical inputs always produce identical results.

use freight_types::pricing::{round_money, round_weight, ShipmentLine};
use freight_types::rust_decimal::Decimal;
use freight_types::{
	CostBreakdown, DeliveryWindow, EstimateResult, InvalidShipmentError, ModeEvaluation,
	PackagePrice, PackagePriceSource, PricingBasis, PricingConfig, ShipmentInput, TransportMode,
};
use tracing::warn;

/// Stateless estimate calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingEngine;

/// Per-mode intermediate values, unrounded
struct ModeCandidate {
	mode: TransportMode,
	chargeable_weight_kg: Decimal,
	base_cost: Decimal,
	multiplier: Decimal,
}

impl ModeCandidate {
	fn cost(&self) -> Result<Decimal, InvalidShipmentError> {
		product(&[self.base_cost, self.multiplier])
	}
}

/// Overflow-checked product; an out-of-range result rejects the shipment
fn product(factors: &[Decimal]) -> Result<Decimal, InvalidShipmentError> {
	factors
		.iter()
		.try_fold(Decimal::ONE, |acc, factor| acc.checked_mul(*factor))
		.ok_or(InvalidShipmentError::OutOfRange)
}

fn quotient(dividend: Decimal, divisor: Decimal) -> Result<Decimal, InvalidShipmentError> {
	dividend
		.checked_div(divisor)
		.ok_or(InvalidShipmentError::OutOfRange)
}

fn checked_sum(
	values: impl IntoIterator<Item = Result<Decimal, InvalidShipmentError>>,
) -> Result<Decimal, InvalidShipmentError> {
	values.into_iter().try_fold(Decimal::ZERO, |acc, value| {
		acc.checked_add(value?).ok_or(InvalidShipmentError::OutOfRange)
	})
}

/// Config lookups that fall back to the hard-coded table when an entry is missing
struct Parameters<'a> {
	config: &'a PricingConfig,
	fallback: PricingConfig,
}

impl<'a> Parameters<'a> {
	fn new(config: &'a PricingConfig) -> Self {
		Self {
			config,
			fallback: PricingConfig::default(),
		}
	}

	fn multiplier(&self, mode: TransportMode) -> Decimal {
		match self.config.mode_multipliers.get(&mode) {
			Some(value) => *value,
			None => {
				warn!(%mode, "pricing config has no mode multiplier, using fallback");
				self.fallback
					.mode_multipliers
					.get(&mode)
					.copied()
					.unwrap_or(Decimal::ONE)
			},
		}
	}

	fn volumetric_ratio(&self, mode: TransportMode) -> Option<Decimal> {
		let ratio = match self.config.volumetric_ratios.get(&mode) {
			Some(value) => Some(*value),
			None => {
				warn!(%mode, "pricing config has no volumetric ratio, using fallback");
				self.fallback.volumetric_ratios.get(&mode).copied()
			},
		};
		ratio.filter(|r| *r > Decimal::ZERO)
	}

	fn volumetric_enabled(&self, mode: TransportMode) -> bool {
		match self.config.volumetric_enabled.get(&mode) {
			Some(enabled) => *enabled,
			None => self
				.fallback
				.volumetric_enabled
				.get(&mode)
				.copied()
				.unwrap_or(false),
		}
	}

	fn cargo_surcharge(&self, shipment: &ShipmentInput) -> Decimal {
		let cargo = shipment.cargo_type;
		match self.config.cargo_surcharges.get(&cargo) {
			Some(value) => *value,
			None => {
				warn!(%cargo, "pricing config has no cargo surcharge, using fallback");
				self.fallback
					.cargo_surcharges
					.get(&cargo)
					.copied()
					.unwrap_or(Decimal::ZERO)
			},
		}
	}

	fn priority_surcharge(&self, shipment: &ShipmentInput) -> Decimal {
		let priority = shipment.priority;
		match self.config.priority_surcharges.get(&priority) {
			Some(value) => *value,
			None => {
				warn!(%priority, "pricing config has no priority surcharge, using fallback");
				self.fallback
					.priority_surcharges
					.get(&priority)
					.copied()
					.unwrap_or(Decimal::ZERO)
			},
		}
	}

	fn delivery_window(&self, mode: TransportMode) -> Option<DeliveryWindow> {
		self.config
			.delivery_days
			.get(&mode)
			.or_else(|| self.fallback.delivery_days.get(&mode))
			.copied()
	}
}

impl PricingEngine {
	pub fn new() -> Self {
		Self
	}

	/// Compute an estimate. Validation runs before any arithmetic.
	pub fn compute_estimate(
		&self,
		shipment: &ShipmentInput,
		config: &PricingConfig,
	) -> Result<EstimateResult, InvalidShipmentError> {
		shipment.validate()?;

		let params = Parameters::new(config);
		let lines = shipment.lines();
		let actual_weight: Decimal = lines.iter().map(ShipmentLine::total_weight_kg).sum();
		let volume_m3 = shipment.total_volume_m3();
		let modes = shipment.distinct_modes();

		let basis = if actual_weight > Decimal::ZERO {
			PricingBasis::Weight
		} else if config.default_rate_per_m3.is_some()
			&& volume_m3.is_some_and(|v| v > Decimal::ZERO)
		{
			PricingBasis::Volume
		} else {
			return Err(InvalidShipmentError::MissingWeight);
		};

		let candidates = modes
			.iter()
			.map(|mode| -> Result<(ModeCandidate, Decimal), InvalidShipmentError> {
				let (chargeable, base_cost) = match basis {
					PricingBasis::Weight => {
						let chargeable =
							Self::chargeable_weight(&params, *mode, &lines, actual_weight)?;
						(chargeable, product(&[chargeable, config.default_rate_per_kg])?)
					},
					PricingBasis::Volume => {
						let rate = config.default_rate_per_m3.unwrap_or(Decimal::ZERO);
						(Decimal::ZERO, product(&[volume_m3.unwrap_or(Decimal::ZERO), rate])?)
					},
				};
				let candidate = ModeCandidate {
					mode: *mode,
					chargeable_weight_kg: chargeable,
					base_cost,
					multiplier: params.multiplier(*mode),
				};
				let cost = candidate.cost()?;
				Ok((candidate, cost))
			})
			.collect::<Result<Vec<_>, _>>()?;

		// Modes are in enumeration order, so strict comparison keeps the earliest on ties
		let (selected, selected_cost) = candidates
			.iter()
			.fold(None::<&(ModeCandidate, Decimal)>, |best, entry| match best {
				Some(current) if entry.1 >= current.1 => Some(current),
				_ => Some(entry),
			})
			.ok_or(InvalidShipmentError::NoTransportMode)?;

		let cargo_surcharge = params.cargo_surcharge(shipment);
		let priority_surcharge = params.priority_surcharge(shipment);
		let total = product(&[
			*selected_cost,
			Decimal::ONE + cargo_surcharge,
			Decimal::ONE + priority_surcharge,
		])?;
		let estimated_cost = round_money(total);

		Ok(EstimateResult {
			chargeable_weight_kg: round_weight(selected.chargeable_weight_kg),
			actual_weight_kg: round_weight(actual_weight),
			estimated_cost,
			currency: config.currency.clone(),
			selected_mode: selected.mode,
			basis,
			breakdown: CostBreakdown {
				base_cost: round_money(selected.base_cost),
				mode_multiplier: selected.multiplier,
				cargo_surcharge,
				priority_surcharge,
			},
			modes_considered: candidates
				.iter()
				.map(|(c, cost)| ModeEvaluation {
					mode: c.mode,
					chargeable_weight_kg: round_weight(c.chargeable_weight_kg),
					cost: round_money(*cost),
				})
				.collect(),
			package_prices: Self::package_prices(shipment, estimated_cost, actual_weight)?,
			delivery_window: params.delivery_window(selected.mode),
			route: None,
			config_version: config.version,
		})
	}

	/// `max(actual, Σ volumetric)` when the mode uses volumetric weight, else actual.
	/// Lines without dimensions count at their actual weight.
	fn chargeable_weight(
		params: &Parameters<'_>,
		mode: TransportMode,
		lines: &[ShipmentLine],
		actual_weight: Decimal,
	) -> Result<Decimal, InvalidShipmentError> {
		if !params.volumetric_enabled(mode) {
			return Ok(actual_weight);
		}
		let ratio = match params.volumetric_ratio(mode) {
			Some(ratio) => ratio,
			None => return Ok(actual_weight),
		};
		let volumetric = checked_sum(lines.iter().map(|line| match line.total_volume_cm3() {
			Some(cm3) => quotient(cm3, ratio),
			None => Ok(line.total_weight_kg()),
		}))?;
		Ok(actual_weight.max(volumetric))
	}

	/// Presentation-only per-package prices; never feeds the total
	fn package_prices(
		shipment: &ShipmentInput,
		estimated_cost: Decimal,
		actual_weight: Decimal,
	) -> Result<Vec<PackagePrice>, InvalidShipmentError> {
		let count = Decimal::from(shipment.packages.len() as u64);
		shipment
			.packages
			.iter()
			.enumerate()
			.map(|(index, package)| -> Result<PackagePrice, InvalidShipmentError> {
				let total_weight_kg = package.total_weight_kg();
				let (price, source) = match package.unit_price {
					Some(unit_price) => (
						round_money(product(&[unit_price, Decimal::from(package.quantity)])?),
						PackagePriceSource::Stored,
					),
					None => {
						let share = if actual_weight > Decimal::ZERO {
							// Divide first so a large total cannot overflow the product
							product(&[quotient(total_weight_kg, actual_weight)?, estimated_cost])?
						} else {
							quotient(estimated_cost, count)?
						};
						(round_money(share), PackagePriceSource::Distributed)
					},
				};
				Ok(PackagePrice {
					index,
					total_weight_kg: round_weight(total_weight_kg),
					price,
					source,
				})
			})
			.collect()
	}
}
