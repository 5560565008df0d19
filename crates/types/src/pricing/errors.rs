//! Error types for pricing inputs and configuration

use rust_decimal::Decimal;
use thiserror::Error;

/// Malformed pricing input, rejected before any computation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidShipmentError {
	#[error("Invalid country code for {field}: '{value}' (expected a two-letter ISO code)")]
	InvalidCountryCode { field: String, value: String },

	#[error("At least one transport mode is required")]
	NoTransportMode,

	#[error("Too many transport modes: {count} (maximum 4 distinct modes)")]
	TooManyTransportModes { count: usize },

	#[error("Weight must be greater than zero (got {value} kg)")]
	NonPositiveWeight { value: Decimal },

	#[error("Missing required field: weight (or packages, or a volume for volume-rated pricing)")]
	MissingWeight,

	#[error("Invalid package at position {index}: {reason}")]
	InvalidPackage { index: usize, reason: String },

	#[error("Invalid dimensions: {reason}")]
	InvalidDimensions { reason: String },

	#[error("{field} exceeds the maximum of {limit} (got {value})")]
	ExceedsLimit {
		field: String,
		value: Decimal,
		limit: Decimal,
	},

	#[error("Shipment cannot be priced: amounts out of range")]
	OutOfRange,
}

impl InvalidShipmentError {
	/// Name of the offending input field, for API error payloads
	pub fn field(&self) -> String {
		match self {
			InvalidShipmentError::InvalidCountryCode { field, .. } => field.clone(),
			InvalidShipmentError::NoTransportMode
			| InvalidShipmentError::TooManyTransportModes { .. } => "transportModes".to_string(),
			InvalidShipmentError::NonPositiveWeight { .. } | InvalidShipmentError::MissingWeight => {
				"weightKg".to_string()
			},
			InvalidShipmentError::InvalidPackage { index, .. } => format!("packages[{}]", index),
			InvalidShipmentError::InvalidDimensions { .. } => "dimensions".to_string(),
			InvalidShipmentError::ExceedsLimit { field, .. } => field.clone(),
			InvalidShipmentError::OutOfRange => "shipment".to_string(),
		}
	}
}
