//! Configuration settings structures

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
	pub server: ServerSettings,
	pub environment: EnvironmentSettings,
	pub logging: LoggingSettings,
	pub quotes: QuoteSettings,
	pub prospects: ProspectSettings,
	pub pricing: PricingSettings,
	pub jobs: JobSettings,
}

/// Server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
	pub host: String,
	pub port: u16,
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 3000,
		}
	}
}

/// Environment-specific settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EnvironmentSettings {
	pub profile: EnvironmentProfile,
	pub debug: bool,
}

impl Default for EnvironmentSettings {
	fn default() -> Self {
		Self {
			profile: EnvironmentProfile::Development,
			debug: true,
		}
	}
}

/// Environment profiles
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentProfile {
	Development,
	Staging,
	Production,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	pub structured: bool,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
			structured: false,
		}
	}
}

/// Log format options
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

/// Quote lifecycle policy
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct QuoteSettings {
	/// Prefix of human-readable quote numbers (`QT-20240101-0001`)
	pub number_prefix: String,
	/// Days between creation and `valid_until`
	pub validity_days: u32,
	pub tracking_token_ttl_hours: u32,
	/// Minimum trimmed length of a reject/cancel reason
	pub min_reason_length: usize,
}

impl Default for QuoteSettings {
	fn default() -> Self {
		Self {
			number_prefix: "QT".to_string(),
			validity_days: 30,
			tracking_token_ttl_hours: 72,
			min_reason_length: 10,
		}
	}
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ProspectSettings {
	pub invitation_ttl_days: u32,
}

impl Default for ProspectSettings {
	fn default() -> Self {
		Self {
			invitation_ttl_days: 7,
		}
	}
}

/// Pricing configuration cache and distance fallback
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PricingSettings {
	pub cache_ttl_seconds: u64,
	/// Used when a route is neither configured nor in the static table
	pub default_distance_km: u32,
}

impl Default for PricingSettings {
	fn default() -> Self {
		Self {
			cache_ttl_seconds: 3600,
			default_distance_km: 5000,
		}
	}
}

/// Periodic sweep jobs
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct JobSettings {
	pub enabled: bool,
	pub quote_expiry_interval_minutes: u64,
	pub prospect_expiry_interval_minutes: u64,
}

impl Default for JobSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			quote_expiry_interval_minutes: 15,
			prospect_expiry_interval_minutes: 60,
		}
	}
}

/// Configuration values that deserialize but make no sense
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigValidationError {
	#[error("Invalid value for {field}: {reason}")]
	InvalidValue { field: String, reason: String },
}

impl ConfigValidationError {
	fn invalid(field: &str, reason: &str) -> Self {
		Self::InvalidValue {
			field: field.to_string(),
			reason: reason.to_string(),
		}
	}
}

impl Settings {
	/// Get server bind address
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.server.host, self.server.port)
	}

	/// Check if running in production
	pub fn is_production(&self) -> bool {
		self.environment.profile == EnvironmentProfile::Production
	}

	/// Check if debug mode is enabled
	pub fn is_debug(&self) -> bool {
		self.environment.debug && !self.is_production()
	}

	pub fn validate(&self) -> Result<(), ConfigValidationError> {
		if self.server.port == 0 {
			return Err(ConfigValidationError::invalid("server.port", "must not be 0"));
		}
		let prefix = self.quotes.number_prefix.trim();
		if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
			return Err(ConfigValidationError::invalid(
				"quotes.number_prefix",
				"must be a non-empty alphanumeric string",
			));
		}
		if self.quotes.validity_days == 0 {
			return Err(ConfigValidationError::invalid(
				"quotes.validity_days",
				"must be at least 1",
			));
		}
		if self.quotes.tracking_token_ttl_hours == 0 {
			return Err(ConfigValidationError::invalid(
				"quotes.tracking_token_ttl_hours",
				"must be at least 1",
			));
		}
		if self.prospects.invitation_ttl_days == 0 {
			return Err(ConfigValidationError::invalid(
				"prospects.invitation_ttl_days",
				"must be at least 1",
			));
		}
		if self.pricing.cache_ttl_seconds == 0 {
			return Err(ConfigValidationError::invalid(
				"pricing.cache_ttl_seconds",
				"must be at least 1",
			));
		}
		if self.pricing.default_distance_km == 0 {
			return Err(ConfigValidationError::invalid(
				"pricing.default_distance_km",
				"must be at least 1",
			));
		}
		if self.jobs.enabled
			&& (self.jobs.quote_expiry_interval_minutes == 0
				|| self.jobs.prospect_expiry_interval_minutes == 0)
		{
			return Err(ConfigValidationError::invalid(
				"jobs",
				"intervals must be at least 1 minute",
			));
		}
		Ok(())
	}
}
