//! Freight Configuration
//!
//! Configuration management and startup utilities for the freight quoter.

pub mod loader;
pub mod settings;
pub mod startup_logger;

pub use loader::{load_config, load_config_from, ConfigLoadError};
pub use settings::{
	ConfigValidationError, EnvironmentProfile, EnvironmentSettings, JobSettings, LogFormat,
	LoggingSettings, PricingSettings, ProspectSettings, QuoteSettings, ServerSettings, Settings,
};
pub use startup_logger::{
	log_service_info, log_service_shutdown, log_settings_summary, log_startup_complete,
};
