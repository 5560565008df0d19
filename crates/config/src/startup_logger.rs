//! Service startup logging for the freight quoter

use crate::Settings;
use std::env;
use tracing::info;

/// Logs service information at startup
pub fn log_service_info() {
	let service_name = "freight-quoter";
	let service_version = env!("CARGO_PKG_VERSION");

	info!("=== Freight Quoter Service Starting ===");
	info!("🚀 Service: {} v{}", service_name, service_version);

	info!("💻 Platform: {}", env::consts::OS);
	info!("🏗️ Architecture: {}", env::consts::ARCH);

	if let Ok(cwd) = env::current_dir() {
		info!("📁 Working Directory: {}", cwd.display());
	}

	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("🔧 Log Level: {}", rust_log);
	}

	info!(
		"🕒 Started at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs the effective quoting policy
pub fn log_settings_summary(settings: &Settings) {
	info!("🌍 Profile: {:?}", settings.environment.profile);
	info!(
		"🧾 Quotes: prefix {}, valid {} days, tracking tokens {} h",
		settings.quotes.number_prefix,
		settings.quotes.validity_days,
		settings.quotes.tracking_token_ttl_hours
	);
	info!(
		"✉️ Invitations valid {} days",
		settings.prospects.invitation_ttl_days
	);
	info!(
		"💶 Pricing cache TTL {} s, default distance {} km",
		settings.pricing.cache_ttl_seconds, settings.pricing.default_distance_km
	);
	if settings.jobs.enabled {
		info!(
			"⏱️ Sweeps: quotes every {} min, prospects every {} min",
			settings.jobs.quote_expiry_interval_minutes,
			settings.jobs.prospect_expiry_interval_minutes
		);
	} else {
		info!("⏱️ Background sweeps disabled");
	}
}

/// Logs service shutdown information
pub fn log_service_shutdown() {
	info!("🛑 Freight Quoter Service Shutting Down");
	info!(
		"🕒 Shutdown at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs additional startup completion information
pub fn log_startup_complete(bind_address: &str) {
	info!("✅ Freight Quoter Service Started Successfully");
	info!("🌐 Server listening on: {}", bind_address);
	info!("📡 Ready to accept requests");
}
