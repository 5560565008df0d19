//! Administrator endpoints for pricing parameters
use axum::{extract::State, response::Json};
use freight_types::{CountryDistance, PricingConfig};
use serde::Deserialize;

use crate::handlers::common::{pricing_error, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceRequest {
	pub origin: String,
	pub destination: String,
	pub distance_km: u32,
}

/// GET /api/v1/admin/pricing-config
pub async fn get_pricing_config(State(state): State<AppState>) -> ApiResult<PricingConfig> {
	state
		.pricing_service
		.current_pricing_config()
		.await
		.map(Json)
		.map_err(pricing_error)
}

/// PUT /api/v1/admin/pricing-config - replace the configuration, bumping its version
pub async fn put_pricing_config(
	State(state): State<AppState>,
	Json(config): Json<PricingConfig>,
) -> ApiResult<PricingConfig> {
	state
		.pricing_service
		.update_pricing_config(config)
		.await
		.map(Json)
		.map_err(pricing_error)
}

/// PUT /api/v1/admin/distances
pub async fn put_distance(
	State(state): State<AppState>,
	Json(request): Json<DistanceRequest>,
) -> ApiResult<CountryDistance> {
	state
		.pricing_service
		.upsert_distance(&request.origin, &request.destination, request.distance_km)
		.await
		.map(Json)
		.map_err(pricing_error)
}
