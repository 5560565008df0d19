//! Anonymous price estimates
use axum::{extract::State, response::Json};
use freight_service::PricingServiceTrait;
use freight_types::{EstimateResult, ShipmentInput};
use tracing::debug;

use crate::handlers::common::{pricing_error, ApiResult};
use crate::state::AppState;

/// POST /api/v1/estimates - price a shipment without creating a quote
pub async fn post_estimate(
	State(state): State<AppState>,
	Json(shipment): Json<ShipmentInput>,
) -> ApiResult<EstimateResult> {
	debug!(
		"Estimate requested for {} -> {}",
		shipment.origin_country, shipment.destination_country
	);
	state
		.pricing_service
		.estimate(&shipment)
		.await
		.map(Json)
		.map_err(pricing_error)
}
