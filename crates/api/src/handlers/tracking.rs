use axum::{
	extract::{Path, State},
	response::Json,
};
use freight_service::QuoteLifecycleTrait;
use freight_types::QuoteSnapshot;

use crate::handlers::common::{lifecycle_error, ApiResult};
use crate::state::AppState;

/// GET /api/v1/tracking/{token} - anonymous quote status, contact details redacted
pub async fn get_tracking(
	State(state): State<AppState>,
	Path(token): Path<String>,
) -> ApiResult<QuoteSnapshot> {
	state
		.quote_lifecycle
		.track(&token)
		.await
		.map(Json)
		.map_err(lifecycle_error)
}
