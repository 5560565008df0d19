use axum::{
	extract::{Path, State},
	response::Json,
};
use freight_service::ReconciliationResult;
use freight_types::ContactIdentity;
use tracing::info;

use crate::handlers::common::{reconciliation_error, ApiResult};
use crate::state::AppState;

/// POST /api/v1/accounts/{account_id}/reconcile - attach guest records to a new account
pub async fn post_reconcile(
	State(state): State<AppState>,
	Path(account_id): Path<String>,
	Json(identity): Json<ContactIdentity>,
) -> ApiResult<ReconciliationResult> {
	let result = state
		.reconciliation_service
		.attach_orphans(&account_id, identity)
		.await
		.map_err(reconciliation_error)?;
	info!(
		"Reconciled account {}: {} records attached",
		account_id, result.attached_count
	);
	Ok(Json(result))
}
