//! Prospect registration and invitation lookup
use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
};
use freight_service::ProspectServiceTrait;
use freight_types::chrono::{DateTime, Utc};
use freight_types::{Prospect, ProspectRequest, ProspectStatus};
use serde::Serialize;

use crate::handlers::common::{prospect_error, ApiError, ApiResult};
use crate::state::AppState;

/// Public view of a prospect; the invitation token only travels by notification
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProspectResponse {
	pub prospect_id: String,
	pub email: String,
	pub name: Option<String>,
	pub company: Option<String>,
	pub status: ProspectStatus,
	pub invitation_expires_at: DateTime<Utc>,
}

impl From<Prospect> for ProspectResponse {
	fn from(prospect: Prospect) -> Self {
		Self {
			prospect_id: prospect.prospect_id,
			email: prospect.email,
			name: prospect.name,
			company: prospect.company,
			status: prospect.status,
			invitation_expires_at: prospect.invitation_expires_at,
		}
	}
}

/// POST /api/v1/prospects
pub async fn post_prospect(
	State(state): State<AppState>,
	Json(request): Json<ProspectRequest>,
) -> Result<(StatusCode, Json<ProspectResponse>), ApiError> {
	let prospect = state
		.prospect_service
		.register(request)
		.await
		.map_err(prospect_error)?;
	Ok((StatusCode::CREATED, Json(prospect.into())))
}

/// GET /api/v1/invitations/{token}
pub async fn get_invitation(
	State(state): State<AppState>,
	Path(token): Path<String>,
) -> ApiResult<ProspectResponse> {
	state
		.prospect_service
		.validate_invitation(&token)
		.await
		.map(|prospect| Json(prospect.into()))
		.map_err(prospect_error)
}
