//! Quote handlers
use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
};
use freight_service::QuoteLifecycleTrait;
use freight_types::{
	Actor, NewQuote, QuoteSnapshot, TransitionAction, TransitionPayload, TransitionRecord,
};
use serde::Deserialize;
use tracing::info;

use crate::handlers::common::{lifecycle_error, ApiError, ApiResult};
use crate::state::AppState;

/// Body of POST /api/v1/quotes
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
	#[serde(flatten)]
	pub quote: NewQuote,
	/// Defaults to the owning customer, or the system for guest quotes
	#[serde(default)]
	pub actor: Option<Actor>,
}

/// Body of POST /api/v1/quotes/{id}/transitions
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
	pub action: TransitionAction,
	pub actor: Actor,
	#[serde(flatten)]
	pub payload: TransitionPayload,
}

/// POST /api/v1/quotes - create a DRAFT quote
pub async fn post_quote(
	State(state): State<AppState>,
	Json(request): Json<CreateQuoteRequest>,
) -> Result<(StatusCode, Json<QuoteSnapshot>), ApiError> {
	let actor = request.actor.unwrap_or_else(|| match &request.quote.account_id {
		Some(id) => Actor::Customer { id: id.clone() },
		None => Actor::System,
	});
	let quote = state
		.quote_lifecycle
		.create_quote(request.quote, actor)
		.await
		.map_err(lifecycle_error)?;
	info!("Created quote {}", quote.quote_number);
	Ok((StatusCode::CREATED, Json(quote)))
}

/// GET /api/v1/quotes/{id}
pub async fn get_quote(
	State(state): State<AppState>,
	Path(quote_id): Path<String>,
) -> ApiResult<QuoteSnapshot> {
	state
		.quote_lifecycle
		.get_quote(&quote_id)
		.await
		.map(Json)
		.map_err(lifecycle_error)
}

/// GET /api/v1/quotes/{id}/history - transition log, oldest first
pub async fn get_quote_history(
	State(state): State<AppState>,
	Path(quote_id): Path<String>,
) -> ApiResult<Vec<TransitionRecord>> {
	state
		.quote_lifecycle
		.history(&quote_id)
		.await
		.map(Json)
		.map_err(lifecycle_error)
}

/// POST /api/v1/quotes/{id}/transitions
pub async fn post_transition(
	State(state): State<AppState>,
	Path(quote_id): Path<String>,
	Json(request): Json<TransitionRequest>,
) -> ApiResult<QuoteSnapshot> {
	state
		.quote_lifecycle
		.transition(&quote_id, request.action, request.actor, request.payload)
		.await
		.map(Json)
		.map_err(lifecycle_error)
}
