//! Error payloads and the mapping from service errors to HTTP responses

use axum::{http::StatusCode, response::Json};
use freight_service::{LifecycleError, PricingError, ProspectError, ReconciliationError};
use freight_types::chrono::Utc;
use serde::Serialize;
use tracing::warn;

/// Error response format shared by handlers
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
	/// Offending input field, for validation failures
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<String>,
	pub timestamp: i64,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> ApiError {
	(
		status,
		Json(ErrorResponse {
			error: error.to_string(),
			message: message.into(),
			field: None,
			timestamp: Utc::now().timestamp(),
		}),
	)
}

fn with_field(mut error: ApiError, field: String) -> ApiError {
	(error.1).0.field = Some(field);
	error
}

/// Storage failures never leak internals to the caller
fn unavailable(detail: &str) -> ApiError {
	warn!("Request failed on storage: {}", detail);
	error_response(
		StatusCode::SERVICE_UNAVAILABLE,
		"SERVICE_UNAVAILABLE",
		"The service is temporarily unavailable, please try again",
	)
}

pub fn lifecycle_error(error: LifecycleError) -> ApiError {
	match error {
		LifecycleError::InvalidShipment(e) => with_field(
			error_response(StatusCode::BAD_REQUEST, "INVALID_SHIPMENT", e.to_string()),
			e.field(),
		),
		LifecycleError::InvalidTransition(e) => {
			error_response(StatusCode::CONFLICT, "INVALID_TRANSITION", e.to_string())
		},
		LifecycleError::GuardRejected(e) => {
			error_response(StatusCode::UNPROCESSABLE_ENTITY, "TRANSITION_REJECTED", e.to_string())
		},
		LifecycleError::NotFound(id) => error_response(
			StatusCode::NOT_FOUND,
			"QUOTE_NOT_FOUND",
			format!("Quote {} not found", id),
		),
		LifecycleError::Conflict(_) => error_response(
			StatusCode::CONFLICT,
			"CONCURRENT_MODIFICATION",
			"The quote was modified by another request; reload it and retry",
		),
		LifecycleError::Token(e) => {
			error_response(StatusCode::NOT_FOUND, "TOKEN_INVALID", e.to_string())
		},
		LifecycleError::Storage(detail) => unavailable(&detail),
	}
}

pub fn pricing_error(error: PricingError) -> ApiError {
	match error {
		PricingError::InvalidShipment(e) => with_field(
			error_response(StatusCode::BAD_REQUEST, "INVALID_SHIPMENT", e.to_string()),
			e.field(),
		),
		PricingError::InvalidConfig(e) => {
			error_response(StatusCode::BAD_REQUEST, "INVALID_PRICING_CONFIG", e.to_string())
		},
		PricingError::InvalidDistance(message) => {
			error_response(StatusCode::BAD_REQUEST, "INVALID_DISTANCE", message)
		},
		PricingError::Storage(detail) => unavailable(&detail),
	}
}

pub fn prospect_error(error: ProspectError) -> ApiError {
	match error {
		ProspectError::InvalidEmail(_) => with_field(
			error_response(StatusCode::BAD_REQUEST, "INVALID_EMAIL", error.to_string()),
			"email".to_string(),
		),
		ProspectError::AlreadyConverted(_) => {
			error_response(StatusCode::CONFLICT, "ALREADY_CONVERTED", error.to_string())
		},
		ProspectError::Token(e) => {
			error_response(StatusCode::NOT_FOUND, "TOKEN_INVALID", e.to_string())
		},
		ProspectError::Storage(detail) => unavailable(&detail),
	}
}

pub fn reconciliation_error(error: ReconciliationError) -> ApiError {
	match error {
		ReconciliationError::InvalidIdentity(message) => {
			error_response(StatusCode::BAD_REQUEST, "INVALID_IDENTITY", message)
		},
		ReconciliationError::Conflict(_) => error_response(
			StatusCode::CONFLICT,
			"RECONCILIATION_CONFLICT",
			"Another update touched the same records; retry the reconciliation",
		),
		ReconciliationError::Storage(detail) => unavailable(&detail),
	}
}
