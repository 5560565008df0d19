use axum::{
	routing::{get, post, put},
	Router,
};
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	limit::RequestBodyLimitLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};
use tracing::Level;

use crate::handlers::{
	get_invitation, get_pricing_config, get_quote, get_quote_history, get_tracking, health,
	post_estimate, post_prospect, post_quote, post_reconcile, post_transition, put_distance,
	put_pricing_config, ready,
};
use crate::security::add_security_headers;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
	let cors = CorsLayer::permissive();
	let body_limit = RequestBodyLimitLayer::new(1024 * 1024);
	let trace = TraceLayer::new_for_http()
		.make_span_with(|req: &axum::http::Request<_>| {
			let req_id = req
				.headers()
				.get("x-request-id")
				.and_then(|v| v.to_str().ok())
				.unwrap_or("-");
			tracing::info_span!(
				"http_request",
				method = %req.method(),
				uri = %req.uri(),
				req_id
			)
		})
		.on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
		.on_response(
			tower_http::trace::DefaultOnResponse::new()
				.level(Level::INFO)
				.latency_unit(tower_http::LatencyUnit::Millis),
		);
	let req_id = ServiceBuilder::new()
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
		.layer(PropagateRequestIdLayer::x_request_id());

	let router = Router::new()
		.route("/health", get(health))
		.route("/ready", get(ready))
		.route("/api/v1/estimates", post(post_estimate))
		.route("/api/v1/quotes", post(post_quote))
		.route("/api/v1/quotes/{id}", get(get_quote))
		.route("/api/v1/quotes/{id}/history", get(get_quote_history))
		.route("/api/v1/quotes/{id}/transitions", post(post_transition))
		.route("/api/v1/tracking/{token}", get(get_tracking))
		.route("/api/v1/prospects", post(post_prospect))
		.route("/api/v1/invitations/{token}", get(get_invitation))
		.route("/api/v1/accounts/{account_id}/reconcile", post(post_reconcile))
		.route(
			"/api/v1/admin/pricing-config",
			get(get_pricing_config).put(put_pricing_config),
		)
		.route("/api/v1/admin/distances", put(put_distance));

	let router = router
		.layer(cors)
		.layer(CompressionLayer::new())
		.layer(trace)
		.layer(req_id)
		.layer(body_limit);

	add_security_headers(router)
}
