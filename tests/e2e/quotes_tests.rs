/// E2E tests for the quote lifecycle endpoints
use crate::e2e::{get_json, is_absent, post_json, TestServer};
use crate::mocks::ApiFixtures;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

async fn create_guest_quote(client: &Client, server: &TestServer) -> Value {
	let (status, body) = post_json(
		client,
		server.url("/api/v1/quotes"),
		&ApiFixtures::guest_quote("guest@example.com"),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	body
}

async fn transition(
	client: &Client,
	server: &TestServer,
	quote_id: &str,
	body: &Value,
) -> (StatusCode, Value) {
	post_json(
		client,
		server.url(&format!("/api/v1/quotes/{}/transitions", quote_id)),
		body,
	)
	.await
}

#[tokio::test]
async fn test_create_guest_quote() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let quote = create_guest_quote(&client, &server).await;
	assert_eq!(quote["status"], "DRAFT");
	assert!(quote["quoteNumber"].as_str().unwrap().starts_with("QT-"));
	assert_eq!(quote["estimatedCost"].as_f64(), Some(500.0));
	assert!(quote["trackingToken"].as_str().is_some());
	assert_eq!(quote["version"], 1);

	let quote_id = quote["quoteId"].as_str().unwrap();
	let (status, fetched) =
		get_json(&client, server.url(&format!("/api/v1/quotes/{}", quote_id))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(fetched["quoteNumber"], quote["quoteNumber"]);

	server.abort();
}

#[tokio::test]
async fn test_account_quote_has_no_tracking_token() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let (status, quote) = post_json(
		&client,
		server.url("/api/v1/quotes"),
		&ApiFixtures::account_quote("acct-42"),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(quote["accountId"], "acct-42");
	assert!(is_absent(&quote, "trackingToken"));

	server.abort();
}

#[tokio::test]
async fn test_full_lifecycle_to_validated() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let quote = create_guest_quote(&client, &server).await;
	let quote_id = quote["quoteId"].as_str().unwrap();

	let steps = [
		("submit", ApiFixtures::customer("cust-1"), "SUBMITTED"),
		("send", ApiFixtures::operator("agent-7"), "SENT"),
		("accept", ApiFixtures::customer("cust-1"), "ACCEPTED"),
		("start_treatment", ApiFixtures::operator("agent-7"), "IN_TREATMENT"),
		("validate", ApiFixtures::operator("agent-7"), "VALIDATED"),
	];
	for (action, actor, expected) in steps {
		let (status, body) = transition(
			&client,
			&server,
			quote_id,
			&ApiFixtures::transition(action, actor),
		)
		.await;
		assert_eq!(status, StatusCode::OK, "{} failed: {}", action, body);
		assert_eq!(body["status"], expected);
	}

	let (status, history) = get_json(
		&client,
		server.url(&format!("/api/v1/quotes/{}/history", quote_id)),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	let records = history.as_array().unwrap();
	assert_eq!(records.len(), 6);
	assert_eq!(records[0]["action"], "create");
	assert_eq!(records[5]["toStatus"], "VALIDATED");

	// Terminal: nothing further is allowed
	let (status, body) = transition(
		&client,
		&server,
		quote_id,
		&ApiFixtures::transition_with_reason(
			"cancel",
			ApiFixtures::customer("cust-1"),
			"Changed my mind entirely",
		),
	)
	.await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(body["error"], "INVALID_TRANSITION");

	server.abort();
}

#[tokio::test]
async fn test_accept_before_send_is_rejected() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let quote = create_guest_quote(&client, &server).await;
	let quote_id = quote["quoteId"].as_str().unwrap();

	let (status, body) = transition(
		&client,
		&server,
		quote_id,
		&ApiFixtures::transition("accept", ApiFixtures::customer("cust-1")),
	)
	.await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(body["error"], "INVALID_TRANSITION");

	let (_, current) = get_json(&client, server.url(&format!("/api/v1/quotes/{}", quote_id))).await;
	assert_eq!(current["status"], "DRAFT");

	server.abort();
}

#[tokio::test]
async fn test_reject_requires_reason() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let quote = create_guest_quote(&client, &server).await;
	let quote_id = quote["quoteId"].as_str().unwrap();
	transition(
		&client,
		&server,
		quote_id,
		&ApiFixtures::transition("submit", ApiFixtures::customer("cust-1")),
	)
	.await;

	let (status, body) = transition(
		&client,
		&server,
		quote_id,
		&ApiFixtures::transition_with_reason("reject", ApiFixtures::operator("agent-7"), "no"),
	)
	.await;
	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(body["error"], "TRANSITION_REJECTED");

	let (status, body) = transition(
		&client,
		&server,
		quote_id,
		&ApiFixtures::transition_with_reason(
			"reject",
			ApiFixtures::operator("agent-7"),
			"Destination not served this season",
		),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["status"], "REJECTED");

	server.abort();
}

#[tokio::test]
async fn test_treatment_requires_operator() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let quote = create_guest_quote(&client, &server).await;
	let quote_id = quote["quoteId"].as_str().unwrap();
	for (action, actor) in [
		("submit", ApiFixtures::customer("cust-1")),
		("send", ApiFixtures::operator("agent-7")),
		("accept", ApiFixtures::customer("cust-1")),
	] {
		let (status, _) =
			transition(&client, &server, quote_id, &ApiFixtures::transition(action, actor)).await;
		assert_eq!(status, StatusCode::OK);
	}

	let (status, _) = transition(
		&client,
		&server,
		quote_id,
		&ApiFixtures::transition("start_treatment", json!({ "type": "system" })),
	)
	.await;
	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

	server.abort();
}

#[tokio::test]
async fn test_incomplete_draft_cannot_be_submitted() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let (status, quote) = post_json(
		&client,
		server.url("/api/v1/quotes"),
		&json!({
			"shipment": ApiFixtures::shipment_without_weight(),
			"contact": { "email": "guest@example.com" }
		}),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	assert!(is_absent(&quote, "estimatedCost"));

	let quote_id = quote["quoteId"].as_str().unwrap();
	let (status, body) = transition(
		&client,
		&server,
		quote_id,
		&ApiFixtures::transition("submit", ApiFixtures::customer("cust-1")),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["field"], "weightKg");

	server.abort();
}

#[tokio::test]
async fn test_tracking_lookup_is_redacted() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let quote = create_guest_quote(&client, &server).await;
	let token = quote["trackingToken"].as_str().unwrap();

	let (status, tracked) =
		get_json(&client, server.url(&format!("/api/v1/tracking/{}", token))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(tracked["quoteId"], quote["quoteId"]);
	assert_eq!(tracked["status"], "DRAFT");
	assert!(is_absent(&tracked, "contact"));
	assert!(is_absent(&tracked, "trackingToken"));

	server.abort();
}

#[tokio::test]
async fn test_unknown_tokens_and_quotes() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let unknown = "0".repeat(64);
	let (status, unknown_body) =
		get_json(&client, server.url(&format!("/api/v1/tracking/{}", unknown))).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(unknown_body["error"], "TOKEN_INVALID");

	let (status, malformed_body) =
		get_json(&client, server.url("/api/v1/tracking/not-a-token")).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	// Unknown and malformed tokens are indistinguishable
	assert_eq!(malformed_body["message"], unknown_body["message"]);

	let (status, body) = get_json(&client, server.url("/api/v1/quotes/missing")).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "QUOTE_NOT_FOUND");

	server.abort();
}
