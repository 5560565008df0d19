/// E2E tests for middleware: request ids, CORS, security headers and body limits
use crate::e2e::TestServer;
use crate::mocks::ApiFixtures;
use reqwest::{Client, StatusCode};

#[tokio::test]
async fn test_request_id_auto_generation() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let resp = client
		.post(server.url("/api/v1/estimates"))
		.json(&ApiFixtures::road_shipment())
		.send()
		.await
		.unwrap();

	assert_eq!(resp.status(), StatusCode::OK);
	let req_id = resp.headers().get("x-request-id");
	assert!(req_id.is_some());
	assert!(!req_id.unwrap().to_str().unwrap().is_empty());

	server.abort();
}

#[tokio::test]
async fn test_request_id_propagation() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let provided_id = "test-req-id-123";
	let resp = client
		.get(server.url("/health"))
		.header("x-request-id", provided_id)
		.send()
		.await
		.unwrap();

	let echoed_id = resp
		.headers()
		.get("x-request-id")
		.and_then(|v| v.to_str().ok())
		.unwrap_or("");
	assert_eq!(echoed_id, provided_id);

	server.abort();
}

#[tokio::test]
async fn test_cors_preflight() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let resp = client
		.request(reqwest::Method::OPTIONS, server.url("/api/v1/quotes"))
		.header("Origin", "http://example.com")
		.header("Access-Control-Request-Method", "POST")
		.send()
		.await
		.unwrap();

	assert!(resp.status() == StatusCode::NO_CONTENT || resp.status() == StatusCode::OK);
	assert!(resp.headers().get("access-control-allow-origin").is_some());

	server.abort();
}

#[tokio::test]
async fn test_security_headers_present() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let resp = client.get(server.url("/health")).send().await.unwrap();
	let headers = resp.headers();
	assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
	assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
	assert_eq!(headers.get("cache-control").unwrap(), "no-store");

	server.abort();
}

#[tokio::test]
async fn test_body_size_limit() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let mut body = ApiFixtures::guest_quote("big@example.com");
	body["shipment"]["padding"] = serde_json::Value::String("x".repeat(2 * 1024 * 1024));

	let result = client
		.post(server.url("/api/v1/quotes"))
		.json(&body)
		.send()
		.await;

	// Either a 413 or a reset connection counts as rejection
	match result {
		Ok(resp) => assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE),
		Err(e) => {
			let error_msg = e.to_string();
			assert!(
				error_msg.contains("Connection reset")
					|| error_msg.contains("BodyWrite")
					|| error_msg.contains("request"),
				"Unexpected error: {}",
				error_msg
			);
		},
	}

	server.abort();
}
