/// E2E tests for the health and readiness endpoints
use crate::e2e::{get_json, TestServer};
use reqwest::{Client, StatusCode};

#[tokio::test]
async fn test_health_endpoint() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let resp = client.get(server.url("/health")).send().await.unwrap();
	assert_eq!(resp.status(), StatusCode::OK);
	assert_eq!(resp.text().await.unwrap(), "OK");

	server.abort();
}

#[tokio::test]
async fn test_ready_reports_storage() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let (status, body) = get_json(&client, server.url("/ready")).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["status"], "ready");
	assert_eq!(body["storageHealthy"], true);

	server.abort();
}

#[tokio::test]
async fn test_unknown_endpoint_404() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let resp = client
		.get(server.url("/unknown-endpoint"))
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), StatusCode::NOT_FOUND);

	server.abort();
}
