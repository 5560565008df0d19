/// E2E tests for the pricing administration endpoints
use crate::e2e::{get_json, post_json, put_json, TestServer};
use crate::mocks::ApiFixtures;
use reqwest::{Client, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_pricing_config_update_changes_estimates() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let (status, mut config) = get_json(&client, server.url("/api/v1/admin/pricing-config")).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(config["currency"], "EUR");

	config["defaultRatePerKg"] = json!(2);
	let (status, updated) = put_json(
		&client,
		server.url("/api/v1/admin/pricing-config"),
		&config,
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(updated["version"], 1);

	// The update invalidates the provider cache immediately
	let (status, estimate) = post_json(
		&client,
		server.url("/api/v1/estimates"),
		&ApiFixtures::road_shipment(),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(estimate["estimatedCost"].as_f64(), Some(1000.0));
	assert_eq!(estimate["configVersion"], 1);

	server.abort();
}

#[tokio::test]
async fn test_invalid_pricing_config_is_rejected() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let (_, mut config) = get_json(&client, server.url("/api/v1/admin/pricing-config")).await;
	config["currency"] = json!("EURO");
	let (status, body) = put_json(
		&client,
		server.url("/api/v1/admin/pricing-config"),
		&config,
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "INVALID_PRICING_CONFIG");

	server.abort();
}

#[tokio::test]
async fn test_distance_upsert() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let (status, distance) = put_json(
		&client,
		server.url("/api/v1/admin/distances"),
		&json!({ "origin": "fr", "destination": "de", "distanceKm": 1100 }),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(distance["distanceKm"], 1100);

	let (_, estimate) = post_json(
		&client,
		server.url("/api/v1/estimates"),
		&ApiFixtures::road_shipment(),
	)
	.await;
	assert_eq!(estimate["route"]["distanceKm"], 1100);

	let (status, body) = put_json(
		&client,
		server.url("/api/v1/admin/distances"),
		&json!({ "origin": "France", "destination": "DE", "distanceKm": 10 }),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "INVALID_DISTANCE");

	server.abort();
}
