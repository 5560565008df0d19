/// E2E tests for anonymous estimates
use crate::e2e::{post_json, TestServer};
use crate::mocks::ApiFixtures;
use reqwest::{Client, StatusCode};

#[tokio::test]
async fn test_road_estimate_with_configured_route() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let (status, body) = post_json(
		&client,
		server.url("/api/v1/estimates"),
		&ApiFixtures::road_shipment(),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["estimatedCost"].as_f64(), Some(500.0));
	assert_eq!(body["currency"], "EUR");
	assert_eq!(body["selectedMode"], "ROAD");
	assert_eq!(body["route"]["distanceKm"], 1050);
	assert_eq!(body["route"]["distanceSource"], "CONFIGURED");

	server.abort();
}

#[tokio::test]
async fn test_multi_package_estimate_prices_each_line() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let (status, body) = post_json(
		&client,
		server.url("/api/v1/estimates"),
		&ApiFixtures::multi_package_shipment(),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["packagePrices"].as_array().unwrap().len(), 2);
	assert_eq!(body["modesConsidered"].as_array().unwrap().len(), 2);
	assert!(body["estimatedCost"].as_f64().unwrap() > 0.0);

	server.abort();
}

#[tokio::test]
async fn test_estimate_rejects_missing_weight() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let (status, body) = post_json(
		&client,
		server.url("/api/v1/estimates"),
		&ApiFixtures::shipment_without_weight(),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "INVALID_SHIPMENT");
	assert_eq!(body["field"], "weightKg");

	server.abort();
}

#[tokio::test]
async fn test_estimate_rejects_malformed_json() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let resp = client
		.post(server.url("/api/v1/estimates"))
		.header("content-type", "application/json")
		.body("{\"originCountry\": ")
		.send()
		.await
		.unwrap();
	assert!(resp.status().is_client_error());

	server.abort();
}
