/// E2E tests for guest-to-account reconciliation
use crate::e2e::{get_json, post_json, TestServer};
use crate::mocks::ApiFixtures;
use reqwest::{Client, StatusCode};

#[tokio::test]
async fn test_reconcile_attaches_guest_quotes_once() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let mut quote_ids = Vec::new();
	for _ in 0..2 {
		let (status, quote) = post_json(
			&client,
			server.url("/api/v1/quotes"),
			&ApiFixtures::guest_quote("shipper@example.com"),
		)
		.await;
		assert_eq!(status, StatusCode::CREATED);
		quote_ids.push(quote["quoteId"].as_str().unwrap().to_string());
	}
	// Someone else's guest quote stays orphaned
	post_json(
		&client,
		server.url("/api/v1/quotes"),
		&ApiFixtures::guest_quote("other@example.com"),
	)
	.await;

	let url = server.url("/api/v1/accounts/acct-9/reconcile");
	let (status, result) =
		post_json(&client, url.clone(), &ApiFixtures::identity("Shipper@Example.com")).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(result["accountId"], "acct-9");
	assert_eq!(result["attachedCount"], 2);

	let (status, again) =
		post_json(&client, url, &ApiFixtures::identity("shipper@example.com")).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(again["attachedCount"], 0);

	for quote_id in &quote_ids {
		let (_, quote) = get_json(&client, server.url(&format!("/api/v1/quotes/{}", quote_id))).await;
		assert_eq!(quote["accountId"], "acct-9");
		assert_eq!(quote["attached"], true);
	}

	server.abort();
}

#[tokio::test]
async fn test_reconcile_rejects_invalid_identity() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let (status, body) = post_json(
		&client,
		server.url("/api/v1/accounts/acct-9/reconcile"),
		&ApiFixtures::identity("nobody"),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "INVALID_IDENTITY");

	server.abort();
}
