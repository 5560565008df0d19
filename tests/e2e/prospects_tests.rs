/// E2E tests for prospect registration and invitations
use crate::e2e::{get_json, is_absent, post_json, TestServer};
use crate::mocks::ApiFixtures;
use freight_quoter::EventName;
use reqwest::{Client, StatusCode};

#[tokio::test]
async fn test_register_and_validate_invitation() {
	let (server, mut events) = TestServer::spawn_with_events()
		.await
		.expect("Failed to start test server");
	let client = Client::new();

	let (status, prospect) = post_json(
		&client,
		server.url("/api/v1/prospects"),
		&ApiFixtures::prospect("Jane.Doe@Example.com"),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(prospect["email"], "jane.doe@example.com");
	assert_eq!(prospect["status"], "PENDING");
	assert!(is_absent(&prospect, "invitationToken"));

	let event = events.recv().await.unwrap();
	assert_eq!(event.name, EventName::ProspectInvited);
	let token = event.payload["invitationToken"].as_str().unwrap().to_string();

	let (status, validated) =
		get_json(&client, server.url(&format!("/api/v1/invitations/{}", token))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(validated["prospectId"], prospect["prospectId"]);

	server.abort();
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let (status, body) = post_json(
		&client,
		server.url("/api/v1/prospects"),
		&ApiFixtures::prospect("not-an-email"),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["field"], "email");

	server.abort();
}

#[tokio::test]
async fn test_unknown_invitation() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let (status, body) = get_json(
		&client,
		server.url(&format!("/api/v1/invitations/{}", "f".repeat(64))),
	)
	.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "TOKEN_INVALID");

	server.abort();
}

#[tokio::test]
async fn test_guest_quote_records_registered_prospect() {
	let server = TestServer::spawn().await.expect("Failed to start test server");
	let client = Client::new();

	let (_, prospect) = post_json(
		&client,
		server.url("/api/v1/prospects"),
		&ApiFixtures::prospect("owner@example.com"),
	)
	.await;

	let (status, quote) = post_json(
		&client,
		server.url("/api/v1/quotes"),
		&ApiFixtures::guest_quote("Owner@Example.com"),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(quote["prospectId"], prospect["prospectId"]);

	let token = quote["trackingToken"].as_str().unwrap().to_string();
	let (status, tracked) =
		get_json(&client, server.url(&format!("/api/v1/tracking/{}", token))).await;
	assert_eq!(status, StatusCode::OK);
	assert!(is_absent(&tracked, "prospectId"));

	server.abort();
}
