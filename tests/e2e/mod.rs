//! End-to-end test helpers shared by the HTTP suites

use reqwest::{Client, StatusCode};
use serde_json::Value;

pub use crate::mocks::TestServer;

/// POST a JSON body and return the status with the decoded response
#[allow(dead_code)]
pub async fn post_json(client: &Client, url: String, body: &Value) -> (StatusCode, Value) {
	let resp = client.post(url).json(body).send().await.unwrap();
	let status = resp.status();
	(status, resp.json().await.unwrap_or(Value::Null))
}

/// PUT a JSON body and return the status with the decoded response
#[allow(dead_code)]
pub async fn put_json(client: &Client, url: String, body: &Value) -> (StatusCode, Value) {
	let resp = client.put(url).json(body).send().await.unwrap();
	let status = resp.status();
	(status, resp.json().await.unwrap_or(Value::Null))
}

#[allow(dead_code)]
pub async fn get_json(client: &Client, url: String) -> (StatusCode, Value) {
	let resp = client.get(url).send().await.unwrap();
	let status = resp.status();
	(status, resp.json().await.unwrap_or(Value::Null))
}

/// True when the field is absent or null
#[allow(dead_code)]
pub fn is_absent(body: &Value, field: &str) -> bool {
	body.get(field).map_or(true, Value::is_null)
}
