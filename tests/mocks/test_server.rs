//! Test server for integration tests

use std::sync::Arc;

use axum::Router;
use freight_quoter::{create_router, ChannelNotifier, DomainEvent, QuoterBuilder, Settings};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// A quoter bound to an ephemeral port
pub struct TestServer {
	pub base_url: String,
	pub handle: JoinHandle<()>,
}

impl TestServer {
	/// Spawn a test server with default settings and a seeded FR-DE distance
	#[allow(dead_code)]
	pub async fn spawn() -> Result<Self, Box<dyn std::error::Error>> {
		let (_router, state) = QuoterBuilder::default()
			.with_settings(Settings::default())
			.with_distance("FR", "DE", 1050)
			.start()
			.await?;
		let app: Router = create_router().with_state(state);

		Self::spawn_server_with_app(app).await
	}

	/// Spawn a test server whose domain events are captured on a channel
	#[allow(dead_code)]
	pub async fn spawn_with_events(
	) -> Result<(Self, UnboundedReceiver<DomainEvent>), Box<dyn std::error::Error>> {
		let (notifier, events) = ChannelNotifier::new();
		let (router, _state) = QuoterBuilder::default()
			.with_settings(Settings::default())
			.with_notifier(Arc::new(notifier))
			.start()
			.await?;

		let server = Self::spawn_server_with_app(router).await?;
		Ok((server, events))
	}

	async fn spawn_server_with_app(app: Router) -> Result<Self, Box<dyn std::error::Error>> {
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let base_url = format!("http://{}:{}", addr.ip(), addr.port());

		let handle = tokio::spawn(async move {
			let _ = axum::serve(listener, app).await;
		});

		// Give server time to start
		tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

		Ok(Self { base_url, handle })
	}

	#[allow(dead_code)]
	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	#[allow(dead_code)]
	pub fn abort(self) {
		self.handle.abort();
	}
}
