//! Freight Quoter Server
//!
//! Main entry point for the quoting server

use freight_quoter::QuoterBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	QuoterBuilder::new().start_server().await
}
