//! Freight API
//!
//! Axum routes, handlers and middleware exposing the freight quoting services.

pub mod handlers;
pub mod router;
pub mod security;
pub mod state;

pub use router::create_router;
pub use state::AppState;
