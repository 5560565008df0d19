pub mod accounts;
pub mod admin;
pub mod common;
pub mod estimates;
pub mod health;
pub mod prospects;
pub mod quotes;
pub mod tracking;

pub use accounts::post_reconcile;
pub use admin::{get_pricing_config, put_distance, put_pricing_config};
pub use estimates::post_estimate;
pub use health::{health, ready};
pub use prospects::{get_invitation, post_prospect};
pub use quotes::{get_quote, get_quote_history, post_quote, post_transition};
pub use tracking::get_tracking;
