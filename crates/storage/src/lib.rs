//! Freight Storage
//!
//! Storage implementations for the freight quoter.
//! Backends implement the traits declared in `freight-types`.

pub mod memory_store;
pub mod traits;

pub use memory_store::MemoryStore;
pub use traits::{
	PickupStorage, PricingConfigStorage, ProspectStorage, PurchaseStorage, QuoteStorage, Storage,
	StorageError, StorageResult, StorageStats,
};
