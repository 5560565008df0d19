//! Storage traits for pluggable storage implementations

// Re-export the storage traits from types crate
pub use freight_types::storage::{
	PickupStorageTrait as PickupStorage, PricingConfigStorageTrait as PricingConfigStorage,
	ProspectStorageTrait as ProspectStorage, PurchaseStorageTrait as PurchaseStorage,
	QuoteStorageTrait as QuoteStorage, StorageError, StorageResult, StorageStats,
	StorageTrait as Storage,
};
