//! Storage traits for pluggable storage implementations

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::StorageResult;
use crate::identity::ContactIdentity;
use crate::pricing::{CountryDistance, PricingConfig};
use crate::prospects::Prospect;
use crate::quotes::{Quote, TransitionRecord};
use crate::records::{Pickup, Purchase, RecordRef};

/// Statistics about storage usage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageStats {
	pub total_quotes: usize,
	pub open_quotes: usize,
	pub orphan_quotes: usize,
	pub total_prospects: usize,
	pub pending_prospects: usize,
	pub total_pickups: usize,
	pub total_purchases: usize,
	pub configured_distances: usize,
}

/// Quote projection plus its append-only transition log
#[async_trait]
pub trait QuoteStorageTrait: Send + Sync {
	/// Insert a new quote together with its creation record, atomically
	async fn insert_quote(&self, quote: Quote, record: TransitionRecord) -> StorageResult<()>;

	/// Get a quote by ID
	async fn get_quote(&self, quote_id: &str) -> StorageResult<Option<Quote>>;

	/// Resolve a quote from its tracking token
	async fn get_quote_by_tracking_token(&self, token: &str) -> StorageResult<Option<Quote>>;

	/// Replace the stored quote and append `record` in one atomic step, provided the
	/// stored version still equals `expected_version`. Fails with `Conflict` otherwise.
	async fn apply_transition(
		&self,
		quote: Quote,
		expected_version: u64,
		record: TransitionRecord,
	) -> StorageResult<()>;

	/// Transition log of a quote, oldest first
	async fn quote_history(&self, quote_id: &str) -> StorageResult<Vec<TransitionRecord>>;

	/// Next value of the per-day quote number sequence (starts at 1)
	async fn next_quote_sequence(&self, day: &str) -> StorageResult<u32>;

	/// SENT/ACCEPTED quotes whose validity window has elapsed at `now`
	async fn overdue_quotes(&self, now: DateTime<Utc>) -> StorageResult<Vec<Quote>>;

	/// Unattached quotes whose contact matches `identity`
	async fn find_orphan_quotes(&self, identity: &ContactIdentity) -> StorageResult<Vec<Quote>>;
}

/// Trait for prospect storage operations
#[async_trait]
pub trait ProspectStorageTrait: Send + Sync {
	/// Add a prospect; fails with `AlreadyExists` when the email is taken
	async fn add_prospect(&self, prospect: Prospect) -> StorageResult<()>;

	async fn get_prospect_by_email(&self, email: &str) -> StorageResult<Option<Prospect>>;

	async fn get_prospect_by_invitation(&self, token: &str) -> StorageResult<Option<Prospect>>;

	/// Replace a prospect and re-index its invitation token, provided the stored
	/// version still equals `expected_version`. Fails with `Conflict` otherwise.
	async fn update_prospect(
		&self,
		prospect: Prospect,
		expected_version: u64,
	) -> StorageResult<()>;

	/// PENDING prospects whose invitation window has elapsed at `now`
	async fn overdue_prospects(&self, now: DateTime<Utc>) -> StorageResult<Vec<Prospect>>;
}

/// Trait for pickup storage operations
#[async_trait]
pub trait PickupStorageTrait: Send + Sync {
	async fn add_pickup(&self, pickup: Pickup) -> StorageResult<()>;

	async fn get_pickup(&self, pickup_id: &str) -> StorageResult<Option<Pickup>>;

	async fn find_orphan_pickups(&self, identity: &ContactIdentity) -> StorageResult<Vec<Pickup>>;
}

/// Trait for purchase storage operations
#[async_trait]
pub trait PurchaseStorageTrait: Send + Sync {
	async fn add_purchase(&self, purchase: Purchase) -> StorageResult<()>;

	async fn get_purchase(&self, purchase_id: &str) -> StorageResult<Option<Purchase>>;

	async fn find_orphan_purchases(
		&self,
		identity: &ContactIdentity,
	) -> StorageResult<Vec<Purchase>>;
}

/// Administrator-managed pricing parameters and distances
#[async_trait]
pub trait PricingConfigStorageTrait: Send + Sync {
	async fn get_pricing_config(&self) -> StorageResult<Option<PricingConfig>>;

	async fn save_pricing_config(&self, config: PricingConfig) -> StorageResult<()>;

	/// Distance for the ordered pair (origin, destination)
	async fn get_distance(
		&self,
		origin: &str,
		destination: &str,
	) -> StorageResult<Option<CountryDistance>>;

	async fn upsert_distance(&self, distance: CountryDistance) -> StorageResult<()>;
}

/// Main storage trait that combines all storage operations
#[async_trait]
pub trait StorageTrait:
	QuoteStorageTrait
	+ ProspectStorageTrait
	+ PickupStorageTrait
	+ PurchaseStorageTrait
	+ PricingConfigStorageTrait
{
	/// Attach every listed record that is still unowned to `account_id`, as one batch.
	/// Fails with `NotFound` and attaches nothing when any record is missing. Records
	/// that already have an owner are skipped. Returns the records this call attached.
	async fn attach_records(
		&self,
		records: &[RecordRef],
		account_id: &str,
		at: DateTime<Utc>,
	) -> StorageResult<Vec<RecordRef>>;

	/// Health check for the storage system
	async fn health_check(&self) -> StorageResult<bool>;

	/// Get overall storage statistics
	async fn stats(&self) -> StorageResult<StorageStats>;

	/// Close the storage connection
	async fn close(&self) -> StorageResult<()>;

	/// Start any background tasks associated with the storage implementation.
	/// Default implementation does nothing.
	async fn start_background_tasks(&self) -> StorageResult<()> {
		Ok(())
	}
}
