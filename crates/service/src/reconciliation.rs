//! Orphan reconciliation
//!
//! Attaches guest-created records to a newly provisioned account. Every owner type
//! is searched through the same [`OrphanRepository`] seam. Matches are attached in a
//! single storage batch that skips records someone else already owns, so repeated or
//! concurrent runs never double-attach.

use std::sync::Arc;

use async_trait::async_trait;
use freight_storage::{Storage, StorageError, StorageResult};
use freight_types::chrono::{DateTime, Utc};
use freight_types::{ContactIdentity, DomainEvent, EventName, RecordKind, RecordRef};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use crate::notifier::{dispatch, EventNotifier};
use crate::prospects::{ProspectError, ProspectServiceTrait};

#[derive(Debug, Error)]
pub enum ReconciliationError {
	#[error("invalid identity: {0}")]
	InvalidIdentity(String),
	#[error("record {0} was modified concurrently, retry reconciliation")]
	Conflict(String),
	#[error("storage error: {0}")]
	Storage(String),
}

impl From<StorageError> for ReconciliationError {
	fn from(error: StorageError) -> Self {
		match error {
			StorageError::Conflict { id, .. } => ReconciliationError::Conflict(id),
			other => ReconciliationError::Storage(other.to_string()),
		}
	}
}

impl From<ProspectError> for ReconciliationError {
	fn from(error: ProspectError) -> Self {
		ReconciliationError::Storage(error.to_string())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
	pub account_id: String,
	pub attached_count: usize,
	pub attached: Vec<RecordRef>,
}

/// One owner type that can hold unattached records
#[async_trait]
pub trait OrphanRepository: Send + Sync {
	fn kind(&self) -> RecordKind;

	/// Ids of unattached records whose contact matches `identity`
	async fn find_orphans_matching(&self, identity: &ContactIdentity) -> StorageResult<Vec<String>>;
}

pub struct QuoteOrphans {
	storage: Arc<dyn Storage>,
}

impl QuoteOrphans {
	pub fn new(storage: Arc<dyn Storage>) -> Self {
		Self { storage }
	}
}

#[async_trait]
impl OrphanRepository for QuoteOrphans {
	fn kind(&self) -> RecordKind {
		RecordKind::Quote
	}

	async fn find_orphans_matching(&self, identity: &ContactIdentity) -> StorageResult<Vec<String>> {
		let quotes = self.storage.find_orphan_quotes(identity).await?;
		Ok(quotes.into_iter().map(|q| q.quote_id).collect())
	}
}

pub struct PickupOrphans {
	storage: Arc<dyn Storage>,
}

impl PickupOrphans {
	pub fn new(storage: Arc<dyn Storage>) -> Self {
		Self { storage }
	}
}

#[async_trait]
impl OrphanRepository for PickupOrphans {
	fn kind(&self) -> RecordKind {
		RecordKind::Pickup
	}

	async fn find_orphans_matching(&self, identity: &ContactIdentity) -> StorageResult<Vec<String>> {
		let pickups = self.storage.find_orphan_pickups(identity).await?;
		Ok(pickups.into_iter().map(|p| p.pickup_id).collect())
	}
}

pub struct PurchaseOrphans {
	storage: Arc<dyn Storage>,
}

impl PurchaseOrphans {
	pub fn new(storage: Arc<dyn Storage>) -> Self {
		Self { storage }
	}
}

#[async_trait]
impl OrphanRepository for PurchaseOrphans {
	fn kind(&self) -> RecordKind {
		RecordKind::Purchase
	}

	async fn find_orphans_matching(&self, identity: &ContactIdentity) -> StorageResult<Vec<String>> {
		let purchases = self.storage.find_orphan_purchases(identity).await?;
		Ok(purchases.into_iter().map(|p| p.purchase_id).collect())
	}
}

pub struct ReconciliationService {
	storage: Arc<dyn Storage>,
	repositories: Vec<Arc<dyn OrphanRepository>>,
	prospects: Arc<dyn ProspectServiceTrait>,
	notifier: Arc<dyn EventNotifier>,
}

impl ReconciliationService {
	/// Service covering quotes, pickups and purchases
	pub fn new(
		storage: Arc<dyn Storage>,
		prospects: Arc<dyn ProspectServiceTrait>,
		notifier: Arc<dyn EventNotifier>,
	) -> Self {
		let repositories: Vec<Arc<dyn OrphanRepository>> = vec![
			Arc::new(QuoteOrphans::new(Arc::clone(&storage))),
			Arc::new(PickupOrphans::new(Arc::clone(&storage))),
			Arc::new(PurchaseOrphans::new(Arc::clone(&storage))),
		];
		Self {
			storage,
			repositories,
			prospects,
			notifier,
		}
	}

	pub async fn attach_orphans(
		&self,
		account_id: &str,
		identity: ContactIdentity,
	) -> Result<ReconciliationResult, ReconciliationError> {
		self.attach_orphans_at(account_id, identity, Utc::now()).await
	}

	pub async fn attach_orphans_at(
		&self,
		account_id: &str,
		identity: ContactIdentity,
		now: DateTime<Utc>,
	) -> Result<ReconciliationResult, ReconciliationError> {
		let account_id = account_id.trim();
		if account_id.is_empty() {
			return Err(ReconciliationError::InvalidIdentity(
				"account id must not be empty".to_string(),
			));
		}
		let identity = ContactIdentity::new(&identity.email, identity.phone.as_deref());
		if !identity.is_valid() {
			return Err(ReconciliationError::InvalidIdentity(format!(
				"'{}' is not a valid email address",
				identity.email
			)));
		}

		let mut candidates = Vec::new();
		for repository in &self.repositories {
			let kind = repository.kind();
			let ids = repository.find_orphans_matching(&identity).await?;
			candidates.extend(ids.into_iter().map(|id| RecordRef::new(kind, id)));
		}

		// Conversion is idempotent and runs before the batch, so a failure here leaves
		// every record unattached for the retry
		self.prospects
			.mark_converted(&identity.email, account_id)
			.await?;

		let attached = self
			.storage
			.attach_records(&candidates, account_id, now)
			.await?;
		if attached.len() < candidates.len() {
			debug!(
				"{} records were attached by another run, skipped",
				candidates.len() - attached.len()
			);
		}

		if !attached.is_empty() {
			info!(
				"Attached {} orphan records to account {}",
				attached.len(),
				account_id
			);
			let event = DomainEvent::new(
				EventName::AccountOrphansAttached,
				account_id.to_string(),
				json!({
					"attachedCount": attached.len(),
					"attached": attached,
				}),
				now,
			);
			dispatch(self.notifier.as_ref(), event);
		}

		Ok(ReconciliationResult {
			account_id: account_id.to_string(),
			attached_count: attached.len(),
			attached,
		})
	}
}
