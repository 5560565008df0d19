//! In-memory storage implementation using DashMap
//!
//! Each quote lives in a single map entry together with its transition log, so a
//! transition and its log append happen under one entry lock.

use crate::traits::{
	PickupStorage, PricingConfigStorage, ProspectStorage, PurchaseStorage, QuoteStorage, Storage,
	StorageError, StorageResult, StorageStats,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use freight_types::{
	ContactIdentity, CountryDistance, Pickup, PricingConfig, Prospect, ProspectStatus, Purchase,
	Quote, RecordKind, RecordRef, TransitionRecord,
};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info};

/// A quote projection and its append-only history
#[derive(Debug, Clone)]
struct QuoteRecord {
	quote: Quote,
	history: Vec<TransitionRecord>,
}

/// In-memory storage for quotes, prospects, orphanable records and pricing data
#[derive(Clone, Default)]
pub struct MemoryStore {
	quotes: Arc<DashMap<String, QuoteRecord>>,
	tracking_index: Arc<DashMap<String, String>>,
	quote_sequences: Arc<DashMap<String, u32>>,
	prospects: Arc<DashMap<String, Prospect>>,
	invitation_index: Arc<DashMap<String, String>>,
	pickups: Arc<DashMap<String, Pickup>>,
	purchases: Arc<DashMap<String, Purchase>>,
	pricing_config: Arc<RwLock<Option<PricingConfig>>>,
	distances: Arc<DashMap<(String, String), CountryDistance>>,
	attach_batch: Arc<Mutex<()>>,
}

impl MemoryStore {
	/// Create a new memory store instance
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of stored quotes
	pub fn quote_count(&self) -> usize {
		self.quotes.len()
	}

	fn poisoned() -> StorageError {
		StorageError::Operation {
			message: "pricing configuration lock poisoned".to_string(),
		}
	}

	fn record_exists(&self, record: &RecordRef) -> bool {
		match record.kind {
			RecordKind::Quote => self.quotes.contains_key(&record.id),
			RecordKind::Pickup => self.pickups.contains_key(&record.id),
			RecordKind::Purchase => self.purchases.contains_key(&record.id),
		}
	}

	/// Set the owner if the record is still unowned. Returns whether it attached.
	fn attach_record(&self, record: &RecordRef, account_id: &str, at: DateTime<Utc>) -> bool {
		match record.kind {
			RecordKind::Quote => match self.quotes.get_mut(&record.id) {
				Some(mut entry) if entry.quote.account_id.is_none() => {
					let quote = &mut entry.quote;
					quote.account_id = Some(account_id.to_string());
					quote.attached = true;
					quote.attached_at = Some(at);
					quote.updated_at = at;
					quote.version += 1;
					true
				},
				_ => false,
			},
			RecordKind::Pickup => match self.pickups.get_mut(&record.id) {
				Some(mut pickup) if pickup.account_id.is_none() => {
					pickup.account_id = Some(account_id.to_string());
					pickup.attached = true;
					pickup.attached_at = Some(at);
					true
				},
				_ => false,
			},
			RecordKind::Purchase => match self.purchases.get_mut(&record.id) {
				Some(mut purchase) if purchase.account_id.is_none() => {
					purchase.account_id = Some(account_id.to_string());
					purchase.attached = true;
					purchase.attached_at = Some(at);
					true
				},
				_ => false,
			},
		}
	}
}

fn distance_key(origin: &str, destination: &str) -> (String, String) {
	(origin.to_uppercase(), destination.to_uppercase())
}

#[async_trait]
impl QuoteStorage for MemoryStore {
	async fn insert_quote(&self, quote: Quote, record: TransitionRecord) -> StorageResult<()> {
		let quote_id = quote.quote_id.clone();
		let token = quote.tracking_token.clone();
		match self.quotes.entry(quote_id.clone()) {
			Entry::Occupied(_) => return Err(StorageError::AlreadyExists { id: quote_id }),
			Entry::Vacant(slot) => {
				slot.insert(QuoteRecord {
					quote,
					history: vec![record],
				});
			},
		}
		if let Some(token) = token {
			self.tracking_index.insert(token, quote_id.clone());
		}
		debug!("Stored quote {}", quote_id);
		Ok(())
	}

	async fn get_quote(&self, quote_id: &str) -> StorageResult<Option<Quote>> {
		Ok(self.quotes.get(quote_id).map(|r| r.quote.clone()))
	}

	async fn get_quote_by_tracking_token(&self, token: &str) -> StorageResult<Option<Quote>> {
		let quote_id = match self.tracking_index.get(token) {
			Some(id) => id.value().clone(),
			None => return Ok(None),
		};
		self.get_quote(&quote_id).await
	}

	async fn apply_transition(
		&self,
		quote: Quote,
		expected_version: u64,
		record: TransitionRecord,
	) -> StorageResult<()> {
		let mut entry = self
			.quotes
			.get_mut(&quote.quote_id)
			.ok_or_else(|| StorageError::NotFound {
				id: quote.quote_id.clone(),
			})?;
		let current = entry.quote.version;
		if current != expected_version {
			return Err(StorageError::Conflict {
				id: quote.quote_id.clone(),
				expected: expected_version,
				actual: current,
			});
		}
		entry.quote = quote;
		entry.history.push(record);
		Ok(())
	}

	async fn quote_history(&self, quote_id: &str) -> StorageResult<Vec<TransitionRecord>> {
		self.quotes
			.get(quote_id)
			.map(|r| r.history.clone())
			.ok_or_else(|| StorageError::NotFound {
				id: quote_id.to_string(),
			})
	}

	async fn next_quote_sequence(&self, day: &str) -> StorageResult<u32> {
		let mut counter = self.quote_sequences.entry(day.to_string()).or_insert(0);
		*counter += 1;
		Ok(*counter)
	}

	async fn overdue_quotes(&self, now: DateTime<Utc>) -> StorageResult<Vec<Quote>> {
		Ok(self
			.quotes
			.iter()
			.filter(|r| r.quote.is_overdue(now))
			.map(|r| r.quote.clone())
			.collect())
	}

	async fn find_orphan_quotes(&self, identity: &ContactIdentity) -> StorageResult<Vec<Quote>> {
		Ok(self
			.quotes
			.iter()
			.filter(|r| {
				r.quote.is_orphan()
					&& r.quote.contact.as_ref().is_some_and(|c| identity.matches(c))
			})
			.map(|r| r.quote.clone())
			.collect())
	}
}

#[async_trait]
impl ProspectStorage for MemoryStore {
	async fn add_prospect(&self, prospect: Prospect) -> StorageResult<()> {
		let email = prospect.email.clone();
		let token = prospect.invitation_token.clone();
		match self.prospects.entry(email.clone()) {
			Entry::Occupied(_) => return Err(StorageError::AlreadyExists { id: email }),
			Entry::Vacant(slot) => {
				slot.insert(prospect);
			},
		}
		self.invitation_index.insert(token, email);
		Ok(())
	}

	async fn get_prospect_by_email(&self, email: &str) -> StorageResult<Option<Prospect>> {
		Ok(self.prospects.get(email).map(|p| p.clone()))
	}

	async fn get_prospect_by_invitation(&self, token: &str) -> StorageResult<Option<Prospect>> {
		let email = match self.invitation_index.get(token) {
			Some(email) => email.value().clone(),
			None => return Ok(None),
		};
		self.get_prospect_by_email(&email).await
	}

	async fn update_prospect(
		&self,
		prospect: Prospect,
		expected_version: u64,
	) -> StorageResult<()> {
		let previous_token = {
			let mut entry =
				self.prospects
					.get_mut(&prospect.email)
					.ok_or_else(|| StorageError::NotFound {
						id: prospect.email.clone(),
					})?;
			if entry.version != expected_version {
				return Err(StorageError::Conflict {
					id: prospect.prospect_id.clone(),
					expected: expected_version,
					actual: entry.version,
				});
			}
			let previous = entry.invitation_token.clone();
			*entry = prospect.clone();
			previous
		};
		if previous_token != prospect.invitation_token {
			self.invitation_index.remove(&previous_token);
			self.invitation_index
				.insert(prospect.invitation_token.clone(), prospect.email.clone());
		}
		Ok(())
	}

	async fn overdue_prospects(&self, now: DateTime<Utc>) -> StorageResult<Vec<Prospect>> {
		Ok(self
			.prospects
			.iter()
			.filter(|p| p.is_overdue(now))
			.map(|p| p.clone())
			.collect())
	}
}

#[async_trait]
impl PickupStorage for MemoryStore {
	async fn add_pickup(&self, pickup: Pickup) -> StorageResult<()> {
		match self.pickups.entry(pickup.pickup_id.clone()) {
			Entry::Occupied(slot) => Err(StorageError::AlreadyExists {
				id: slot.key().clone(),
			}),
			Entry::Vacant(slot) => {
				slot.insert(pickup);
				Ok(())
			},
		}
	}

	async fn get_pickup(&self, pickup_id: &str) -> StorageResult<Option<Pickup>> {
		Ok(self.pickups.get(pickup_id).map(|p| p.clone()))
	}

	async fn find_orphan_pickups(&self, identity: &ContactIdentity) -> StorageResult<Vec<Pickup>> {
		Ok(self
			.pickups
			.iter()
			.filter(|p| p.account_id.is_none() && identity.matches(&p.contact))
			.map(|p| p.clone())
			.collect())
	}
}

#[async_trait]
impl PurchaseStorage for MemoryStore {
	async fn add_purchase(&self, purchase: Purchase) -> StorageResult<()> {
		match self.purchases.entry(purchase.purchase_id.clone()) {
			Entry::Occupied(slot) => Err(StorageError::AlreadyExists {
				id: slot.key().clone(),
			}),
			Entry::Vacant(slot) => {
				slot.insert(purchase);
				Ok(())
			},
		}
	}

	async fn get_purchase(&self, purchase_id: &str) -> StorageResult<Option<Purchase>> {
		Ok(self.purchases.get(purchase_id).map(|p| p.clone()))
	}

	async fn find_orphan_purchases(
		&self,
		identity: &ContactIdentity,
	) -> StorageResult<Vec<Purchase>> {
		Ok(self
			.purchases
			.iter()
			.filter(|p| p.account_id.is_none() && identity.matches(&p.contact))
			.map(|p| p.clone())
			.collect())
	}
}

#[async_trait]
impl PricingConfigStorage for MemoryStore {
	async fn get_pricing_config(&self) -> StorageResult<Option<PricingConfig>> {
		let guard = self.pricing_config.read().map_err(|_| Self::poisoned())?;
		Ok(guard.clone())
	}

	async fn save_pricing_config(&self, config: PricingConfig) -> StorageResult<()> {
		let mut guard = self.pricing_config.write().map_err(|_| Self::poisoned())?;
		info!("Saved pricing configuration version {}", config.version);
		*guard = Some(config);
		Ok(())
	}

	async fn get_distance(
		&self,
		origin: &str,
		destination: &str,
	) -> StorageResult<Option<CountryDistance>> {
		Ok(self
			.distances
			.get(&distance_key(origin, destination))
			.map(|d| d.clone()))
	}

	async fn upsert_distance(&self, distance: CountryDistance) -> StorageResult<()> {
		self.distances
			.insert(distance_key(&distance.origin, &distance.destination), distance);
		Ok(())
	}
}

#[async_trait]
impl Storage for MemoryStore {
	async fn attach_records(
		&self,
		records: &[RecordRef],
		account_id: &str,
		at: DateTime<Utc>,
	) -> StorageResult<Vec<RecordRef>> {
		let _batch = self.attach_batch.lock().map_err(|_| StorageError::Operation {
			message: "attach batch lock poisoned".to_string(),
		})?;
		if let Some(missing) = records.iter().find(|r| !self.record_exists(r)) {
			return Err(StorageError::NotFound {
				id: missing.id.clone(),
			});
		}
		// Records are never removed, so every attach below is infallible
		let attached: Vec<RecordRef> = records
			.iter()
			.filter(|r| self.attach_record(r, account_id, at))
			.cloned()
			.collect();
		debug!(
			"Attached {} of {} records to account {}",
			attached.len(),
			records.len(),
			account_id
		);
		Ok(attached)
	}

	async fn health_check(&self) -> StorageResult<bool> {
		// Memory store is always healthy
		Ok(true)
	}

	async fn stats(&self) -> StorageResult<StorageStats> {
		let mut stats = StorageStats {
			total_quotes: self.quotes.len(),
			total_prospects: self.prospects.len(),
			total_pickups: self.pickups.len(),
			total_purchases: self.purchases.len(),
			configured_distances: self.distances.len(),
			..Default::default()
		};
		for record in self.quotes.iter() {
			if !record.quote.status.is_terminal() {
				stats.open_quotes += 1;
			}
			if record.quote.is_orphan() {
				stats.orphan_quotes += 1;
			}
		}
		stats.pending_prospects = self
			.prospects
			.iter()
			.filter(|p| p.status == ProspectStatus::Pending)
			.count();
		Ok(stats)
	}

	async fn close(&self) -> StorageResult<()> {
		// Memory store doesn't need explicit closing
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;
	use freight_types::{
		Actor, CargoType, ContactSnapshot, IssuedToken, Priority, ProspectRequest, QuoteStatus,
		ShipmentInput, TokenKind, TransitionAction, TransportMode,
	};
	use rust_decimal::Decimal;

	fn sample_quote(email: &str) -> Quote {
		let now = Utc::now();
		let shipment = ShipmentInput::new(
			"FR",
			"DE",
			CargoType::General,
			Decimal::from(500),
			vec![TransportMode::Road],
			Priority::Standard,
		);
		let mut quote = Quote::new(
			"QT-20240101-0001".to_string(),
			shipment,
			"EUR",
			now,
			now + Duration::days(30),
		);
		quote.contact = Some(ContactSnapshot::new(email));
		quote.tracking_token = Some(format!("token-{}", quote.quote_id));
		quote
	}

	fn creation_record(quote: &Quote) -> TransitionRecord {
		TransitionRecord::new(
			quote,
			TransitionAction::Create,
			None,
			Actor::System,
			None,
			serde_json::Value::Null,
			quote.created_at,
		)
	}

	async fn store_with(quote: &Quote) -> MemoryStore {
		let store = MemoryStore::new();
		store
			.insert_quote(quote.clone(), creation_record(quote))
			.await
			.unwrap();
		store
	}

	#[tokio::test]
	async fn test_insert_and_lookup_by_token() {
		let quote = sample_quote("a@example.com");
		let store = store_with(&quote).await;

		let token = quote.tracking_token.clone().unwrap();
		let found = store.get_quote_by_tracking_token(&token).await.unwrap();
		assert_eq!(found.map(|q| q.quote_id), Some(quote.quote_id.clone()));
		assert_eq!(store.quote_history(&quote.quote_id).await.unwrap().len(), 1);

		let duplicate = store
			.insert_quote(quote.clone(), creation_record(&quote))
			.await;
		assert!(matches!(duplicate, Err(StorageError::AlreadyExists { .. })));
	}

	#[tokio::test]
	async fn test_apply_transition_rejects_stale_version() {
		let quote = sample_quote("a@example.com");
		let store = store_with(&quote).await;

		let mut first = quote.clone();
		first.advance(QuoteStatus::Submitted, Utc::now());
		let record = TransitionRecord::new(
			&first,
			TransitionAction::Submit,
			Some(QuoteStatus::Draft),
			Actor::System,
			None,
			serde_json::Value::Null,
			Utc::now(),
		);
		store
			.apply_transition(first, quote.version, record.clone())
			.await
			.unwrap();

		let mut second = quote.clone();
		second.advance(QuoteStatus::Cancelled, Utc::now());
		let result = store.apply_transition(second, quote.version, record).await;
		assert!(matches!(result, Err(StorageError::Conflict { .. })));

		let stored = store.get_quote(&quote.quote_id).await.unwrap().unwrap();
		assert_eq!(stored.status, QuoteStatus::Submitted);
		assert_eq!(store.quote_history(&quote.quote_id).await.unwrap().len(), 2);
	}

	#[tokio::test]
	async fn test_quote_sequence_is_per_day() {
		let store = MemoryStore::new();
		assert_eq!(store.next_quote_sequence("20240101").await.unwrap(), 1);
		assert_eq!(store.next_quote_sequence("20240101").await.unwrap(), 2);
		assert_eq!(store.next_quote_sequence("20240102").await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_attach_is_conditional() {
		let quote = sample_quote("Guest@Example.com");
		let store = store_with(&quote).await;
		let identity = ContactIdentity::new("guest@example.com", None);

		let orphans = store.find_orphan_quotes(&identity).await.unwrap();
		assert_eq!(orphans.len(), 1);

		let now = Utc::now();
		let records = vec![RecordRef::new(RecordKind::Quote, quote.quote_id.clone())];
		assert_eq!(
			store.attach_records(&records, "acct-1", now).await.unwrap(),
			records
		);
		assert!(store
			.attach_records(&records, "acct-2", now)
			.await
			.unwrap()
			.is_empty());

		let stored = store.get_quote(&quote.quote_id).await.unwrap().unwrap();
		assert_eq!(stored.account_id.as_deref(), Some("acct-1"));
		assert!(stored.attached);
		assert!(store.find_orphan_quotes(&identity).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_attach_batch_is_all_or_nothing() {
		let quote = sample_quote("guest@example.com");
		let store = store_with(&quote).await;
		let records = vec![
			RecordRef::new(RecordKind::Quote, quote.quote_id.clone()),
			RecordRef::new(RecordKind::Pickup, "missing-pickup"),
		];

		let result = store.attach_records(&records, "acct-1", Utc::now()).await;
		assert!(matches!(result, Err(StorageError::NotFound { ref id }) if id == "missing-pickup"));

		let stored = store.get_quote(&quote.quote_id).await.unwrap().unwrap();
		assert!(stored.account_id.is_none());
		assert!(!stored.attached);
	}

	#[tokio::test]
	async fn test_prospect_invitation_reindexed_on_update() {
		let store = MemoryStore::new();
		let now = Utc::now();
		let invitation = IssuedToken {
			token: "first".to_string(),
			kind: TokenKind::Invitation,
			issued_at: now,
			expires_at: now + Duration::days(7),
		};
		let request = ProspectRequest {
			email: "p@example.com".to_string(),
			phone: None,
			name: None,
			company: None,
		};
		let mut prospect = Prospect::new(request, invitation);
		store.add_prospect(prospect.clone()).await.unwrap();

		prospect.reactivate(IssuedToken {
			token: "second".to_string(),
			kind: TokenKind::Invitation,
			issued_at: now,
			expires_at: now + Duration::days(7),
		});
		store.update_prospect(prospect, 1).await.unwrap();

		assert!(store
			.get_prospect_by_invitation("first")
			.await
			.unwrap()
			.is_none());
		assert!(store
			.get_prospect_by_invitation("second")
			.await
			.unwrap()
			.is_some());
	}

	#[tokio::test]
	async fn test_prospect_update_rejects_stale_version() {
		let store = MemoryStore::new();
		let now = Utc::now();
		let invitation = IssuedToken {
			token: "tok".to_string(),
			kind: TokenKind::Invitation,
			issued_at: now,
			expires_at: now + Duration::days(7),
		};
		let request = ProspectRequest {
			email: "q@example.com".to_string(),
			phone: None,
			name: None,
			company: None,
		};
		let prospect = Prospect::new(request, invitation);
		store.add_prospect(prospect.clone()).await.unwrap();

		let mut converted = prospect.clone();
		converted.mark_converted("acct-1", now);
		store.update_prospect(converted, 1).await.unwrap();

		let mut expired = prospect;
		expired.mark_expired(now);
		assert!(matches!(
			store.update_prospect(expired, 1).await,
			Err(StorageError::Conflict {
				expected: 1,
				actual: 2,
				..
			})
		));
		let stored = store.get_prospect_by_email("q@example.com").await.unwrap().unwrap();
		assert_eq!(stored.status, ProspectStatus::Converted);
	}

	#[tokio::test]
	async fn test_distances_are_ordered_pairs() {
		let store = MemoryStore::new();
		store
			.upsert_distance(CountryDistance::new("FR", "DE", 1050))
			.await
			.unwrap();
		assert!(store.get_distance("fr", "de").await.unwrap().is_some());
		assert!(store.get_distance("DE", "FR").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_stats() {
		let quote = sample_quote("a@example.com");
		let store = store_with(&quote).await;
		let stats = store.stats().await.unwrap();
		assert_eq!(stats.total_quotes, 1);
		assert_eq!(stats.open_quotes, 1);
		assert_eq!(stats.orphan_quotes, 1);
	}
}
