//! Quote lifecycle service
//!
//! Owns the quote state machine. Every write replaces the status projection and
//! appends its transition record in one compare-and-swap on the quote version, so
//! the log and the status can never disagree and a lost race surfaces as
//! [`LifecycleError::Conflict`].
//!
//! Expiry is lazy: an overdue SENT/ACCEPTED quote is moved to EXPIRED when it is
//! read or transitioned, and by the periodic sweep. Writes never check it eagerly.

use std::sync::Arc;

use async_trait::async_trait;
use freight_storage::{Storage, StorageError};
use freight_types::chrono::{DateTime, Duration, Utc};
use freight_types::quotes::{format_quote_number, quote_day_key};
use freight_types::identity::normalize_email;
use freight_types::{
	Actor, DomainEvent, EventName, GuardViolation, InvalidShipmentError, InvalidTransitionError,
	NewQuote, PricingConfig, ProspectStatus, Quote, QuoteSnapshot, QuoteStatus, TokenError,
	TokenKind, TransitionAction, TransitionPayload, TransitionRecord,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::notifier::{dispatch, EventNotifier};
use crate::pricing::{PricingError, PricingServiceTrait};
use crate::tokens::TokenService;

#[derive(Debug, Error)]
pub enum LifecycleError {
	#[error(transparent)]
	InvalidTransition(#[from] InvalidTransitionError),
	#[error(transparent)]
	GuardRejected(#[from] GuardViolation),
	#[error(transparent)]
	InvalidShipment(#[from] InvalidShipmentError),
	#[error("quote not found: {0}")]
	NotFound(String),
	#[error("quote {0} was modified concurrently, reload and retry")]
	Conflict(String),
	#[error(transparent)]
	Token(#[from] TokenError),
	#[error("storage error: {0}")]
	Storage(String),
}

impl From<StorageError> for LifecycleError {
	fn from(error: StorageError) -> Self {
		match error {
			StorageError::NotFound { id } => LifecycleError::NotFound(id),
			StorageError::Conflict { id, .. } => LifecycleError::Conflict(id),
			other => LifecycleError::Storage(other.to_string()),
		}
	}
}

impl From<PricingError> for LifecycleError {
	fn from(error: PricingError) -> Self {
		match error {
			PricingError::InvalidShipment(e) => LifecycleError::InvalidShipment(e),
			other => LifecycleError::Storage(other.to_string()),
		}
	}
}

/// Quote numbering and validity rules
#[derive(Debug, Clone)]
pub struct LifecyclePolicy {
	pub number_prefix: String,
	pub validity: Duration,
	pub min_reason_length: usize,
}

impl Default for LifecyclePolicy {
	fn default() -> Self {
		Self {
			number_prefix: "QT".to_string(),
			validity: Duration::days(30),
			min_reason_length: 10,
		}
	}
}

/// Trait for quote lifecycle operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteLifecycleTrait: Send + Sync {
	/// Create a DRAFT quote, pricing it when the shipment is complete
	async fn create_quote(
		&self,
		new_quote: NewQuote,
		actor: Actor,
	) -> Result<QuoteSnapshot, LifecycleError>;

	/// Apply a transition from the state table
	async fn transition(
		&self,
		quote_id: &str,
		action: TransitionAction,
		actor: Actor,
		payload: TransitionPayload,
	) -> Result<QuoteSnapshot, LifecycleError>;

	/// Current state of a quote, after lazy expiry
	async fn get_quote(&self, quote_id: &str) -> Result<QuoteSnapshot, LifecycleError>;

	/// Transition log, oldest first
	async fn history(&self, quote_id: &str) -> Result<Vec<TransitionRecord>, LifecycleError>;

	/// Anonymous status lookup through a tracking token
	async fn track(&self, token: &str) -> Result<QuoteSnapshot, LifecycleError>;

	/// Expire every overdue SENT/ACCEPTED quote, returning how many were expired
	async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<usize, LifecycleError>;
}

#[derive(Clone)]
pub struct QuoteLifecycle {
	storage: Arc<dyn Storage>,
	pricing: Arc<dyn PricingServiceTrait>,
	tokens: TokenService,
	notifier: Arc<dyn EventNotifier>,
	policy: LifecyclePolicy,
}

impl QuoteLifecycle {
	pub fn new(
		storage: Arc<dyn Storage>,
		pricing: Arc<dyn PricingServiceTrait>,
		tokens: TokenService,
		notifier: Arc<dyn EventNotifier>,
		policy: LifecyclePolicy,
	) -> Self {
		Self {
			storage,
			pricing,
			tokens,
			notifier,
			policy,
		}
	}

	pub async fn create_quote_at(
		&self,
		new_quote: NewQuote,
		actor: Actor,
		now: DateTime<Utc>,
	) -> Result<QuoteSnapshot, LifecycleError> {
		let NewQuote {
			mut shipment,
			contact,
			account_id,
		} = new_quote;
		shipment.normalize();

		let estimate = match shipment.validate() {
			Ok(()) => match self.pricing.estimate(&shipment).await {
				Ok(estimate) => Some(estimate),
				Err(PricingError::InvalidShipment(e)) => {
					debug!("Draft quote left unpriced: {}", e);
					None
				},
				Err(e) => return Err(e.into()),
			},
			Err(e) => {
				debug!("Draft quote left unpriced: {}", e);
				None
			},
		};

		let today = now.date_naive();
		let sequence = self
			.storage
			.next_quote_sequence(&quote_day_key(today))
			.await?;
		let number = format_quote_number(&self.policy.number_prefix, today, sequence);
		let currency = estimate
			.as_ref()
			.map(|e| e.currency.clone())
			.unwrap_or_else(|| PricingConfig::default().currency);

		let mut quote = Quote::new(number, shipment, currency, now, now + self.policy.validity);
		quote.estimate = estimate;
		quote.contact = contact;
		match account_id {
			Some(account_id) => {
				quote.account_id = Some(account_id);
				quote.attached = true;
				quote.attached_at = Some(now);
			},
			None => {
				let token = self.tokens.issue(TokenKind::Tracking, now);
				quote.tracking_token = Some(token.token);
				quote.token_expires_at = Some(token.expires_at);
				quote.prospect_id = self.owning_prospect(&quote).await?;
			},
		}

		let record = TransitionRecord::new(
			&quote,
			TransitionAction::Create,
			None,
			actor.clone(),
			None,
			json!({
				"quoteNumber": quote.quote_number,
				"estimatedCost": quote.estimated_cost(),
			}),
			now,
		);
		self.storage.insert_quote(quote.clone(), record).await?;

		info!(
			"Created quote {} ({}) by {}",
			quote.quote_number, quote.quote_id, actor
		);
		self.emit(&quote, None, &actor, None, now);
		Ok(QuoteSnapshot::from(&quote))
	}

	pub async fn transition_at(
		&self,
		quote_id: &str,
		action: TransitionAction,
		actor: Actor,
		payload: TransitionPayload,
		now: DateTime<Utc>,
	) -> Result<QuoteSnapshot, LifecycleError> {
		let quote = self.load(quote_id).await?;

		if action != TransitionAction::Expire && quote.is_overdue(now) {
			let expired = self.expire_quote(quote, now).await?;
			if action == TransitionAction::Accept {
				// The accept guard failed; the quote expires instead
				return Ok(QuoteSnapshot::from(&expired));
			}
			return Err(
				InvalidTransitionError::new(&expired.quote_id, expired.status, action).into(),
			);
		}

		self.apply(quote, action, actor, payload, now).await
	}

	pub async fn get_quote_at(
		&self,
		quote_id: &str,
		now: DateTime<Utc>,
	) -> Result<QuoteSnapshot, LifecycleError> {
		let quote = self.load(quote_id).await?;
		let quote = self.expire_if_overdue(quote, now).await?;
		Ok(QuoteSnapshot::from(&quote))
	}

	pub async fn track_at(
		&self,
		token: &str,
		now: DateTime<Utc>,
	) -> Result<QuoteSnapshot, LifecycleError> {
		self.tokens
			.validate(TokenKind::Tracking, token, now)
			.await?
			.into_result()?;
		let quote = self
			.storage
			.get_quote_by_tracking_token(token)
			.await?
			.ok_or(TokenError::NotFound)?;
		let quote = self.expire_if_overdue(quote, now).await?;
		Ok(QuoteSnapshot::from(&quote).redacted())
	}

	/// Unconverted prospect registered under the guest quote's contact email
	async fn owning_prospect(&self, quote: &Quote) -> Result<Option<String>, LifecycleError> {
		let Some(contact) = &quote.contact else {
			return Ok(None);
		};
		let prospect = self
			.storage
			.get_prospect_by_email(&normalize_email(&contact.email))
			.await?;
		Ok(prospect
			.filter(|p| p.status != ProspectStatus::Converted)
			.map(|p| p.prospect_id))
	}

	async fn load(&self, quote_id: &str) -> Result<Quote, LifecycleError> {
		self.storage
			.get_quote(quote_id)
			.await?
			.ok_or_else(|| LifecycleError::NotFound(quote_id.to_string()))
	}

	/// Lazy expiry for reads. A lost race means someone else already moved the quote.
	async fn expire_if_overdue(
		&self,
		quote: Quote,
		now: DateTime<Utc>,
	) -> Result<Quote, LifecycleError> {
		if !quote.is_overdue(now) {
			return Ok(quote);
		}
		let quote_id = quote.quote_id.clone();
		match self.expire_quote(quote, now).await {
			Ok(expired) => Ok(expired),
			Err(LifecycleError::Conflict(_)) => self.load(&quote_id).await,
			Err(e) => Err(e),
		}
	}

	async fn expire_quote(&self, quote: Quote, now: DateTime<Utc>) -> Result<Quote, LifecycleError> {
		let snapshot = self
			.apply(
				quote,
				TransitionAction::Expire,
				Actor::System,
				TransitionPayload::default(),
				now,
			)
			.await?;
		self.load(&snapshot.quote_id).await
	}

	/// Check guards, apply effects and commit one transition
	async fn apply(
		&self,
		mut quote: Quote,
		action: TransitionAction,
		actor: Actor,
		payload: TransitionPayload,
		now: DateTime<Utc>,
	) -> Result<QuoteSnapshot, LifecycleError> {
		let from = quote.status;
		let to = action
			.target_status(from)
			.ok_or_else(|| InvalidTransitionError::new(&quote.quote_id, from, action))?;

		if action.requires_operator() && !actor.is_operator() {
			return Err(GuardViolation::OperatorRequired { action }.into());
		}
		let mut metadata = payload.metadata;
		if action.requires_reason() {
			let reason = payload.reason.as_deref().map(str::trim).unwrap_or("");
			if reason.chars().count() < self.policy.min_reason_length {
				return Err(GuardViolation::ReasonTooShort {
					action,
					min_length: self.policy.min_reason_length,
				}
				.into());
			}
			metadata.insert("reason".to_string(), json!(reason));
		}

		match action {
			TransitionAction::Submit => {
				quote.shipment.validate()?;
				if quote.estimate.is_none() {
					let estimate = self.pricing.estimate(&quote.shipment).await?;
					quote.currency = estimate.currency.clone();
					quote.estimate = Some(estimate);
				}
			},
			TransitionAction::Send => {
				let cost = quote.estimated_cost().ok_or(GuardViolation::MissingEstimate)?;
				quote.sent_at = Some(now);
				metadata.insert("estimatedCost".to_string(), json!(cost));
			},
			TransitionAction::Accept => {
				quote.accepted_at = Some(now);
			},
			TransitionAction::StartTreatment | TransitionAction::Validate => {
				quote.assigned_agent = actor.id().map(str::to_string);
				metadata.insert("agent".to_string(), json!(actor.id()));
			},
			TransitionAction::Reject | TransitionAction::Cancel => {},
			TransitionAction::Expire => {
				if now < quote.valid_until {
					return Err(GuardViolation::NotYetOverdue {
						valid_until: quote.valid_until.to_rfc3339(),
					}
					.into());
				}
				metadata.insert("validUntil".to_string(), json!(quote.valid_until));
			},
			TransitionAction::Create => {
				return Err(InvalidTransitionError::new(&quote.quote_id, from, action).into());
			},
		}

		let expected_version = quote.version;
		quote.advance(to, now);
		let record = TransitionRecord::new(
			&quote,
			action,
			Some(from),
			actor.clone(),
			payload.note,
			Value::Object(metadata),
			now,
		);
		let reason = record.metadata.get("reason").cloned();
		self.storage
			.apply_transition(quote.clone(), expected_version, record)
			.await?;

		info!(
			"Quote {} {} -> {} ({} by {})",
			quote.quote_number, from, to, action, actor
		);
		self.emit(&quote, Some(from), &actor, reason, now);
		Ok(QuoteSnapshot::from(&quote))
	}

	fn emit(
		&self,
		quote: &Quote,
		from: Option<QuoteStatus>,
		actor: &Actor,
		reason: Option<Value>,
		now: DateTime<Utc>,
	) {
		let mut payload = json!({
			"quoteNumber": quote.quote_number,
			"from": from,
			"to": quote.status,
			"actor": actor.to_string(),
		});
		if let Some(map) = payload.as_object_mut() {
			if let Some(reason) = reason {
				map.insert("reason".to_string(), reason);
			}
			if let Some(contact) = &quote.contact {
				map.insert("recipient".to_string(), json!(contact.email));
			}
			if let Some(cost) = quote.estimated_cost() {
				map.insert("estimatedCost".to_string(), json!(cost));
			}
		}
		let event = DomainEvent::new(
			EventName::for_status(quote.status),
			quote.quote_id.clone(),
			payload,
			now,
		);
		dispatch(self.notifier.as_ref(), event);
	}
}

#[async_trait]
impl QuoteLifecycleTrait for QuoteLifecycle {
	async fn create_quote(
		&self,
		new_quote: NewQuote,
		actor: Actor,
	) -> Result<QuoteSnapshot, LifecycleError> {
		self.create_quote_at(new_quote, actor, Utc::now()).await
	}

	async fn transition(
		&self,
		quote_id: &str,
		action: TransitionAction,
		actor: Actor,
		payload: TransitionPayload,
	) -> Result<QuoteSnapshot, LifecycleError> {
		self.transition_at(quote_id, action, actor, payload, Utc::now())
			.await
	}

	async fn get_quote(&self, quote_id: &str) -> Result<QuoteSnapshot, LifecycleError> {
		self.get_quote_at(quote_id, Utc::now()).await
	}

	async fn history(&self, quote_id: &str) -> Result<Vec<TransitionRecord>, LifecycleError> {
		Ok(self.storage.quote_history(quote_id).await?)
	}

	async fn track(&self, token: &str) -> Result<QuoteSnapshot, LifecycleError> {
		self.track_at(token, Utc::now()).await
	}

	async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<usize, LifecycleError> {
		let overdue = self.storage.overdue_quotes(now).await?;
		let mut expired = 0;
		for quote in overdue {
			let quote_id = quote.quote_id.clone();
			match self.expire_quote(quote, now).await {
				Ok(_) => expired += 1,
				Err(LifecycleError::Conflict(_)) | Err(LifecycleError::InvalidTransition(_)) => {
					debug!("Quote {} changed during expiry sweep, skipped", quote_id);
				},
				Err(e) => {
					warn!("Failed to expire quote {}: {}", quote_id, e);
					return Err(e);
				},
			}
		}
		if expired > 0 {
			info!("Expired {} overdue quotes", expired);
		}
		Ok(expired)
	}
}
