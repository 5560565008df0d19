//! Prospect service
//!
//! Prospects are never deleted. Expiry is a status, and an expired prospect that
//! registers again is reactivated with a fresh invitation token.

use std::sync::Arc;

use async_trait::async_trait;
use freight_storage::{Storage, StorageError};
use freight_types::chrono::{DateTime, Utc};
use freight_types::identity::{is_plausible_email, normalize_email};
use freight_types::{
	DomainEvent, EventName, Prospect, ProspectRequest, ProspectStatus, TokenError, TokenKind,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::notifier::{dispatch, EventNotifier};
use crate::tokens::TokenService;

/// Re-reads allowed when a concurrent writer changes the prospect under us
const MAX_UPDATE_ATTEMPTS: usize = 3;

#[derive(Debug, Error)]
pub enum ProspectError {
	#[error("invalid email address: {0}")]
	InvalidEmail(String),
	#[error("prospect {0} has already been converted to an account")]
	AlreadyConverted(String),
	#[error(transparent)]
	Token(#[from] TokenError),
	#[error("storage error: {0}")]
	Storage(String),
}

impl From<StorageError> for ProspectError {
	fn from(error: StorageError) -> Self {
		ProspectError::Storage(error.to_string())
	}
}

/// Trait for prospect operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProspectServiceTrait: Send + Sync {
	/// Register an anonymous requester, or return the existing pending prospect
	async fn register(&self, request: ProspectRequest) -> Result<Prospect, ProspectError>;

	/// Resolve a pending prospect from its invitation token
	async fn validate_invitation(&self, token: &str) -> Result<Prospect, ProspectError>;

	/// Mark overdue pending prospects as expired, returning how many changed
	async fn expire_stale(&self, now: DateTime<Utc>) -> Result<usize, ProspectError>;

	/// Convert the prospect registered under `email`, if any
	async fn mark_converted(
		&self,
		email: &str,
		account_id: &str,
	) -> Result<Option<Prospect>, ProspectError>;
}

#[derive(Clone)]
pub struct ProspectService {
	storage: Arc<dyn Storage>,
	tokens: TokenService,
	notifier: Arc<dyn EventNotifier>,
}

impl ProspectService {
	pub fn new(
		storage: Arc<dyn Storage>,
		tokens: TokenService,
		notifier: Arc<dyn EventNotifier>,
	) -> Self {
		Self {
			storage,
			tokens,
			notifier,
		}
	}

	pub async fn register_at(
		&self,
		mut request: ProspectRequest,
		now: DateTime<Utc>,
	) -> Result<Prospect, ProspectError> {
		request.email = normalize_email(&request.email);
		if !is_plausible_email(&request.email) {
			return Err(ProspectError::InvalidEmail(request.email));
		}

		for _ in 0..MAX_UPDATE_ATTEMPTS {
			if let Some(prospect) = self.try_register(&request, now).await? {
				return Ok(prospect);
			}
		}
		Err(ProspectError::Storage(format!(
			"prospect {} kept changing during registration",
			request.email
		)))
	}

	/// One registration attempt; `None` when a concurrent update won the race
	async fn try_register(
		&self,
		request: &ProspectRequest,
		now: DateTime<Utc>,
	) -> Result<Option<Prospect>, ProspectError> {
		match self.storage.get_prospect_by_email(&request.email).await? {
			None => {
				let prospect = Prospect::new(
					request.clone(),
					self.tokens.issue(TokenKind::Invitation, now),
				);
				match self.storage.add_prospect(prospect.clone()).await {
					Ok(()) => {},
					// Lost a registration race for the same email
					Err(StorageError::AlreadyExists { .. }) => return Ok(None),
					Err(e) => return Err(e.into()),
				}
				info!("Registered prospect {}", prospect.prospect_id);
				self.emit_invited(&prospect, now);
				Ok(Some(prospect))
			},
			Some(prospect) if prospect.status == ProspectStatus::Converted => {
				Err(ProspectError::AlreadyConverted(prospect.prospect_id))
			},
			Some(prospect)
				if prospect.status == ProspectStatus::Pending && !prospect.is_overdue(now) =>
			{
				debug!("Prospect {} already pending", prospect.prospect_id);
				Ok(Some(prospect))
			},
			Some(mut prospect) => {
				let expected = prospect.version;
				prospect.reactivate(self.tokens.issue(TokenKind::Invitation, now));
				match self.storage.update_prospect(prospect.clone(), expected).await {
					Ok(()) => {},
					Err(StorageError::Conflict { .. }) => return Ok(None),
					Err(e) => return Err(e.into()),
				}
				info!("Reactivated prospect {}", prospect.prospect_id);
				self.emit_invited(&prospect, now);
				Ok(Some(prospect))
			},
		}
	}

	pub async fn validate_invitation_at(
		&self,
		token: &str,
		now: DateTime<Utc>,
	) -> Result<Prospect, ProspectError> {
		self.tokens
			.validate(TokenKind::Invitation, token, now)
			.await?
			.into_result()?;
		Ok(self
			.storage
			.get_prospect_by_invitation(token)
			.await?
			.ok_or(TokenError::NotFound)?)
	}

	pub async fn mark_converted_at(
		&self,
		email: &str,
		account_id: &str,
		now: DateTime<Utc>,
	) -> Result<Option<Prospect>, ProspectError> {
		for _ in 0..MAX_UPDATE_ATTEMPTS {
			let Some(mut prospect) = self.storage.get_prospect_by_email(email).await? else {
				return Ok(None);
			};
			if prospect.status == ProspectStatus::Converted {
				if prospect.account_id.as_deref() != Some(account_id) {
					warn!(
						"Prospect {} already converted to a different account",
						prospect.prospect_id
					);
				}
				return Ok(Some(prospect));
			}
			let expected = prospect.version;
			prospect.mark_converted(account_id, now);
			match self.storage.update_prospect(prospect.clone(), expected).await {
				Ok(()) => {
					info!(
						"Prospect {} converted to account {}",
						prospect.prospect_id, account_id
					);
					return Ok(Some(prospect));
				},
				Err(StorageError::Conflict { .. }) => {
					debug!("Prospect {} changed during conversion, retrying", prospect.prospect_id);
				},
				Err(e) => return Err(e.into()),
			}
		}
		Err(ProspectError::Storage(format!(
			"prospect {} kept changing during conversion",
			email
		)))
	}

	/// Expire each overdue prospect unless it changed since it was read
	pub async fn expire_overdue(
		&self,
		overdue: Vec<Prospect>,
		now: DateTime<Utc>,
	) -> Result<usize, ProspectError> {
		let mut expired = 0;
		for mut prospect in overdue {
			let expected = prospect.version;
			prospect.mark_expired(now);
			match self.storage.update_prospect(prospect.clone(), expected).await {
				Ok(()) => expired += 1,
				Err(StorageError::Conflict { .. }) => {
					debug!("Prospect {} changed before expiry, skipping", prospect.prospect_id);
				},
				Err(e) => return Err(e.into()),
			}
		}
		if expired > 0 {
			info!("Expired {} stale prospects", expired);
		}
		Ok(expired)
	}

	fn emit_invited(&self, prospect: &Prospect, now: DateTime<Utc>) {
		let event = DomainEvent::new(
			EventName::ProspectInvited,
			prospect.prospect_id.clone(),
			json!({
				"recipient": prospect.email,
				"invitationToken": prospect.invitation_token,
				"expiresAt": prospect.invitation_expires_at,
			}),
			now,
		);
		dispatch(self.notifier.as_ref(), event);
	}
}

#[async_trait]
impl ProspectServiceTrait for ProspectService {
	async fn register(&self, request: ProspectRequest) -> Result<Prospect, ProspectError> {
		self.register_at(request, Utc::now()).await
	}

	async fn validate_invitation(&self, token: &str) -> Result<Prospect, ProspectError> {
		self.validate_invitation_at(token, Utc::now()).await
	}

	async fn expire_stale(&self, now: DateTime<Utc>) -> Result<usize, ProspectError> {
		let overdue = self.storage.overdue_prospects(now).await?;
		self.expire_overdue(overdue, now).await
	}

	async fn mark_converted(
		&self,
		email: &str,
		account_id: &str,
	) -> Result<Option<Prospect>, ProspectError> {
		self.mark_converted_at(&normalize_email(email), account_id, Utc::now())
			.await
	}
}
