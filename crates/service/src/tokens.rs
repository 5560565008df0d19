//! Opaque token issuance and validation
//!
//! Tokens are 32 random bytes, hex encoded. Callers only learn whether a token is
//! usable: unknown, malformed and expired tokens collapse into the same error.

use std::sync::Arc;

use freight_storage::{Storage, StorageResult};
use freight_types::chrono::{DateTime, Duration, Utc};
use freight_types::tokens::is_well_formed;
use freight_types::{IssuedToken, ProspectStatus, TokenKind, TokenStatus};
use rand::RngCore;
use tracing::debug;

const TOKEN_BYTES: usize = 32;

#[derive(Clone)]
pub struct TokenService {
	storage: Arc<dyn Storage>,
	tracking_ttl: Duration,
	invitation_ttl: Duration,
}

impl TokenService {
	pub fn new(storage: Arc<dyn Storage>) -> Self {
		Self {
			storage,
			tracking_ttl: TokenKind::Tracking.default_ttl(),
			invitation_ttl: TokenKind::Invitation.default_ttl(),
		}
	}

	pub fn with_ttls(mut self, tracking_ttl: Duration, invitation_ttl: Duration) -> Self {
		self.tracking_ttl = tracking_ttl;
		self.invitation_ttl = invitation_ttl;
		self
	}

	pub fn ttl(&self, kind: TokenKind) -> Duration {
		match kind {
			TokenKind::Tracking => self.tracking_ttl,
			TokenKind::Invitation => self.invitation_ttl,
		}
	}

	/// Issue a fresh token. Never reuses a previous value.
	pub fn issue(&self, kind: TokenKind, now: DateTime<Utc>) -> IssuedToken {
		let mut bytes = [0u8; TOKEN_BYTES];
		rand::thread_rng().fill_bytes(&mut bytes);
		IssuedToken {
			token: hex::encode(bytes),
			kind,
			issued_at: now,
			expires_at: now + self.ttl(kind),
		}
	}

	/// Status of `token` at `now`. Malformed tokens are `NotFound` without a lookup.
	pub async fn validate(
		&self,
		kind: TokenKind,
		token: &str,
		now: DateTime<Utc>,
	) -> StorageResult<TokenStatus> {
		if !is_well_formed(token) {
			debug!("Rejected malformed {} token", kind.as_str());
			return Ok(TokenStatus::NotFound);
		}

		let status = match kind {
			TokenKind::Tracking => match self.storage.get_quote_by_tracking_token(token).await? {
				Some(quote) => match quote.token_expires_at {
					Some(expires_at) => TokenStatus::at(expires_at, now),
					None => TokenStatus::NotFound,
				},
				None => TokenStatus::NotFound,
			},
			TokenKind::Invitation => match self.storage.get_prospect_by_invitation(token).await? {
				Some(prospect) if prospect.status == ProspectStatus::Pending => {
					TokenStatus::at(prospect.invitation_expires_at, now)
				},
				Some(_) => TokenStatus::Expired,
				None => TokenStatus::NotFound,
			},
		};
		Ok(status)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use freight_storage::{MemoryStore, ProspectStorage};
	use freight_types::{Prospect, ProspectRequest, TokenError};

	fn service() -> (Arc<MemoryStore>, TokenService) {
		let store = Arc::new(MemoryStore::new());
		let service = TokenService::new(Arc::clone(&store) as Arc<dyn Storage>);
		(store, service)
	}

	#[test]
	fn test_issued_tokens_are_unique_and_opaque() {
		let (_, service) = service();
		let now = Utc::now();
		let first = service.issue(TokenKind::Tracking, now);
		let second = service.issue(TokenKind::Tracking, now);
		assert_ne!(first.token, second.token);
		assert!(is_well_formed(&first.token));
		assert_eq!(first.expires_at - first.issued_at, Duration::hours(72));
	}

	#[tokio::test]
	async fn test_unknown_and_expired_are_indistinguishable() {
		let (store, service) = service();
		let now = Utc::now();
		let invitation = service.issue(TokenKind::Invitation, now);
		let token = invitation.token.clone();
		let request = ProspectRequest {
			email: "p@example.com".to_string(),
			phone: None,
			name: None,
			company: None,
		};
		store
			.add_prospect(Prospect::new(request, invitation))
			.await
			.unwrap();

		let valid = service
			.validate(TokenKind::Invitation, &token, now)
			.await
			.unwrap();
		assert_eq!(valid, TokenStatus::Valid);

		let expired = service
			.validate(TokenKind::Invitation, &token, now + Duration::days(8))
			.await
			.unwrap()
			.into_result()
			.unwrap_err();
		let unknown = service
			.validate(TokenKind::Invitation, &"0".repeat(64), now)
			.await
			.unwrap()
			.into_result()
			.unwrap_err();
		let malformed = service
			.validate(TokenKind::Invitation, "not-a-token", now)
			.await
			.unwrap()
			.into_result()
			.unwrap_err();

		assert_eq!(expired, TokenError::Expired);
		assert_eq!(unknown, TokenError::NotFound);
		assert_eq!(expired.to_string(), unknown.to_string());
		assert_eq!(unknown, malformed);
	}

	#[test]
	fn test_custom_ttls() {
		let (_, service) = service();
		let service = service.with_ttls(Duration::hours(1), Duration::days(1));
		let now = Utc::now();
		assert_eq!(
			service.issue(TokenKind::Invitation, now).expires_at,
			now + Duration::days(1)
		);
	}
}
