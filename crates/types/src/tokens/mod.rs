//! Opaque token models shared by tracking and invitation flows

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of an encoded token (32 random bytes, hex)
pub const TOKEN_HEX_LEN: usize = 64;

/// Token classes. Same shape, different validity policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
	/// Anonymous quote status lookup, issued at quote creation
	Tracking,
	/// Registration invitation, issued at prospect creation
	Invitation,
}

impl TokenKind {
	/// Default validity window
	pub fn default_ttl(&self) -> Duration {
		match self {
			TokenKind::Tracking => Duration::hours(72),
			TokenKind::Invitation => Duration::days(7),
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			TokenKind::Tracking => "tracking",
			TokenKind::Invitation => "invitation",
		}
	}
}

/// A freshly issued token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
	pub token: String,
	pub kind: TokenKind,
	pub issued_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
}

/// Internal validation outcome. Callers only ever see [`TokenError`], which hides
/// the difference between an unknown and an expired token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
	Valid,
	Expired,
	NotFound,
}

impl TokenStatus {
	/// Status of a known token at `now`
	pub fn at(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
		if now < expires_at {
			TokenStatus::Valid
		} else {
			TokenStatus::Expired
		}
	}

	pub fn is_valid(&self) -> bool {
		matches!(self, TokenStatus::Valid)
	}

	pub fn into_result(self) -> Result<(), TokenError> {
		match self {
			TokenStatus::Valid => Ok(()),
			TokenStatus::Expired => Err(TokenError::Expired),
			TokenStatus::NotFound => Err(TokenError::NotFound),
		}
	}
}

/// Token failures. Both variants render the same message to avoid enumeration.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
	#[error("Token is invalid or has expired")]
	Expired,

	#[error("Token is invalid or has expired")]
	NotFound,
}

/// Whether a string has the shape of an issued token
pub fn is_well_formed(token: &str) -> bool {
	token.len() == TOKEN_HEX_LEN
		&& token
			.chars()
			.all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}
