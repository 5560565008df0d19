//! Prospects: anonymous identities that may later convert into accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::identity::normalize_email;
use crate::tokens::IssuedToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProspectStatus {
	Pending,
	Converted,
	Expired,
}

impl ProspectStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			ProspectStatus::Pending => "PENDING",
			ProspectStatus::Converted => "CONVERTED",
			ProspectStatus::Expired => "EXPIRED",
		}
	}
}

impl fmt::Display for ProspectStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// Registration details submitted by an anonymous requester
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProspectRequest {
	pub email: String,
	#[serde(default)]
	pub phone: Option<String>,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub company: Option<String>,
}

/// An anonymous identity. Never physically deleted; expiry is a status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prospect {
	pub prospect_id: String,
	pub email: String,
	pub phone: Option<String>,
	pub name: Option<String>,
	pub company: Option<String>,
	pub status: ProspectStatus,
	pub invitation_token: String,
	pub invitation_expires_at: DateTime<Utc>,
	pub account_id: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub converted_at: Option<DateTime<Utc>>,
	/// Optimistic concurrency version, incremented by every status change
	#[serde(default)]
	pub version: u64,
}

impl Prospect {
	pub fn new(request: ProspectRequest, invitation: IssuedToken) -> Self {
		let now = invitation.issued_at;
		Self {
			prospect_id: Uuid::new_v4().to_string(),
			email: normalize_email(&request.email),
			phone: request.phone,
			name: request.name,
			company: request.company,
			status: ProspectStatus::Pending,
			invitation_token: invitation.token,
			invitation_expires_at: invitation.expires_at,
			account_id: None,
			created_at: now,
			updated_at: now,
			converted_at: None,
			version: 1,
		}
	}

	/// PENDING prospect whose invitation window has elapsed
	pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
		self.status == ProspectStatus::Pending && now >= self.invitation_expires_at
	}

	/// EXPIRED → PENDING with a regenerated invitation token
	pub fn reactivate(&mut self, invitation: IssuedToken) {
		self.status = ProspectStatus::Pending;
		self.invitation_token = invitation.token;
		self.invitation_expires_at = invitation.expires_at;
		self.updated_at = invitation.issued_at;
		self.version += 1;
	}

	pub fn mark_expired(&mut self, now: DateTime<Utc>) {
		self.status = ProspectStatus::Expired;
		self.updated_at = now;
		self.version += 1;
	}

	pub fn mark_converted(&mut self, account_id: &str, now: DateTime<Utc>) {
		self.status = ProspectStatus::Converted;
		self.account_id = Some(account_id.to_string());
		self.converted_at = Some(now);
		self.updated_at = now;
		self.version += 1;
	}
}
