//! Pickup and purchase records: guest-created entities that share the quote's
//! nullable-owner pattern and are reconciled the same way.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::identity::ContactSnapshot;

/// Kinds of records that may be orphaned and later attached to an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordKind {
	Quote,
	Pickup,
	Purchase,
}

impl RecordKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			RecordKind::Quote => "quote",
			RecordKind::Pickup => "pickup",
			RecordKind::Purchase => "purchase",
		}
	}
}

impl fmt::Display for RecordKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// A record of some kind, addressed by id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRef {
	pub kind: RecordKind,
	pub id: String,
}

impl RecordRef {
	pub fn new(kind: RecordKind, id: impl Into<String>) -> Self {
		Self {
			kind,
			id: id.into(),
		}
	}
}

/// A pickup request placed by a guest or a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pickup {
	pub pickup_id: String,
	pub contact: ContactSnapshot,
	pub address: String,
	pub scheduled_for: DateTime<Utc>,
	pub account_id: Option<String>,
	pub attached: bool,
	pub attached_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
}

impl Pickup {
	pub fn new(contact: ContactSnapshot, address: impl Into<String>, scheduled_for: DateTime<Utc>) -> Self {
		Self {
			pickup_id: Uuid::new_v4().to_string(),
			contact,
			address: address.into(),
			scheduled_for,
			account_id: None,
			attached: false,
			attached_at: None,
			created_at: Utc::now(),
		}
	}
}

/// A purchase made without an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
	pub purchase_id: String,
	pub contact: ContactSnapshot,
	pub amount: Decimal,
	pub currency: String,
	pub account_id: Option<String>,
	pub attached: bool,
	pub attached_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
}

impl Purchase {
	pub fn new(contact: ContactSnapshot, amount: Decimal, currency: impl Into<String>) -> Self {
		Self {
			purchase_id: Uuid::new_v4().to_string(),
			contact,
			amount,
			currency: currency.into(),
			account_id: None,
			attached: false,
			attached_at: None,
			created_at: Utc::now(),
		}
	}
}
