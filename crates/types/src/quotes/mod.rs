//! Quote domain model and lifecycle transition table

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub mod errors;

pub use errors::{GuardViolation, InvalidTransitionError};

use crate::identity::ContactSnapshot;
use crate::pricing::{CargoType, EstimateResult, Priority, ShipmentInput, TransportMode};

/// Quote status. The current status is a projection of the latest transition record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
	Draft,
	Submitted,
	Sent,
	Accepted,
	InTreatment,
	Validated,
	Rejected,
	Cancelled,
	Expired,
}

impl QuoteStatus {
	pub const ALL: [QuoteStatus; 9] = [
		QuoteStatus::Draft,
		QuoteStatus::Submitted,
		QuoteStatus::Sent,
		QuoteStatus::Accepted,
		QuoteStatus::InTreatment,
		QuoteStatus::Validated,
		QuoteStatus::Rejected,
		QuoteStatus::Cancelled,
		QuoteStatus::Expired,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			QuoteStatus::Draft => "DRAFT",
			QuoteStatus::Submitted => "SUBMITTED",
			QuoteStatus::Sent => "SENT",
			QuoteStatus::Accepted => "ACCEPTED",
			QuoteStatus::InTreatment => "IN_TREATMENT",
			QuoteStatus::Validated => "VALIDATED",
			QuoteStatus::Rejected => "REJECTED",
			QuoteStatus::Cancelled => "CANCELLED",
			QuoteStatus::Expired => "EXPIRED",
		}
	}

	/// Terminal statuses accept no further transitions
	#[must_use]
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			QuoteStatus::Validated
				| QuoteStatus::Rejected
				| QuoteStatus::Cancelled
				| QuoteStatus::Expired
		)
	}

	/// Statuses from which a quote expires once its validity window has elapsed
	#[must_use]
	pub fn is_expirable(&self) -> bool {
		matches!(self, QuoteStatus::Sent | QuoteStatus::Accepted)
	}
}

impl fmt::Display for QuoteStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for QuoteStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		QuoteStatus::ALL
			.into_iter()
			.find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| format!("Unknown quote status: {}", s))
	}
}

/// Actions recorded in a quote's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
	/// Initial record written with the quote; not a transition
	Create,
	Submit,
	Send,
	Accept,
	StartTreatment,
	Validate,
	Reject,
	Cancel,
	Expire,
}

impl TransitionAction {
	pub fn as_str(&self) -> &'static str {
		match self {
			TransitionAction::Create => "create",
			TransitionAction::Submit => "submit",
			TransitionAction::Send => "send",
			TransitionAction::Accept => "accept",
			TransitionAction::StartTreatment => "start_treatment",
			TransitionAction::Validate => "validate",
			TransitionAction::Reject => "reject",
			TransitionAction::Cancel => "cancel",
			TransitionAction::Expire => "expire",
		}
	}

	/// Status reached by applying this action from `from`, or `None` when there is no edge
	pub fn target_status(&self, from: QuoteStatus) -> Option<QuoteStatus> {
		if from.is_terminal() {
			return None;
		}
		match (self, from) {
			(TransitionAction::Submit, QuoteStatus::Draft) => Some(QuoteStatus::Submitted),
			(TransitionAction::Send, QuoteStatus::Submitted) => Some(QuoteStatus::Sent),
			(TransitionAction::Accept, QuoteStatus::Sent) => Some(QuoteStatus::Accepted),
			(TransitionAction::StartTreatment, QuoteStatus::Accepted) => {
				Some(QuoteStatus::InTreatment)
			},
			(TransitionAction::Validate, QuoteStatus::InTreatment) => Some(QuoteStatus::Validated),
			(TransitionAction::Reject, _) => Some(QuoteStatus::Rejected),
			(TransitionAction::Cancel, _) => Some(QuoteStatus::Cancelled),
			(TransitionAction::Expire, status) if status.is_expirable() => {
				Some(QuoteStatus::Expired)
			},
			_ => None,
		}
	}

	/// Whether the transition must carry a free-text reason
	pub fn requires_reason(&self) -> bool {
		matches!(self, TransitionAction::Reject | TransitionAction::Cancel)
	}

	/// Whether the transition must be performed by an operator
	pub fn requires_operator(&self) -> bool {
		matches!(
			self,
			TransitionAction::StartTreatment | TransitionAction::Validate
		)
	}
}

impl fmt::Display for TransitionAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for TransitionAction {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"submit" => Ok(TransitionAction::Submit),
			"send" => Ok(TransitionAction::Send),
			"accept" => Ok(TransitionAction::Accept),
			"start_treatment" => Ok(TransitionAction::StartTreatment),
			"validate" => Ok(TransitionAction::Validate),
			"reject" => Ok(TransitionAction::Reject),
			"cancel" => Ok(TransitionAction::Cancel),
			"expire" => Ok(TransitionAction::Expire),
			other => Err(format!("Unknown transition: {}", other)),
		}
	}
}

/// Who performed a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Actor {
	Customer { id: String },
	Operator { id: String },
	System,
}

impl Actor {
	pub fn is_operator(&self) -> bool {
		matches!(self, Actor::Operator { .. })
	}

	pub fn id(&self) -> Option<&str> {
		match self {
			Actor::Customer { id } | Actor::Operator { id } => Some(id),
			Actor::System => None,
		}
	}
}

impl fmt::Display for Actor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Actor::Customer { id } => write!(f, "customer:{}", id),
			Actor::Operator { id } => write!(f, "operator:{}", id),
			Actor::System => write!(f, "system"),
		}
	}
}

/// Caller-supplied transition details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionPayload {
	#[serde(default)]
	pub note: Option<String>,
	#[serde(default)]
	pub reason: Option<String>,
	#[serde(default)]
	pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl TransitionPayload {
	pub fn with_reason(reason: impl Into<String>) -> Self {
		Self {
			reason: Some(reason.into()),
			..Default::default()
		}
	}

	pub fn with_note(mut self, note: impl Into<String>) -> Self {
		self.note = Some(note.into());
		self
	}
}

/// Immutable history entry. The log is the source of truth for a quote's status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRecord {
	pub record_id: String,
	pub quote_id: String,
	/// Quote version produced by this record
	pub sequence: u64,
	pub action: TransitionAction,
	pub from_status: Option<QuoteStatus>,
	pub to_status: QuoteStatus,
	pub actor: Actor,
	pub note: Option<String>,
	pub metadata: serde_json::Value,
	pub occurred_at: DateTime<Utc>,
}

impl TransitionRecord {
	pub fn new(
		quote: &Quote,
		action: TransitionAction,
		from_status: Option<QuoteStatus>,
		actor: Actor,
		note: Option<String>,
		metadata: serde_json::Value,
		occurred_at: DateTime<Utc>,
	) -> Self {
		Self {
			record_id: Uuid::new_v4().to_string(),
			quote_id: quote.quote_id.clone(),
			sequence: quote.version,
			action,
			from_status,
			to_status: quote.status,
			actor,
			note,
			metadata,
			occurred_at,
		}
	}
}

/// Input for creating a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuote {
	pub shipment: ShipmentInput,
	#[serde(default)]
	pub contact: Option<ContactSnapshot>,
	#[serde(default)]
	pub account_id: Option<String>,
}

/// A priced shipment estimate with a lifecycle status
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
	pub quote_id: String,
	pub quote_number: String,
	pub status: QuoteStatus,
	pub shipment: ShipmentInput,
	pub currency: String,
	pub estimate: Option<EstimateResult>,
	pub contact: Option<ContactSnapshot>,
	/// Owning account; `None` exactly while the quote is unattached
	pub account_id: Option<String>,
	pub attached: bool,
	pub attached_at: Option<DateTime<Utc>>,
	/// Prospect registered under the contact email when the guest quote was created
	pub prospect_id: Option<String>,
	pub tracking_token: Option<String>,
	pub token_expires_at: Option<DateTime<Utc>>,
	pub assigned_agent: Option<String>,
	pub sent_at: Option<DateTime<Utc>>,
	pub accepted_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub valid_until: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	/// Optimistic concurrency version, incremented by every write
	pub version: u64,
}

impl Quote {
	pub fn new(
		quote_number: String,
		shipment: ShipmentInput,
		currency: impl Into<String>,
		created_at: DateTime<Utc>,
		valid_until: DateTime<Utc>,
	) -> Self {
		Self {
			quote_id: Uuid::new_v4().to_string(),
			quote_number,
			status: QuoteStatus::Draft,
			shipment,
			currency: currency.into(),
			estimate: None,
			contact: None,
			account_id: None,
			attached: false,
			attached_at: None,
			prospect_id: None,
			tracking_token: None,
			token_expires_at: None,
			assigned_agent: None,
			sent_at: None,
			accepted_at: None,
			created_at,
			valid_until,
			updated_at: created_at,
			version: 1,
		}
	}

	pub fn estimated_cost(&self) -> Option<Decimal> {
		self.estimate.as_ref().map(|e| e.estimated_cost)
	}

	/// Expirable quote whose validity window has elapsed
	pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
		self.status.is_expirable() && now >= self.valid_until
	}

	pub fn is_orphan(&self) -> bool {
		self.account_id.is_none()
	}

	/// Move to `to`, bumping the version. Guards are the caller's responsibility.
	pub fn advance(&mut self, to: QuoteStatus, now: DateTime<Utc>) {
		self.status = to;
		self.updated_at = now;
		self.version += 1;
	}
}

/// Read model returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSnapshot {
	pub quote_id: String,
	pub quote_number: String,
	pub status: QuoteStatus,
	pub origin_country: String,
	pub destination_country: String,
	pub cargo_type: CargoType,
	pub transport_modes: Vec<TransportMode>,
	pub priority: Priority,
	pub package_count: usize,
	pub total_weight_kg: Decimal,
	pub currency: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub estimated_cost: Option<Decimal>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub chargeable_weight_kg: Option<Decimal>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub selected_mode: Option<TransportMode>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub estimate: Option<EstimateResult>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub contact: Option<ContactSnapshot>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub account_id: Option<String>,
	pub attached: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub prospect_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tracking_token: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub token_expires_at: Option<DateTime<Utc>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub assigned_agent: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sent_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub valid_until: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub version: u64,
}

impl QuoteSnapshot {
	/// View for anonymous tracking lookups: no contact details, no token echo
	pub fn redacted(mut self) -> Self {
		self.contact = None;
		self.tracking_token = None;
		self.account_id = None;
		self.prospect_id = None;
		self.assigned_agent = None;
		self
	}
}

impl From<&Quote> for QuoteSnapshot {
	fn from(quote: &Quote) -> Self {
		let estimate = quote.estimate.as_ref();
		Self {
			quote_id: quote.quote_id.clone(),
			quote_number: quote.quote_number.clone(),
			status: quote.status,
			origin_country: quote.shipment.origin_country.clone(),
			destination_country: quote.shipment.destination_country.clone(),
			cargo_type: quote.shipment.cargo_type,
			transport_modes: quote.shipment.distinct_modes(),
			priority: quote.shipment.priority,
			package_count: quote.shipment.packages.len(),
			total_weight_kg: quote.shipment.total_weight_kg(),
			currency: quote.currency.clone(),
			estimated_cost: estimate.map(|e| e.estimated_cost),
			chargeable_weight_kg: estimate.map(|e| e.chargeable_weight_kg),
			selected_mode: estimate.map(|e| e.selected_mode),
			estimate: quote.estimate.clone(),
			contact: quote.contact.clone(),
			account_id: quote.account_id.clone(),
			attached: quote.attached,
			prospect_id: quote.prospect_id.clone(),
			tracking_token: quote.tracking_token.clone(),
			token_expires_at: quote.token_expires_at,
			assigned_agent: quote.assigned_agent.clone(),
			sent_at: quote.sent_at,
			created_at: quote.created_at,
			valid_until: quote.valid_until,
			updated_at: quote.updated_at,
			version: quote.version,
		}
	}
}

impl From<Quote> for QuoteSnapshot {
	fn from(quote: Quote) -> Self {
		QuoteSnapshot::from(&quote)
	}
}

/// Key of the per-day quote number sequence
pub fn quote_day_key(date: NaiveDate) -> String {
	date.format("%Y%m%d").to_string()
}

/// `PREFIX-YYYYMMDD-NNNN`; the sequence widens past four digits when needed
pub fn format_quote_number(prefix: &str, date: NaiveDate, sequence: u32) -> String {
	format!("{}-{}-{:04}", prefix, quote_day_key(date), sequence)
}
