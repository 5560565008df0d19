//! Domain events handed to the event notifier

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::quotes::QuoteStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
	#[serde(rename = "quote.created")]
	QuoteCreated,
	#[serde(rename = "quote.submitted")]
	QuoteSubmitted,
	#[serde(rename = "quote.sent")]
	QuoteSent,
	#[serde(rename = "quote.accepted")]
	QuoteAccepted,
	#[serde(rename = "quote.treatment_started")]
	QuoteTreatmentStarted,
	#[serde(rename = "quote.validated")]
	QuoteValidated,
	#[serde(rename = "quote.rejected")]
	QuoteRejected,
	#[serde(rename = "quote.cancelled")]
	QuoteCancelled,
	#[serde(rename = "quote.expired")]
	QuoteExpired,
	#[serde(rename = "prospect.invited")]
	ProspectInvited,
	#[serde(rename = "account.orphans_attached")]
	AccountOrphansAttached,
}

impl EventName {
	pub fn as_str(&self) -> &'static str {
		match self {
			EventName::QuoteCreated => "quote.created",
			EventName::QuoteSubmitted => "quote.submitted",
			EventName::QuoteSent => "quote.sent",
			EventName::QuoteAccepted => "quote.accepted",
			EventName::QuoteTreatmentStarted => "quote.treatment_started",
			EventName::QuoteValidated => "quote.validated",
			EventName::QuoteRejected => "quote.rejected",
			EventName::QuoteCancelled => "quote.cancelled",
			EventName::QuoteExpired => "quote.expired",
			EventName::ProspectInvited => "prospect.invited",
			EventName::AccountOrphansAttached => "account.orphans_attached",
		}
	}

	/// Event announcing that a quote entered `status`
	pub fn for_status(status: QuoteStatus) -> Self {
		match status {
			QuoteStatus::Draft => EventName::QuoteCreated,
			QuoteStatus::Submitted => EventName::QuoteSubmitted,
			QuoteStatus::Sent => EventName::QuoteSent,
			QuoteStatus::Accepted => EventName::QuoteAccepted,
			QuoteStatus::InTreatment => EventName::QuoteTreatmentStarted,
			QuoteStatus::Validated => EventName::QuoteValidated,
			QuoteStatus::Rejected => EventName::QuoteRejected,
			QuoteStatus::Cancelled => EventName::QuoteCancelled,
			QuoteStatus::Expired => EventName::QuoteExpired,
		}
	}
}

impl fmt::Display for EventName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
	pub event_id: String,
	pub name: EventName,
	/// Id of the quote, prospect or account the event is about
	pub subject_id: String,
	pub payload: serde_json::Value,
	pub occurred_at: DateTime<Utc>,
}

impl DomainEvent {
	pub fn new(
		name: EventName,
		subject_id: impl Into<String>,
		payload: serde_json::Value,
		occurred_at: DateTime<Utc>,
	) -> Self {
		Self {
			event_id: Uuid::new_v4().to_string(),
			name,
			subject_id: subject_id.into(),
			payload,
			occurred_at,
		}
	}

	/// Payload with every token-bearing field masked, safe to write to logs
	pub fn redacted_payload(&self) -> serde_json::Value {
		redact(&self.payload)
	}
}

const REDACTED: &str = "[REDACTED]";

fn redact(value: &serde_json::Value) -> serde_json::Value {
	match value {
		serde_json::Value::Object(map) => serde_json::Value::Object(
			map.iter()
				.map(|(key, field)| {
					let masked = if key.to_ascii_lowercase().contains("token") {
						serde_json::Value::String(REDACTED.to_string())
					} else {
						redact(field)
					};
					(key.clone(), masked)
				})
				.collect(),
		),
		serde_json::Value::Array(items) => {
			serde_json::Value::Array(items.iter().map(redact).collect())
		},
		other => other.clone(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_redacted_payload_masks_tokens() {
		let event = DomainEvent::new(
			EventName::ProspectInvited,
			"prospect-1",
			serde_json::json!({
				"recipient": "a@example.com",
				"invitationToken": "secret-invitation",
				"links": [{ "trackingToken": "secret-tracking" }],
			}),
			Utc::now(),
		);
		let redacted = event.redacted_payload();
		assert_eq!(redacted["recipient"], "a@example.com");
		assert_eq!(redacted["invitationToken"], REDACTED);
		assert_eq!(redacted["links"][0]["trackingToken"], REDACTED);
		assert!(!redacted.to_string().contains("secret"));
		// The delivered event keeps the token for the consumer
		assert_eq!(event.payload["invitationToken"], "secret-invitation");
	}

	#[test]
	fn test_event_names_serialize_dotted() {
		for status in QuoteStatus::ALL {
			let name = EventName::for_status(status);
			let json = serde_json::to_value(name).unwrap();
			assert_eq!(json, serde_json::Value::String(name.as_str().to_string()));
		}
		assert_eq!(
			serde_json::to_string(&EventName::AccountOrphansAttached).unwrap(),
			"\"account.orphans_attached\""
		);
	}
}
