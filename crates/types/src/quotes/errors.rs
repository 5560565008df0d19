//! Error types for quote transitions

use thiserror::Error;

use super::{QuoteStatus, TransitionAction};

/// A transition that has no edge from the quote's current status
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot {action} quote {quote_id} in status {current}")]
pub struct InvalidTransitionError {
	pub quote_id: String,
	pub current: QuoteStatus,
	pub action: TransitionAction,
}

impl InvalidTransitionError {
	pub fn new(quote_id: impl Into<String>, current: QuoteStatus, action: TransitionAction) -> Self {
		Self {
			quote_id: quote_id.into(),
			current,
			action,
		}
	}
}

/// A transition with a valid edge whose guard did not hold
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardViolation {
	#[error("An estimated cost is required before the quote can be sent")]
	MissingEstimate,

	#[error("Only an operator can {action} a quote")]
	OperatorRequired { action: TransitionAction },

	#[error("A reason of at least {min_length} characters is required to {action} a quote")]
	ReasonTooShort {
		action: TransitionAction,
		min_length: usize,
	},

	#[error("Quote is still valid until {valid_until}")]
	NotYetOverdue { valid_until: String },
}
