//! Outbound domain events
//!
//! Emission is a non-blocking hand-off. A failed emission is reported on the
//! `freight::notifications` log target and never undoes the write that caused it.

use freight_types::DomainEvent;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Log target operators watch for undelivered events
pub const NOTIFICATION_TARGET: &str = "freight::notifications";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
	#[error("event channel closed")]
	ChannelClosed,
	#[error("event delivery failed: {0}")]
	Delivery(String),
}

/// Receiver of lifecycle events
#[cfg_attr(test, mockall::automock)]
pub trait EventNotifier: Send + Sync {
	/// Hand the event off without waiting for delivery
	fn emit(&self, event: DomainEvent) -> Result<(), NotifyError>;
}

/// Emit `event`, logging the attempt and routing failures to the operator channel
pub fn dispatch(notifier: &dyn EventNotifier, event: DomainEvent) {
	let name = event.name;
	let subject_id = event.subject_id.clone();
	debug!(event = %name, subject = %subject_id, "Emitting event");
	if let Err(e) = notifier.emit(event) {
		error!(
			target: NOTIFICATION_TARGET,
			event = %name,
			subject = %subject_id,
			"Failed to emit event: {}",
			e
		);
	}
}

/// Forwards events to an in-process consumer over an unbounded channel
#[derive(Clone)]
pub struct ChannelNotifier {
	sender: mpsc::UnboundedSender<DomainEvent>,
}

impl ChannelNotifier {
	pub fn new() -> (Self, mpsc::UnboundedReceiver<DomainEvent>) {
		let (sender, receiver) = mpsc::unbounded_channel();
		(Self { sender }, receiver)
	}
}

impl EventNotifier for ChannelNotifier {
	fn emit(&self, event: DomainEvent) -> Result<(), NotifyError> {
		self.sender
			.send(event)
			.map_err(|_| NotifyError::ChannelClosed)
	}
}

/// Writes events to the log with token fields masked; the default when no consumer
/// is wired
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

impl EventNotifier for LoggingNotifier {
	fn emit(&self, event: DomainEvent) -> Result<(), NotifyError> {
		info!(
			target: NOTIFICATION_TARGET,
			event = %event.name,
			subject = %event.subject_id,
			payload = %event.redacted_payload(),
			"Domain event"
		);
		Ok(())
	}
}
