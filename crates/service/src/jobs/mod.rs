//! Background job processing
//!
//! Recurring maintenance sweeps (quote and prospect expiry) run through a small
//! in-process queue. The queue implementation stays private to this module.

pub mod generic_handler;
pub mod handlers;
pub mod processor;
pub mod types;

pub use generic_handler::{GenericJobHandler, SweepParams};
pub use handlers::BackgroundJobHandler;
pub use processor::{JobHandler, JobProcessor, JobProcessorConfig, ScheduledJob};
pub use types::{BackgroundJob, JobError, JobResult};
