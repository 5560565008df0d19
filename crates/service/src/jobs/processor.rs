//! Background job processor
//!
//! A bounded tokio queue drained by a fixed pool of workers, plus a scheduler task
//! that feeds recurring sweeps into the same queue. A recurring job whose previous
//! run is still queued or running is skipped rather than stacked.

use async_trait::async_trait;
use futures::FutureExt;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::{mpsc, Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::types::{BackgroundJob, JobError, JobResult};

/// Trait for handling different types of background jobs
#[async_trait]
pub trait JobHandler: Send + Sync {
	/// Handle a background job
	async fn handle(&self, job: BackgroundJob) -> JobResult;
}

/// A recurring job registration
#[derive(Debug, Clone)]
pub struct ScheduledJob {
	/// Names the schedule and de-duplicates overlapping runs
	pub id: String,
	pub interval: Duration,
	pub job: BackgroundJob,
	pub description: String,
}

#[derive(Debug, Clone)]
struct JobSchedule {
	job: ScheduledJob,
	next_execution: SystemTime,
}

/// Configuration for the job processor
#[derive(Debug, Clone)]
pub struct JobProcessorConfig {
	/// Maximum number of jobs that can be queued
	pub queue_capacity: usize,
	/// Number of worker tasks to spawn
	pub worker_count: usize,
	/// Maximum number of recurring schedules
	pub max_scheduled_jobs: usize,
}

impl Default for JobProcessorConfig {
	fn default() -> Self {
		Self {
			queue_capacity: 16,
			worker_count: 2,
			max_scheduled_jobs: 8,
		}
	}
}

#[derive(Debug, Clone)]
struct JobRequest {
	job: BackgroundJob,
	schedule_id: String,
}

type Schedules = Arc<RwLock<HashMap<String, JobSchedule>>>;
type ActiveIds = Arc<RwLock<HashSet<String>>>;

pub struct JobProcessor {
	sender: mpsc::Sender<JobRequest>,
	workers: Vec<JoinHandle<()>>,
	config: JobProcessorConfig,
	job_schedules: Schedules,
	scheduler_handle: Option<JoinHandle<()>>,
	scheduler_notify: Arc<Notify>,
}

impl JobProcessor {
	/// Create a new job processor with the given handler and configuration
	pub fn new(handler: Arc<dyn JobHandler>, config: JobProcessorConfig) -> JobResult<Self> {
		if config.worker_count == 0 || config.queue_capacity == 0 {
			return Err(JobError::InvalidConfig(
				"worker_count and queue_capacity must be greater than zero".to_string(),
			));
		}

		let (job_sender, job_receiver) = mpsc::channel::<JobRequest>(config.queue_capacity);
		let job_receiver = Arc::new(tokio::sync::Mutex::new(job_receiver));
		let active_job_ids: ActiveIds = Arc::new(RwLock::new(HashSet::new()));

		let workers = (0..config.worker_count)
			.map(|worker_id| {
				let handler = Arc::clone(&handler);
				let job_receiver = Arc::clone(&job_receiver);
				let active_job_ids = Arc::clone(&active_job_ids);
				tokio::spawn(async move {
					Self::worker_loop(worker_id, handler, job_receiver, active_job_ids).await;
				})
			})
			.collect();

		let job_schedules: Schedules = Arc::new(RwLock::new(HashMap::new()));
		let scheduler_notify = Arc::new(Notify::new());
		let scheduler_handle = {
			let sender = job_sender.clone();
			let schedules = Arc::clone(&job_schedules);
			let notify = Arc::clone(&scheduler_notify);
			tokio::spawn(async move {
				Self::scheduler_loop(sender, schedules, active_job_ids, notify).await;
			})
		};

		info!("Started job processor with {} workers", config.worker_count);

		Ok(Self {
			sender: job_sender,
			workers,
			config,
			job_schedules,
			scheduler_handle: Some(scheduler_handle),
			scheduler_notify,
		})
	}

	async fn scheduler_loop(
		sender: mpsc::Sender<JobRequest>,
		job_schedules: Schedules,
		active_job_ids: ActiveIds,
		notify: Arc<Notify>,
	) {
		debug!("Starting scheduler loop");

		loop {
			let next_wake_time = job_schedules
				.read()
				.await
				.values()
				.map(|schedule| schedule.next_execution)
				.min()
				.unwrap_or_else(|| SystemTime::now() + Duration::from_secs(5));

			if let Ok(sleep_duration) = next_wake_time.duration_since(SystemTime::now()) {
				tokio::select! {
					_ = sleep(sleep_duration) => {}
					_ = notify.notified() => {}
				}
			}

			let due = {
				let mut schedules = job_schedules.write().await;
				let now = SystemTime::now();
				schedules
					.values_mut()
					.filter(|schedule| schedule.next_execution <= now)
					.map(|schedule| {
						schedule.next_execution = now + schedule.job.interval;
						schedule.job.clone()
					})
					.collect::<Vec<_>>()
			};

			for scheduled in due {
				if !active_job_ids.write().await.insert(scheduled.id.clone()) {
					debug!(
						"Scheduled job '{}' ({}) skipped, previous run still active",
						scheduled.id, scheduled.description
					);
					continue;
				}

				let request = JobRequest {
					job: scheduled.job,
					schedule_id: scheduled.id.clone(),
				};
				match tokio::time::timeout(Duration::from_millis(250), sender.send(request)).await
				{
					Ok(Ok(())) => {
						debug!("Submitted scheduled job '{}'", scheduled.id);
					},
					Ok(Err(_)) => {
						error!("Queue closed for scheduled job '{}'", scheduled.id);
						active_job_ids.write().await.remove(&scheduled.id);
						return;
					},
					Err(_) => {
						warn!("Queue busy; dropping scheduled job '{}'", scheduled.id);
						active_job_ids.write().await.remove(&scheduled.id);
					},
				}
			}
		}
	}

	/// Run `job` now and then every `interval_minutes` under `schedule_id`
	pub async fn schedule_job(
		&self,
		interval_minutes: u64,
		job: BackgroundJob,
		description: String,
		schedule_id: &str,
	) -> JobResult<String> {
		if interval_minutes == 0 {
			return Err(JobError::InvalidConfig(
				"interval must be at least one minute".to_string(),
			));
		}
		let interval = Duration::from_secs(interval_minutes * 60);
		let jitter = Self::calculate_jitter(schedule_id, (interval.as_secs() / 12).min(20));
		self.schedule_every(interval + jitter, job, description, schedule_id)
			.await
	}

	pub(crate) async fn schedule_every(
		&self,
		interval: Duration,
		job: BackgroundJob,
		description: String,
		schedule_id: &str,
	) -> JobResult<String> {
		{
			let mut schedules = self.job_schedules.write().await;
			if schedules.len() >= self.config.max_scheduled_jobs {
				return Err(JobError::InvalidConfig(format!(
					"maximum of {} scheduled jobs reached",
					self.config.max_scheduled_jobs
				)));
			}
			if schedules.contains_key(schedule_id) {
				return Err(JobError::Duplicate {
					id: schedule_id.to_string(),
				});
			}
			schedules.insert(
				schedule_id.to_string(),
				JobSchedule {
					job: ScheduledJob {
						id: schedule_id.to_string(),
						interval,
						job,
						description: description.clone(),
					},
					next_execution: SystemTime::now(),
				},
			);
		}
		self.scheduler_notify.notify_one();

		info!(
			"Scheduled job '{}' ({}) to run every {:?}",
			schedule_id, description, interval
		);
		Ok(schedule_id.to_string())
	}

	pub async fn get_scheduled_jobs(&self) -> Vec<ScheduledJob> {
		self.job_schedules
			.read()
			.await
			.values()
			.map(|schedule| schedule.job.clone())
			.collect()
	}

	/// Gracefully shutdown the job processor, letting queued jobs drain
	pub async fn shutdown(mut self) -> JobResult {
		info!("Shutting down job processor...");

		if let Some(scheduler_handle) = self.scheduler_handle.take() {
			scheduler_handle.abort();
		}
		self.job_schedules.write().await.clear();

		drop(self.sender);

		for (i, worker) in self.workers.drain(..).enumerate() {
			if let Err(e) = worker.await {
				error!("Worker {} failed to shutdown cleanly: {}", i, e);
			}
		}

		info!("Job processor shutdown complete");
		Ok(())
	}

	/// Stable jitter derived from the schedule id, spreading schedules apart
	fn calculate_jitter(schedule_id: &str, max_jitter_seconds: u64) -> Duration {
		let mut hasher = DefaultHasher::new();
		schedule_id.hash(&mut hasher);
		Duration::from_secs(hasher.finish() % (max_jitter_seconds + 1))
	}

	async fn worker_loop(
		worker_id: usize,
		handler: Arc<dyn JobHandler>,
		job_receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<JobRequest>>>,
		active_job_ids: ActiveIds,
	) {
		debug!("Worker {} started", worker_id);

		loop {
			let next = job_receiver.lock().await.recv().await;
			let Some(request) = next else {
				break;
			};
			let description = request.job.description();
			debug!("Worker {} processing job: {}", worker_id, description);

			let started = std::time::Instant::now();
			let result = match AssertUnwindSafe(handler.handle(request.job))
				.catch_unwind()
				.await
			{
				Ok(result) => result,
				Err(_) => {
					error!("Job handler panicked for job: {}", description);
					Err(JobError::ProcessingFailed {
						message: "Job handler panicked".to_string(),
					})
				},
			};

			match result {
				Ok(()) => debug!(
					"Worker {} completed job: {} (took {:?})",
					worker_id,
					description,
					started.elapsed()
				),
				Err(e) => error!(
					"Worker {} failed to process job: {} - {}",
					worker_id, description, e
				),
			}

			active_job_ids.write().await.remove(&request.schedule_id);
		}

		debug!("Worker {} stopped", worker_id);
	}
}
