//! Engine running the job dispatcher and event loop.
//!
//! The engine owns the wired service graph. Lifecycle mutations are
//! submitted as named jobs and processed by a semaphore-bounded worker
//! pool; lifecycle events are drained from the broadcast bus and logged.
//! All shared state lives in the store, so workers never coordinate in
//! memory.

pub mod dispatch;

use atelier_config::Config;
use atelier_lifecycle::{OrderService, QuotationService, RealisationService};
use atelier_storage::{
	CustomerRepository, EmployeeRepository, StorageError, StorageService,
};
use atelier_types::{EventBus, StorageKey};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex, Semaphore};

use dispatch::{JobContext, JobRecord, JobRequest, Operation};

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Engine is already running")]
	AlreadyRunning,
	#[error("Service error: {0}")]
	Service(String),
}

/// Errors that can occur when submitting or polling jobs.
#[derive(Debug, Error)]
pub enum DispatchError {
	/// The engine loop is gone and no longer accepts jobs.
	#[error("Job queue is closed")]
	QueueClosed,
	/// No job record exists for this id.
	#[error("Job {0} not found")]
	JobNotFound(String),
	/// The job store failed.
	#[error("Storage error: {0}")]
	Storage(String),
}

/// Correlation handle returned at submission time.
#[derive(Debug, Clone)]
pub struct JobHandle {
	pub id: String,
	pub operation: &'static str,
}

/// Main engine owning the wired service graph and the job queue.
pub struct Engine {
	config: Config,
	storage: Arc<StorageService>,
	customers: Arc<CustomerRepository>,
	employees: Arc<EmployeeRepository>,
	orders: Arc<OrderService>,
	quotations: Arc<QuotationService>,
	realisations: Arc<RealisationService>,
	event_bus: EventBus,
	job_tx: mpsc::UnboundedSender<JobRequest>,
	/// Receiver handed to the run loop exactly once.
	job_rx: Mutex<Option<mpsc::UnboundedReceiver<JobRequest>>>,
}

impl Engine {
	#[allow(clippy::too_many_arguments)]
	pub(crate) fn new(
		config: Config,
		storage: Arc<StorageService>,
		customers: Arc<CustomerRepository>,
		employees: Arc<EmployeeRepository>,
		orders: Arc<OrderService>,
		quotations: Arc<QuotationService>,
		realisations: Arc<RealisationService>,
		event_bus: EventBus,
	) -> Self {
		let (job_tx, job_rx) = mpsc::unbounded_channel();
		Self {
			config,
			storage,
			customers,
			employees,
			orders,
			quotations,
			realisations,
			event_bus,
			job_tx,
			job_rx: Mutex::new(Some(job_rx)),
		}
	}

	/// The engine configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Customer registration and reads.
	pub fn customers(&self) -> &Arc<CustomerRepository> {
		&self.customers
	}

	/// Employee registration and reads.
	pub fn employees(&self) -> &Arc<EmployeeRepository> {
		&self.employees
	}

	/// Order lifecycle service, for synchronous reads.
	pub fn orders(&self) -> &Arc<OrderService> {
		&self.orders
	}

	/// Quotation lifecycle service, for synchronous reads.
	pub fn quotations(&self) -> &Arc<QuotationService> {
		&self.quotations
	}

	/// Realisation lifecycle service, for synchronous reads.
	pub fn realisations(&self) -> &Arc<RealisationService> {
		&self.realisations
	}

	/// Queues a lifecycle operation and returns its correlation handle.
	///
	/// The job record is written before the job is enqueued so a caller
	/// can always poll the id it was handed.
	pub async fn submit(&self, operation: Operation) -> Result<JobHandle, DispatchError> {
		let id = uuid::Uuid::new_v4().to_string();
		let record = JobRecord::queued(&id, &operation);

		self.storage
			.store(StorageKey::Jobs.as_str(), &id, &record)
			.await
			.map_err(|e| DispatchError::Storage(e.to_string()))?;

		let name = operation.name();
		self.job_tx
			.send(JobRequest {
				id: id.clone(),
				operation,
			})
			.map_err(|_| DispatchError::QueueClosed)?;

		tracing::debug!(job_id = %id, operation = name, "Queued job");
		Ok(JobHandle { id, operation: name })
	}

	/// Returns the record of a previously submitted job.
	pub async fn job(&self, job_id: &str) -> Result<JobRecord, DispatchError> {
		match self.storage.retrieve(StorageKey::Jobs.as_str(), job_id).await {
			Ok(record) => Ok(record),
			Err(StorageError::NotFound) => Err(DispatchError::JobNotFound(job_id.to_string())),
			Err(e) => Err(DispatchError::Storage(e.to_string())),
		}
	}

	/// Main execution loop for the engine.
	///
	/// This method:
	/// 1. Takes ownership of the job queue receiver
	/// 2. Subscribes to the lifecycle event bus
	/// 3. Processes queued jobs on a bounded worker pool
	/// 4. Handles graceful shutdown on Ctrl+C
	pub async fn run(&self) -> Result<(), EngineError> {
		let mut job_rx = self
			.job_rx
			.lock()
			.await
			.take()
			.ok_or(EngineError::AlreadyRunning)?;

		let mut events = self.event_bus.subscribe();
		let workers = Arc::new(Semaphore::new(self.config.dispatch.workers));
		let context = Arc::new(self.job_context());

		tracing::info!(
			workers = self.config.dispatch.workers,
			max_retries = self.config.dispatch.max_retries,
			"Engine running"
		);

		loop {
			tokio::select! {
				Some(request) = job_rx.recv() => {
					let permit = workers
						.clone()
						.acquire_owned()
						.await
						.map_err(|e| EngineError::Service(e.to_string()))?;
					let context = context.clone();
					tokio::spawn(async move {
						context.process(request).await;
						drop(permit);
					});
				}

				Ok(event) = events.recv() => {
					tracing::debug!(event = ?event, "Lifecycle event");
				}

				_ = tokio::signal::ctrl_c() => {
					tracing::info!("Shutting down engine");
					break;
				}
			}
		}

		Ok(())
	}

	fn job_context(&self) -> JobContext {
		JobContext {
			orders: self.orders.clone(),
			quotations: self.quotations.clone(),
			realisations: self.realisations.clone(),
			storage: self.storage.clone(),
			max_retries: self.config.dispatch.max_retries,
			retry_delay: Duration::from_secs(self.config.dispatch.retry_delay_secs),
		}
	}
}
