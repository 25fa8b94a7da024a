//! Named lifecycle operations and their job records.
//!
//! Every lifecycle mutation is dispatched as a job: a named operation plus
//! its arguments, keyed by a correlation id the caller can poll. Jobs are
//! re-run from their precondition checks on retry, so a retry of an
//! operation that already succeeded fails cleanly instead of applying
//! twice.

use atelier_lifecycle::{LifecycleError, OrderService, QuotationService, RealisationService};
use atelier_storage::{StorageError, StorageService};
use atelier_types::{ServiceKind, StorageKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// A queued lifecycle operation with its arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "operation", content = "payload", rename_all = "snake_case")]
pub enum Operation {
	CreateOrder {
		customer_id: String,
		service: ServiceKind,
		description: String,
	},
	CancelOrder {
		order_id: String,
		author_id: String,
		comment: Option<String>,
	},
	ValidateOrder {
		order_id: String,
		author_id: String,
		comment: Option<String>,
	},
	RejectOrder {
		order_id: String,
		author_id: String,
		comment: Option<String>,
	},
	CreateQuotation {
		order_id: String,
		price: u64,
		details: String,
		owner_id: Option<String>,
	},
	ValidateQuotation {
		quotation_id: String,
		author_id: String,
	},
	CancelQuotation {
		quotation_id: String,
		author_id: String,
	},
	AcceptQuotation {
		quotation_id: String,
		author_id: String,
	},
	RejectQuotation {
		quotation_id: String,
		author_id: String,
	},
	CreateRealisation {
		order_id: String,
		employee_id: String,
		created_by: Option<String>,
	},
	StartRealisation {
		realisation_id: String,
		author_id: Option<String>,
	},
	CompleteRealisation {
		realisation_id: String,
		author_id: Option<String>,
	},
}

impl Operation {
	/// The configuration/telemetry name of this operation.
	pub fn name(&self) -> &'static str {
		match self {
			Operation::CreateOrder { .. } => "create_order",
			Operation::CancelOrder { .. } => "cancel_order",
			Operation::ValidateOrder { .. } => "validate_order",
			Operation::RejectOrder { .. } => "reject_order",
			Operation::CreateQuotation { .. } => "create_quotation",
			Operation::ValidateQuotation { .. } => "validate_quotation",
			Operation::CancelQuotation { .. } => "cancel_quotation",
			Operation::AcceptQuotation { .. } => "accept_quotation",
			Operation::RejectQuotation { .. } => "reject_quotation",
			Operation::CreateRealisation { .. } => "create_realisation",
			Operation::StartRealisation { .. } => "start_realisation",
			Operation::CompleteRealisation { .. } => "complete_realisation",
		}
	}
}

/// Processing state of a dispatched job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
	Queued,
	Completed,
	Failed,
}

/// Persisted record of a dispatched job, polled by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
	/// Correlation id handed back at submission time.
	pub id: String,
	/// Name of the operation.
	pub operation: String,
	/// Processing state.
	pub status: JobStatus,
	/// How many times the operation ran.
	pub attempts: u32,
	/// Serialized operation result when completed.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub result: Option<serde_json::Value>,
	/// Final error message when failed.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	/// When the job was queued.
	pub submitted: DateTime<Utc>,
	/// When processing finished, either way.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub finished: Option<DateTime<Utc>>,
}

impl JobRecord {
	/// A freshly queued record.
	pub fn queued(id: impl Into<String>, operation: &Operation) -> Self {
		Self {
			id: id.into(),
			operation: operation.name().to_string(),
			status: JobStatus::Queued,
			attempts: 0,
			result: None,
			error: None,
			submitted: Utc::now(),
			finished: None,
		}
	}
}

/// A job travelling through the queue.
#[derive(Debug)]
pub(crate) struct JobRequest {
	pub id: String,
	pub operation: Operation,
}

/// Everything a worker needs to run jobs: the lifecycle services, the
/// store holding job records, and the retry policy.
pub(crate) struct JobContext {
	pub orders: Arc<OrderService>,
	pub quotations: Arc<QuotationService>,
	pub realisations: Arc<RealisationService>,
	pub storage: Arc<StorageService>,
	pub max_retries: u32,
	pub retry_delay: Duration,
}

impl JobContext {
	/// Runs one job to completion, retrying on any failure.
	///
	/// Retries re-run the whole operation from its precondition checks;
	/// the final outcome is written to the job record.
	pub async fn process(&self, request: JobRequest) {
		let mut attempts = 0;

		let outcome = loop {
			attempts += 1;
			match self.execute(&request.operation).await {
				Ok(value) => break Ok(value),
				Err(err) if attempts <= self.max_retries => {
					tracing::warn!(
						job_id = %request.id,
						operation = request.operation.name(),
						attempt = attempts,
						error = %err,
						"Job attempt failed, retrying"
					);
					tokio::time::sleep(self.retry_delay).await;
				},
				Err(err) => break Err(err),
			}
		};

		let record_update = self
			.finalize(&request.id, attempts, &outcome)
			.await;
		if let Err(err) = record_update {
			tracing::error!(job_id = %request.id, error = %err, "Failed to record job outcome");
		}

		match outcome {
			Ok(_) => tracing::info!(
				job_id = %request.id,
				operation = request.operation.name(),
				attempts,
				"Job completed"
			),
			Err(err) => tracing::warn!(
				job_id = %request.id,
				operation = request.operation.name(),
				attempts,
				error = %err,
				"Job failed"
			),
		}
	}

	/// Executes one operation against the lifecycle services.
	async fn execute(&self, operation: &Operation) -> Result<serde_json::Value, LifecycleError> {
		match operation {
			Operation::CreateOrder {
				customer_id,
				service,
				description,
			} => {
				let order = self.orders.create(customer_id, *service, description).await?;
				to_value(&order)
			},
			Operation::CancelOrder {
				order_id,
				author_id,
				comment,
			} => {
				let order = self
					.orders
					.cancel(order_id, author_id, comment.as_deref())
					.await?;
				to_value(&order)
			},
			Operation::ValidateOrder {
				order_id,
				author_id,
				comment,
			} => {
				let order = self
					.orders
					.validate(order_id, author_id, comment.as_deref())
					.await?;
				to_value(&order)
			},
			Operation::RejectOrder {
				order_id,
				author_id,
				comment,
			} => {
				let order = self
					.orders
					.reject(order_id, author_id, comment.as_deref())
					.await?;
				to_value(&order)
			},
			Operation::CreateQuotation {
				order_id,
				price,
				details,
				owner_id,
			} => {
				let quotation = self
					.quotations
					.create(order_id, *price, details, owner_id.as_deref())
					.await?;
				to_value(&quotation)
			},
			Operation::ValidateQuotation {
				quotation_id,
				author_id,
			} => {
				let quotation = self.quotations.validate(quotation_id, author_id).await?;
				to_value(&quotation)
			},
			Operation::CancelQuotation {
				quotation_id,
				author_id,
			} => {
				let quotation = self.quotations.cancel(quotation_id, author_id).await?;
				to_value(&quotation)
			},
			Operation::AcceptQuotation {
				quotation_id,
				author_id,
			} => {
				let quotation = self.quotations.accept(quotation_id, author_id).await?;
				to_value(&quotation)
			},
			Operation::RejectQuotation {
				quotation_id,
				author_id,
			} => {
				let quotation = self.quotations.reject(quotation_id, author_id).await?;
				to_value(&quotation)
			},
			Operation::CreateRealisation {
				order_id,
				employee_id,
				created_by,
			} => {
				let realisation = self
					.realisations
					.create(order_id, employee_id, created_by.as_deref())
					.await?;
				to_value(&realisation)
			},
			Operation::StartRealisation {
				realisation_id,
				author_id,
			} => {
				let realisation = self
					.realisations
					.start(realisation_id, author_id.as_deref())
					.await?;
				to_value(&realisation)
			},
			Operation::CompleteRealisation {
				realisation_id,
				author_id,
			} => {
				let realisation = self
					.realisations
					.complete(realisation_id, author_id.as_deref())
					.await?;
				to_value(&realisation)
			},
		}
	}

	/// Writes the final state of the job record.
	async fn finalize(
		&self,
		job_id: &str,
		attempts: u32,
		outcome: &Result<serde_json::Value, LifecycleError>,
	) -> Result<(), StorageError> {
		let mut record: JobRecord = self
			.storage
			.retrieve(StorageKey::Jobs.as_str(), job_id)
			.await?;

		record.attempts = attempts;
		record.finished = Some(Utc::now());
		match outcome {
			Ok(value) => {
				record.status = JobStatus::Completed;
				record.result = Some(value.clone());
			},
			Err(err) => {
				record.status = JobStatus::Failed;
				record.error = Some(err.to_string());
			},
		}

		self.storage
			.update(StorageKey::Jobs.as_str(), job_id, &record)
			.await
	}
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, LifecycleError> {
	serde_json::to_value(value).map_err(|e| LifecycleError::Persistence(e.to_string()))
}
