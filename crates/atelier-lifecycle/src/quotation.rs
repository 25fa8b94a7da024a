//! Quotation lifecycle service.
//!
//! Quotations price validated orders. Employees validate or cancel them;
//! the owning customer accepts or rejects a validated quotation. The
//! accept path is the largest cascade in the system: it schedules a
//! realisation for a randomly assigned employee and moves the order
//! forward; the reject path cancels the order.

use atelier_storage::{EmployeeRepository, OrderRepository, QuotationRepository};
use atelier_types::{
	EventBus, LifecycleEvent, OrderStatus, Quotation, QuotationEvent, QuotationStatus,
};
use std::sync::Arc;
use tracing::instrument;

use crate::{AssignmentStrategy, Guards, LifecycleError, RealisationService};

/// Lifecycle operations over quotations.
pub struct QuotationService {
	quotations: Arc<QuotationRepository>,
	orders: Arc<OrderRepository>,
	employees: Arc<EmployeeRepository>,
	guards: Arc<Guards>,
	realisations: Arc<RealisationService>,
	assignment: Arc<dyn AssignmentStrategy>,
	event_bus: EventBus,
}

impl QuotationService {
	pub fn new(
		quotations: Arc<QuotationRepository>,
		orders: Arc<OrderRepository>,
		employees: Arc<EmployeeRepository>,
		guards: Arc<Guards>,
		realisations: Arc<RealisationService>,
		assignment: Arc<dyn AssignmentStrategy>,
		event_bus: EventBus,
	) -> Self {
		Self {
			quotations,
			orders,
			employees,
			guards,
			realisations,
			assignment,
			event_bus,
		}
	}

	/// Returns the quotation with the given id.
	pub async fn get(&self, quotation_id: &str) -> Result<Quotation, LifecycleError> {
		self.quotations
			.read(quotation_id)
			.await
			.map_err(|e| LifecycleError::from_read("Quotation", quotation_id, e))
	}

	/// Lists every quotation.
	pub async fn list(&self) -> Result<Vec<Quotation>, LifecycleError> {
		Ok(self.quotations.read_all().await?)
	}

	/// Attaches a new quotation to an accepted order.
	///
	/// The order must exist and be in status orderAccepted, and must not
	/// already carry a live (non-cancelled) quotation. When `owner_id` is
	/// set (manual creation by an employee), it must resolve to a
	/// registered employee; the system-generated path leaves it unset.
	#[instrument(skip_all, fields(order_id = %order_id))]
	pub async fn create(
		&self,
		order_id: &str,
		price: u64,
		details: &str,
		owner_id: Option<&str>,
	) -> Result<Quotation, LifecycleError> {
		let order = match self.orders.read(order_id).await {
			Ok(order) => order,
			Err(atelier_storage::StorageError::NotFound) => {
				return Err(LifecycleError::Forbidden(format!(
					"Cannot create a quotation for order {}: order does not exist",
					order_id
				)))
			},
			Err(e) => return Err(LifecycleError::Persistence(e.to_string())),
		};

		if let Some(owner) = owner_id {
			if !self.guards.is_employee(owner).await? {
				return Err(LifecycleError::Forbidden(format!(
					"Owner {} is not a registered employee",
					owner
				)));
			}
		}

		if order.status != OrderStatus::OrderAccepted {
			return Err(LifecycleError::Forbidden(format!(
				"Cannot create a quotation for order {}. Incorrect order status: {}",
				order_id, order.status
			)));
		}

		// At most one non-cancelled quotation per order.
		if self.quotations.has_live_for_order(order_id).await? {
			return Err(LifecycleError::Forbidden(format!(
				"Cannot create a quotation for order {}. Order already has an active quotation",
				order_id
			)));
		}

		let quotation = self
			.quotations
			.create(order_id, price, details, owner_id.map(str::to_string))
			.await?;

		tracing::info!(quotation_id = %quotation.id, price, "Created quotation");
		self.event_bus
			.publish(LifecycleEvent::Quotation(QuotationEvent::Created {
				quotation_id: quotation.id.clone(),
				order_id: order_id.to_string(),
				generated: owner_id.is_none(),
			}))
			.ok();

		Ok(quotation)
	}

	/// Validates a quotation under review. Employee only.
	#[instrument(skip_all, fields(quotation_id = %quotation_id))]
	pub async fn validate(
		&self,
		quotation_id: &str,
		author_id: &str,
	) -> Result<Quotation, LifecycleError> {
		if !self.guards.is_employee(author_id).await? {
			return Err(LifecycleError::Forbidden(format!(
				"Author {} is not a registered employee",
				author_id
			)));
		}

		let quotation = self.get(quotation_id).await?;
		if quotation.status != QuotationStatus::QuotationUnderReview {
			// Reviewing a settled quotation is an authorization concern,
			// not a malformed request.
			return Err(LifecycleError::Forbidden(format!(
				"Could not validate quotation {}. Current status: {}",
				quotation_id, quotation.status
			)));
		}

		let updated = self
			.transition(quotation_id, QuotationStatus::QuotationValidated, author_id)
			.await?;

		Ok(updated)
	}

	/// Cancels a quotation under review. Employee only.
	#[instrument(skip_all, fields(quotation_id = %quotation_id))]
	pub async fn cancel(
		&self,
		quotation_id: &str,
		author_id: &str,
	) -> Result<Quotation, LifecycleError> {
		if !self.guards.is_employee(author_id).await? {
			return Err(LifecycleError::Forbidden(format!(
				"Author {} is not a registered employee",
				author_id
			)));
		}

		let quotation = self.get(quotation_id).await?;
		if quotation.status != QuotationStatus::QuotationUnderReview {
			return Err(LifecycleError::InvalidTransition(format!(
				"Could not cancel quotation {}. Current status: {}",
				quotation_id, quotation.status
			)));
		}

		let updated = self
			.transition(quotation_id, QuotationStatus::QuotationCancelled, author_id)
			.await?;

		Ok(updated)
	}

	/// Accepts a validated quotation. Order owner only.
	///
	/// On success the cascade schedules a realisation for a randomly
	/// picked employee and moves the order to realisationScheduled. A
	/// failure inside the cascade leaves the quotation accepted and the
	/// earlier writes committed; it surfaces as a partial failure.
	#[instrument(skip_all, fields(quotation_id = %quotation_id))]
	pub async fn accept(
		&self,
		quotation_id: &str,
		author_id: &str,
	) -> Result<Quotation, LifecycleError> {
		let quotation = self.get(quotation_id).await?;
		let order = self
			.orders
			.read(&quotation.order_id)
			.await
			.map_err(|e| LifecycleError::from_read("Order", &quotation.order_id, e))?;

		self.check_order_owner(&order.customer_id, author_id, &quotation).await?;

		if quotation.status != QuotationStatus::QuotationValidated {
			return Err(LifecycleError::InvalidTransition(format!(
				"Could not accept quotation {}. Current status: {}",
				quotation_id, quotation.status
			)));
		}

		let updated = self
			.transition(quotation_id, QuotationStatus::QuotationAccepted, author_id)
			.await?;

		// Schedule the realisation: pick one employee from the pool.
		let pool = self.employees.read_all().await?;
		let assignee = self
			.assignment
			.pick(&pool)
			.map_err(|e| LifecycleError::PartialFailure {
				step: "assign employee",
				reason: e.to_string(),
			})?;

		self.realisations
			.create(&quotation.order_id, &assignee, None)
			.await
			.map_err(|e| LifecycleError::PartialFailure {
				step: "schedule realisation",
				reason: e.to_string(),
			})?;

		self.orders
			.update_status(
				&quotation.order_id,
				OrderStatus::RealisationScheduled,
				Some(&order.customer_id),
				Some("Quotation accepted"),
			)
			.await
			.map_err(|e| LifecycleError::PartialFailure {
				step: "update order",
				reason: e.to_string(),
			})?;

		Ok(updated)
	}

	/// Rejects a validated quotation. Order owner only.
	///
	/// On success the order is cancelled.
	#[instrument(skip_all, fields(quotation_id = %quotation_id))]
	pub async fn reject(
		&self,
		quotation_id: &str,
		author_id: &str,
	) -> Result<Quotation, LifecycleError> {
		let quotation = self.get(quotation_id).await?;
		let order = self
			.orders
			.read(&quotation.order_id)
			.await
			.map_err(|e| LifecycleError::from_read("Order", &quotation.order_id, e))?;

		self.check_order_owner(&order.customer_id, author_id, &quotation).await?;

		if quotation.status != QuotationStatus::QuotationValidated {
			return Err(LifecycleError::InvalidTransition(format!(
				"Could not reject quotation {}. Current status: {}",
				quotation_id, quotation.status
			)));
		}

		let updated = self
			.transition(quotation_id, QuotationStatus::QuotationRejected, author_id)
			.await?;

		self.orders
			.update_status(
				&quotation.order_id,
				OrderStatus::OrderCancelled,
				Some(&order.customer_id),
				Some("Quotation rejected"),
			)
			.await
			.map_err(|e| LifecycleError::PartialFailure {
				step: "update order",
				reason: e.to_string(),
			})?;

		Ok(updated)
	}

	/// Verifies that the order's customer exists and that the author is
	/// that customer.
	async fn check_order_owner(
		&self,
		customer_id: &str,
		author_id: &str,
		quotation: &Quotation,
	) -> Result<(), LifecycleError> {
		if !self.guards.is_customer(customer_id).await? {
			return Err(LifecycleError::Forbidden(format!(
				"Customer {} does not exist",
				customer_id
			)));
		}

		if author_id != customer_id {
			return Err(LifecycleError::Forbidden(format!(
				"Operation not allowed. Only the owner of order {} may decide on quotation {}",
				quotation.order_id, quotation.id
			)));
		}

		Ok(())
	}

	/// Applies a status transition and publishes the matching event.
	async fn transition(
		&self,
		quotation_id: &str,
		new_status: QuotationStatus,
		author_id: &str,
	) -> Result<Quotation, LifecycleError> {
		let updated = self
			.quotations
			.update_status(quotation_id, new_status, Some(author_id), None)
			.await
			.map_err(|e| LifecycleError::Persistence(e.to_string()))?;

		tracing::info!(status = %updated.status, "Quotation transitioned");
		self.event_bus
			.publish(LifecycleEvent::Quotation(QuotationEvent::Transitioned {
				quotation_id: quotation_id.to_string(),
				status: updated.status,
				by: Some(author_id.to_string()),
			}))
			.ok();

		Ok(updated)
	}
}
