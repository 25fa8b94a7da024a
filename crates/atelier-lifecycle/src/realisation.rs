//! Realisation lifecycle service.
//!
//! A realisation is created for an accepted order carrying an accepted
//! quotation, then driven to completion by its assigned employee. Every
//! transition cascades into the order record so the order status mirrors
//! the realisation phase.

use atelier_storage::{OrderRepository, QuotationRepository, RealisationRepository};
use atelier_types::{
	EventBus, LifecycleEvent, OrderStatus, Realisation, RealisationEvent, RealisationStatus,
};
use std::sync::Arc;
use tracing::instrument;

use crate::{Guards, LifecycleError};

/// Lifecycle operations over realisations.
pub struct RealisationService {
	realisations: Arc<RealisationRepository>,
	orders: Arc<OrderRepository>,
	quotations: Arc<QuotationRepository>,
	guards: Arc<Guards>,
	event_bus: EventBus,
}

impl RealisationService {
	pub fn new(
		realisations: Arc<RealisationRepository>,
		orders: Arc<OrderRepository>,
		quotations: Arc<QuotationRepository>,
		guards: Arc<Guards>,
		event_bus: EventBus,
	) -> Self {
		Self {
			realisations,
			orders,
			quotations,
			guards,
			event_bus,
		}
	}

	/// Returns the realisation with the given id.
	pub async fn get(&self, realisation_id: &str) -> Result<Realisation, LifecycleError> {
		self.realisations
			.read(realisation_id)
			.await
			.map_err(|e| LifecycleError::from_read("Realisation", realisation_id, e))
	}

	/// Lists every realisation.
	pub async fn list(&self) -> Result<Vec<Realisation>, LifecycleError> {
		Ok(self.realisations.read_all().await?)
	}

	/// Schedules a realisation for an accepted order.
	///
	/// The order must exist, be in status orderAccepted and carry an
	/// accepted quotation. When `created_by` is set (manual creation), it
	/// must resolve to a registered employee. On success the order moves
	/// to realisationScheduled.
	#[instrument(skip_all, fields(order_id = %order_id, employee_id = %employee_id))]
	pub async fn create(
		&self,
		order_id: &str,
		employee_id: &str,
		created_by: Option<&str>,
	) -> Result<Realisation, LifecycleError> {
		if !self.guards.order_exists(order_id).await? {
			return Err(LifecycleError::Forbidden(format!(
				"Operation not allowed. Order {} does not exist",
				order_id
			)));
		}

		let order = self
			.orders
			.read(order_id)
			.await
			.map_err(|e| LifecycleError::from_read("Order", order_id, e))?;
		if order.status != OrderStatus::OrderAccepted {
			return Err(LifecycleError::Forbidden(format!(
				"Operation not allowed. Order {} status is {}",
				order_id, order.status
			)));
		}

		if !self.quotations.has_accepted_for_order(order_id).await? {
			return Err(LifecycleError::Forbidden(format!(
				"Operation not allowed. Order {} has no accepted quotation",
				order_id
			)));
		}

		// Manual creation path: the creating author must be an employee.
		if let Some(author) = created_by {
			if !self.guards.is_employee(author).await? {
				return Err(LifecycleError::Forbidden(format!(
					"Author {} is not a registered employee",
					author
				)));
			}
		}

		let realisation = self
			.realisations
			.create(order_id, employee_id, created_by.map(str::to_string))
			.await?;

		tracing::info!(realisation_id = %realisation.id, "Scheduled realisation");
		self.event_bus
			.publish(LifecycleEvent::Realisation(RealisationEvent::Created {
				realisation_id: realisation.id.clone(),
				order_id: order_id.to_string(),
				employee_id: employee_id.to_string(),
			}))
			.ok();

		self.orders
			.update_status(
				order_id,
				OrderStatus::RealisationScheduled,
				created_by,
				None,
			)
			.await
			.map_err(|e| LifecycleError::PartialFailure {
				step: "update order",
				reason: e.to_string(),
			})?;

		Ok(realisation)
	}

	/// Starts a scheduled realisation.
	///
	/// Only the assigned employee may start it. On success the order moves
	/// to realisationStarted.
	#[instrument(skip_all, fields(realisation_id = %realisation_id))]
	pub async fn start(
		&self,
		realisation_id: &str,
		author_id: Option<&str>,
	) -> Result<Realisation, LifecycleError> {
		let realisation = self.get(realisation_id).await?;

		if realisation.status != RealisationStatus::RealisationScheduled {
			return Err(LifecycleError::InvalidTransition(format!(
				"Could not start realisation {}. Current status: {}",
				realisation_id, realisation.status
			)));
		}

		let author = self.check_assignee(&realisation, author_id).await?;

		let updated = self
			.realisations
			.update_status(
				realisation_id,
				RealisationStatus::RealisationStarted,
				Some(author),
				None,
			)
			.await
			.map_err(|e| LifecycleError::Persistence(e.to_string()))?;

		tracing::info!(status = %updated.status, "Started realisation");
		self.event_bus
			.publish(LifecycleEvent::Realisation(RealisationEvent::Transitioned {
				realisation_id: realisation_id.to_string(),
				status: updated.status,
				by: Some(author.to_string()),
			}))
			.ok();

		self.orders
			.update_status(
				&realisation.order_id,
				OrderStatus::RealisationStarted,
				Some(author),
				None,
			)
			.await
			.map_err(|e| LifecycleError::PartialFailure {
				step: "update order",
				reason: e.to_string(),
			})?;

		Ok(updated)
	}

	/// Completes a started realisation.
	///
	/// Only the assigned employee may complete it. On success the order
	/// moves to realisationCompleted.
	#[instrument(skip_all, fields(realisation_id = %realisation_id))]
	pub async fn complete(
		&self,
		realisation_id: &str,
		author_id: Option<&str>,
	) -> Result<Realisation, LifecycleError> {
		let realisation = self.get(realisation_id).await?;

		if realisation.status != RealisationStatus::RealisationStarted {
			return Err(LifecycleError::InvalidTransition(format!(
				"Could not complete realisation {}. Current status: {}",
				realisation_id, realisation.status
			)));
		}

		let author = self.check_assignee(&realisation, author_id).await?;

		let updated = self
			.realisations
			.update_status(
				realisation_id,
				RealisationStatus::RealisationCompleted,
				Some(author),
				None,
			)
			.await
			.map_err(|e| LifecycleError::Persistence(e.to_string()))?;

		tracing::info!(status = %updated.status, "Completed realisation");
		self.event_bus
			.publish(LifecycleEvent::Realisation(RealisationEvent::Transitioned {
				realisation_id: realisation_id.to_string(),
				status: updated.status,
				by: Some(author.to_string()),
			}))
			.ok();

		self.orders
			.update_status(
				&realisation.order_id,
				OrderStatus::RealisationCompleted,
				Some(author),
				None,
			)
			.await
			.map_err(|e| LifecycleError::PartialFailure {
				step: "update order",
				reason: e.to_string(),
			})?;

		Ok(updated)
	}

	/// Verifies that the author is present, a registered employee and the
	/// assignee of the realisation. Returns the author id on success.
	async fn check_assignee<'a>(
		&self,
		realisation: &Realisation,
		author_id: Option<&'a str>,
	) -> Result<&'a str, LifecycleError> {
		let author = author_id
			.ok_or_else(|| LifecycleError::Forbidden("Missing author id".to_string()))?;

		if !self.guards.is_employee(author).await? {
			return Err(LifecycleError::Forbidden(format!(
				"Author {} is not a registered employee",
				author
			)));
		}

		if author != realisation.employee_id {
			return Err(LifecycleError::Forbidden(format!(
				"Operation not allowed. Only the assignee may drive realisation {}",
				realisation.id
			)));
		}

		Ok(author)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testutil::Harness;
	use atelier_types::QuotationStatus;

	#[tokio::test]
	async fn test_create_requires_existing_order() {
		let h = Harness::new().await;

		let result = h.realisation_service.create("missing", "e1", None).await;

		assert!(matches!(result, Err(LifecycleError::Forbidden(_))));
	}

	#[tokio::test]
	async fn test_create_requires_accepted_order() {
		let h = Harness::new().await;
		let customer = h.register_customer().await;
		// Order still under review
		let order = h.place_order(&customer.id).await;

		let result = h.realisation_service.create(&order.id, "e1", None).await;

		match result {
			Err(LifecycleError::Forbidden(msg)) => {
				assert!(msg.contains("status is underReview"), "got: {}", msg)
			},
			other => panic!("expected Forbidden, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_create_requires_accepted_quotation() {
		let h = Harness::new().await;
		let customer = h.register_customer().await;
		let employee = h.register_employee().await;
		let order = h.place_order(&customer.id).await;
		// Validation generates a quotation, but nobody accepted it yet
		h.order_service
			.validate(&order.id, &employee.id, None)
			.await
			.unwrap();

		let result = h
			.realisation_service
			.create(&order.id, &employee.id, None)
			.await;

		match result {
			Err(LifecycleError::Forbidden(msg)) => {
				assert!(msg.contains("no accepted quotation"), "got: {}", msg)
			},
			other => panic!("expected Forbidden, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_manual_create_requires_employee_author() {
		let h = Harness::new().await;
		let customer = h.register_customer().await;
		let employee = h.register_employee().await;
		let order = h.accepted_order_with_accepted_quotation(&customer.id, &employee.id).await;

		let result = h
			.realisation_service
			.create(&order, &employee.id, Some("intruder"))
			.await;

		assert!(matches!(result, Err(LifecycleError::Forbidden(_))));
	}

	#[tokio::test]
	async fn test_start_and_complete_cascade_into_order() {
		let h = Harness::new().await;
		let customer = h.register_customer().await;
		let employee = h.register_employee().await;
		let order_id = h
			.accepted_order_with_accepted_quotation(&customer.id, &employee.id)
			.await;

		let realisation = h
			.realisation_service
			.create(&order_id, &employee.id, None)
			.await
			.unwrap();
		assert_eq!(realisation.status, RealisationStatus::RealisationScheduled);
		assert_eq!(
			h.order_service.get(&order_id).await.unwrap().status,
			OrderStatus::RealisationScheduled
		);

		let started = h
			.realisation_service
			.start(&realisation.id, Some(&employee.id))
			.await
			.unwrap();
		assert_eq!(started.status, RealisationStatus::RealisationStarted);
		assert_eq!(
			h.order_service.get(&order_id).await.unwrap().status,
			OrderStatus::RealisationStarted
		);

		let completed = h
			.realisation_service
			.complete(&realisation.id, Some(&employee.id))
			.await
			.unwrap();
		assert_eq!(completed.status, RealisationStatus::RealisationCompleted);
		assert_eq!(
			h.order_service.get(&order_id).await.unwrap().status,
			OrderStatus::RealisationCompleted
		);
	}

	#[tokio::test]
	async fn test_only_assignee_may_start() {
		let h = Harness::new().await;
		let customer = h.register_customer().await;
		let assignee = h.register_employee().await;
		let other = h.register_employee().await;
		let order_id = h
			.accepted_order_with_accepted_quotation(&customer.id, &assignee.id)
			.await;
		let realisation = h
			.realisation_service
			.create(&order_id, &assignee.id, None)
			.await
			.unwrap();

		let result = h
			.realisation_service
			.start(&realisation.id, Some(&other.id))
			.await;
		assert!(matches!(result, Err(LifecycleError::Forbidden(_))));

		// Missing author is refused before the employee check
		let result = h.realisation_service.start(&realisation.id, None).await;
		assert!(matches!(result, Err(LifecycleError::Forbidden(_))));
	}

	#[tokio::test]
	async fn test_complete_requires_started_status() {
		let h = Harness::new().await;
		let customer = h.register_customer().await;
		let employee = h.register_employee().await;
		let order_id = h
			.accepted_order_with_accepted_quotation(&customer.id, &employee.id)
			.await;
		let realisation = h
			.realisation_service
			.create(&order_id, &employee.id, None)
			.await
			.unwrap();

		// Still scheduled, completing skips a state
		let result = h
			.realisation_service
			.complete(&realisation.id, Some(&employee.id))
			.await;

		assert!(matches!(result, Err(LifecycleError::InvalidTransition(_))));
	}

	#[tokio::test]
	async fn test_create_checks_quotation_acceptance_not_just_any_quotation() {
		let h = Harness::new().await;
		let customer = h.register_customer().await;
		let employee = h.register_employee().await;
		let order = h.place_order(&customer.id).await;
		h.order_service
			.validate(&order.id, &employee.id, None)
			.await
			.unwrap();
		// Validate the generated quotation but never accept it
		let quotation = &h.quotation_repo.read_for_order(&order.id).await.unwrap()[0];
		h.quotation_service
			.validate(&quotation.id, &employee.id)
			.await
			.unwrap();
		assert_eq!(
			h.quotation_service.get(&quotation.id).await.unwrap().status,
			QuotationStatus::QuotationValidated
		);

		let result = h
			.realisation_service
			.create(&order.id, &employee.id, None)
			.await;
		assert!(matches!(result, Err(LifecycleError::Forbidden(_))));
	}
}
