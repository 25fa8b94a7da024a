//! Order lifecycle service.
//!
//! Customers place orders; employees validate or reject them; the owning
//! customer may cancel while the order has not yet entered the
//! realisation phase. Validation cascades into quotation generation at
//! the service's fixed price tier.

use atelier_storage::OrderRepository;
use atelier_types::{EventBus, LifecycleEvent, Order, OrderEvent, OrderStatus, ServiceKind};
use std::sync::Arc;
use tracing::instrument;

use crate::{state, Guards, LifecycleError, QuotationService};

/// Lifecycle operations over orders.
pub struct OrderService {
	orders: Arc<OrderRepository>,
	guards: Arc<Guards>,
	quotations: Arc<QuotationService>,
	event_bus: EventBus,
}

impl OrderService {
	pub fn new(
		orders: Arc<OrderRepository>,
		guards: Arc<Guards>,
		quotations: Arc<QuotationService>,
		event_bus: EventBus,
	) -> Self {
		Self {
			orders,
			guards,
			quotations,
			event_bus,
		}
	}

	/// Places a new order for a registered customer.
	#[instrument(skip_all, fields(customer_id = %customer_id))]
	pub async fn create(
		&self,
		customer_id: &str,
		service: ServiceKind,
		description: &str,
	) -> Result<Order, LifecycleError> {
		if !self.guards.is_customer(customer_id).await? {
			return Err(LifecycleError::Forbidden(format!(
				"Customer {} is not registered",
				customer_id
			)));
		}

		let order = self.orders.create(customer_id, service, description).await?;

		tracing::info!(order_id = %order.id, service = %service, "Placed order");
		self.event_bus
			.publish(LifecycleEvent::Order(OrderEvent::Created {
				order_id: order.id.clone(),
				customer_id: customer_id.to_string(),
			}))
			.ok();

		Ok(order)
	}

	/// Returns the order with the given id.
	pub async fn get(&self, order_id: &str) -> Result<Order, LifecycleError> {
		self.orders
			.read(order_id)
			.await
			.map_err(|e| LifecycleError::from_read("Order", order_id, e))
	}

	/// Lists every order.
	pub async fn list(&self) -> Result<Vec<Order>, LifecycleError> {
		Ok(self.orders.read_all().await?)
	}

	/// Cancels an order. Only the owning customer may cancel, and only
	/// while the order has not entered the realisation phase.
	#[instrument(skip_all, fields(order_id = %order_id))]
	pub async fn cancel(
		&self,
		order_id: &str,
		author_id: &str,
		comment: Option<&str>,
	) -> Result<Order, LifecycleError> {
		let order = self.get(order_id).await?;

		if !state::order_transition_allowed(order.status, OrderStatus::OrderCancelled) {
			return Err(LifecycleError::Forbidden(format!(
				"Could not cancel order {}. Current status: {}",
				order_id, order.status
			)));
		}

		if !self.guards.is_customer(author_id).await? {
			return Err(LifecycleError::Forbidden(format!(
				"Author {} is not a registered customer",
				author_id
			)));
		}

		if author_id != order.customer_id {
			return Err(LifecycleError::Forbidden(format!(
				"Operation not allowed. Only the owner may cancel order {}",
				order_id
			)));
		}

		let updated = self
			.transition(order_id, OrderStatus::OrderCancelled, author_id, comment)
			.await?;

		Ok(updated)
	}

	/// Validates an order under review. Employee only.
	///
	/// On success a quotation is generated at the service's price tier.
	/// If quotation generation fails, the order keeps its accepted status
	/// and the failure surfaces as a partial one.
	#[instrument(skip_all, fields(order_id = %order_id))]
	pub async fn validate(
		&self,
		order_id: &str,
		author_id: &str,
		comment: Option<&str>,
	) -> Result<Order, LifecycleError> {
		let order = self.get(order_id).await?;

		if order.status != OrderStatus::UnderReview {
			return Err(LifecycleError::InvalidTransition(format!(
				"Could not validate order {}. Current status: {}",
				order_id, order.status
			)));
		}

		if !self.guards.is_employee(author_id).await? {
			return Err(LifecycleError::Forbidden(format!(
				"Author {} is not a registered employee",
				author_id
			)));
		}

		let updated = self
			.transition(order_id, OrderStatus::OrderAccepted, author_id, comment)
			.await?;

		// Generate the quotation at the fixed tier price.
		self.quotations
			.create(order_id, order.service.price(), "Generated", None)
			.await
			.map_err(|e| LifecycleError::PartialFailure {
				step: "generate quotation",
				reason: e.to_string(),
			})?;

		Ok(updated)
	}

	/// Rejects an order under review. Employee only.
	#[instrument(skip_all, fields(order_id = %order_id))]
	pub async fn reject(
		&self,
		order_id: &str,
		author_id: &str,
		comment: Option<&str>,
	) -> Result<Order, LifecycleError> {
		let order = self.get(order_id).await?;

		if order.status != OrderStatus::UnderReview {
			return Err(LifecycleError::InvalidTransition(format!(
				"Could not reject order {}. Current status: {}",
				order_id, order.status
			)));
		}

		if !self.guards.is_employee(author_id).await? {
			return Err(LifecycleError::Forbidden(format!(
				"Author {} is not a registered employee",
				author_id
			)));
		}

		let updated = self
			.transition(order_id, OrderStatus::OrderRejected, author_id, comment)
			.await?;

		Ok(updated)
	}

	/// Applies a status transition and publishes the matching event.
	async fn transition(
		&self,
		order_id: &str,
		new_status: OrderStatus,
		author_id: &str,
		comment: Option<&str>,
	) -> Result<Order, LifecycleError> {
		let updated = self
			.orders
			.update_status(order_id, new_status, Some(author_id), comment)
			.await
			.map_err(|e| LifecycleError::Persistence(e.to_string()))?;

		tracing::info!(status = %updated.status, "Order transitioned");
		self.event_bus
			.publish(LifecycleEvent::Order(OrderEvent::Transitioned {
				order_id: order_id.to_string(),
				status: updated.status,
				by: Some(author_id.to_string()),
			}))
			.ok();

		Ok(updated)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testutil::Harness;
	use atelier_types::QuotationStatus;

	#[tokio::test]
	async fn test_create_requires_registered_customer() {
		let h = Harness::new().await;

		let result = h
			.order_service
			.create("nobody", ServiceKind::WebSite, "a web site")
			.await;

		assert!(matches!(result, Err(LifecycleError::Forbidden(_))));
	}

	#[tokio::test]
	async fn test_create_starts_under_review() {
		let h = Harness::new().await;
		let customer = h.register_customer().await;

		let order = h
			.order_service
			.create(&customer.id, ServiceKind::DesktopApp, "a desktop app")
			.await
			.unwrap();

		assert_eq!(order.status, OrderStatus::UnderReview);
		assert_eq!(order.customer_id, customer.id);
		assert!(order.update_history.is_empty());
	}

	#[tokio::test]
	async fn test_get_missing_order() {
		let h = Harness::new().await;

		let result = h.order_service.get("missing").await;

		assert!(matches!(
			result,
			Err(LifecycleError::NotFound { entity: "Order", .. })
		));
	}

	#[tokio::test]
	async fn test_validate_generates_quotation_at_tier_price() {
		let h = Harness::new().await;
		let customer = h.register_customer().await;
		let employee = h.register_employee().await;
		let order = h.place_order(&customer.id).await; // web_site tier

		let validated = h
			.order_service
			.validate(&order.id, &employee.id, Some("looks good"))
			.await
			.unwrap();
		assert_eq!(validated.status, OrderStatus::OrderAccepted);

		let quotations = h.quotation_repo.read_for_order(&order.id).await.unwrap();
		assert_eq!(quotations.len(), 1);
		assert_eq!(quotations[0].price, 5000);
		assert_eq!(quotations[0].details, "Generated");
		assert_eq!(quotations[0].owner_id, None);
		assert_eq!(
			quotations[0].status,
			QuotationStatus::QuotationUnderReview
		);

		// History recorded the employee decision
		assert_eq!(validated.update_history.len(), 1);
		assert_eq!(validated.update_history[0].by.as_deref(), Some(employee.id.as_str()));
		assert_eq!(
			validated.update_history[0].comment.as_deref(),
			Some("looks good")
		);
	}

	#[tokio::test]
	async fn test_validate_requires_employee() {
		let h = Harness::new().await;
		let customer = h.register_customer().await;
		let order = h.place_order(&customer.id).await;

		// The owning customer cannot validate their own order
		let result = h.order_service.validate(&order.id, &customer.id, None).await;

		assert!(matches!(result, Err(LifecycleError::Forbidden(_))));
		assert_eq!(
			h.order_service.get(&order.id).await.unwrap().status,
			OrderStatus::UnderReview
		);
	}

	#[tokio::test]
	async fn test_validate_twice_fails_and_creates_no_second_quotation() {
		let h = Harness::new().await;
		let customer = h.register_customer().await;
		let employee = h.register_employee().await;
		let order = h.place_order(&customer.id).await;

		h.order_service
			.validate(&order.id, &employee.id, None)
			.await
			.unwrap();

		let retry = h.order_service.validate(&order.id, &employee.id, None).await;

		assert!(matches!(retry, Err(LifecycleError::InvalidTransition(_))));
		let quotations = h.quotation_repo.read_for_order(&order.id).await.unwrap();
		assert_eq!(quotations.len(), 1);
	}

	#[tokio::test]
	async fn test_reject_under_review_only() {
		let h = Harness::new().await;
		let customer = h.register_customer().await;
		let employee = h.register_employee().await;
		let order = h.place_order(&customer.id).await;

		let rejected = h
			.order_service
			.reject(&order.id, &employee.id, Some("out of scope"))
			.await
			.unwrap();
		assert_eq!(rejected.status, OrderStatus::OrderRejected);

		// A rejected order cannot be rejected again
		let retry = h.order_service.reject(&order.id, &employee.id, None).await;
		assert!(matches!(retry, Err(LifecycleError::InvalidTransition(_))));
	}

	#[tokio::test]
	async fn test_cancel_by_owner() {
		let h = Harness::new().await;
		let customer = h.register_customer().await;
		let order = h.place_order(&customer.id).await;

		let cancelled = h
			.order_service
			.cancel(&order.id, &customer.id, Some("changed my mind"))
			.await
			.unwrap();

		assert_eq!(cancelled.status, OrderStatus::OrderCancelled);
		assert_eq!(cancelled.update_history.len(), 1);
	}

	#[tokio::test]
	async fn test_cancel_by_non_owner_is_forbidden() {
		let h = Harness::new().await;
		let owner = h.register_customer().await;
		let stranger = h.register_customer().await;
		let order = h.place_order(&owner.id).await;

		let result = h.order_service.cancel(&order.id, &stranger.id, None).await;

		assert!(matches!(result, Err(LifecycleError::Forbidden(_))));
		let unchanged = h.order_service.get(&order.id).await.unwrap();
		assert_eq!(unchanged.status, OrderStatus::UnderReview);
		assert!(unchanged.update_history.is_empty());
	}

	#[tokio::test]
	async fn test_cancel_too_late_is_refused() {
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

		// realisationScheduled: past the point of no return
		let result = h.order_service.cancel(&order_id, &customer.id, None).await;
		assert!(matches!(result, Err(LifecycleError::Forbidden(_))));

		h.realisation_service
			.start(&realisation.id, Some(&employee.id))
			.await
			.unwrap();
		let result = h.order_service.cancel(&order_id, &customer.id, None).await;
		assert!(matches!(result, Err(LifecycleError::Forbidden(_))));
	}

	#[tokio::test]
	async fn test_cancel_accepted_order_still_allowed() {
		let h = Harness::new().await;
		let customer = h.register_customer().await;
		let employee = h.register_employee().await;
		let order = h.place_order(&customer.id).await;
		h.order_service
			.validate(&order.id, &employee.id, None)
			.await
			.unwrap();

		let cancelled = h
			.order_service
			.cancel(&order.id, &customer.id, None)
			.await
			.unwrap();

		assert_eq!(cancelled.status, OrderStatus::OrderCancelled);
	}

	#[tokio::test]
	async fn test_full_lifecycle_scenario() {
		let h = Harness::new().await;
		let customer = h.register_customer().await;
		let employee = h.register_employee().await;

		// Customer orders a web site (tier 5000)
		let order = h
			.order_service
			.create(&customer.id, ServiceKind::WebSite, "company landing page")
			.await
			.unwrap();

		// Employee validates: quotation generated at 5000
		h.order_service
			.validate(&order.id, &employee.id, None)
			.await
			.unwrap();
		let quotation = h.quotation_repo.read_for_order(&order.id).await.unwrap()[0].clone();
		assert_eq!(quotation.price, 5000);
		assert_eq!(quotation.status, QuotationStatus::QuotationUnderReview);

		// Employee validates the quotation, customer accepts it
		h.quotation_service
			.validate(&quotation.id, &employee.id)
			.await
			.unwrap();
		h.quotation_service
			.accept(&quotation.id, &customer.id)
			.await
			.unwrap();

		let realisation = h.realisation_service.list().await.unwrap()[0].clone();
		assert_eq!(
			h.order_service.get(&order.id).await.unwrap().status,
			OrderStatus::RealisationScheduled
		);

		// The assignee works the realisation to completion
		h.realisation_service
			.start(&realisation.id, Some(&realisation.employee_id))
			.await
			.unwrap();
		assert_eq!(
			h.order_service.get(&order.id).await.unwrap().status,
			OrderStatus::RealisationStarted
		);

		h.realisation_service
			.complete(&realisation.id, Some(&realisation.employee_id))
			.await
			.unwrap();
		let done = h.order_service.get(&order.id).await.unwrap();
		assert_eq!(done.status, OrderStatus::RealisationCompleted);

		// The ledger tells the whole story in order
		let statuses: Vec<&str> = done
			.update_history
			.iter()
			.map(|u| u.new_status.as_str())
			.collect();
		assert_eq!(
			statuses,
			vec![
				"orderAccepted",
				"realisationScheduled", // written by realisation creation
				"realisationScheduled", // written by the acceptance cascade
				"realisationStarted",
				"realisationCompleted",
			]
		);
	}
}
