//! Shared test fixture wiring the full service graph over memory storage.

use atelier_storage::{
	implementations::memory::MemoryStorage, CustomerRepository, EmployeeRepository,
	OrderRepository, QuotationRepository, RealisationRepository, StorageService,
};
use atelier_types::{
	Customer, Employee, EventBus, Order, QuotationStatus, ServiceKind, StorageKey,
};
use std::sync::Arc;

use crate::implementations::random::RandomAssignment;
use crate::{Guards, OrderService, QuotationService, RealisationService};

/// Fully wired lifecycle stack over an in-memory store.
pub(crate) struct Harness {
	pub storage: Arc<StorageService>,
	pub customer_repo: Arc<CustomerRepository>,
	pub employee_repo: Arc<EmployeeRepository>,
	pub quotation_repo: Arc<QuotationRepository>,
	pub order_service: Arc<OrderService>,
	pub quotation_service: Arc<QuotationService>,
	pub realisation_service: Arc<RealisationService>,
}

impl Harness {
	pub async fn new() -> Self {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));

		let customer_repo = Arc::new(CustomerRepository::new(storage.clone()));
		let employee_repo = Arc::new(EmployeeRepository::new(storage.clone()));
		let order_repo = Arc::new(OrderRepository::new(storage.clone()));
		let quotation_repo = Arc::new(QuotationRepository::new(storage.clone()));
		let realisation_repo = Arc::new(RealisationRepository::new(storage.clone()));

		let guards = Arc::new(Guards::new(
			customer_repo.clone(),
			employee_repo.clone(),
			order_repo.clone(),
		));
		let event_bus = EventBus::default();

		let realisation_service = Arc::new(RealisationService::new(
			realisation_repo,
			order_repo.clone(),
			quotation_repo.clone(),
			guards.clone(),
			event_bus.clone(),
		));
		let quotation_service = Arc::new(QuotationService::new(
			quotation_repo.clone(),
			order_repo.clone(),
			employee_repo.clone(),
			guards.clone(),
			realisation_service.clone(),
			Arc::new(RandomAssignment::new()),
			event_bus.clone(),
		));
		let order_service = Arc::new(OrderService::new(
			order_repo.clone(),
			guards,
			quotation_service.clone(),
			event_bus,
		));

		Self {
			storage,
			customer_repo,
			employee_repo,
			quotation_repo,
			order_service,
			quotation_service,
			realisation_service,
		}
	}

	pub async fn register_customer(&self) -> Customer {
		self.customer_repo
			.create("Claire", "Fontaine", "claire@example.com")
			.await
			.unwrap()
	}

	pub async fn register_employee(&self) -> Employee {
		self.employee_repo
			.create("Erik", "Marchand", "erik@atelier.test")
			.await
			.unwrap()
	}

	pub async fn place_order(&self, customer_id: &str) -> Order {
		self.order_service
			.create(customer_id, ServiceKind::WebSite, "a web site")
			.await
			.unwrap()
	}

	/// Produces an orderAccepted order carrying an accepted quotation but
	/// no realisation yet, driving the quotation through the repository to
	/// keep the acceptance cascade out of the picture.
	pub async fn accepted_order_with_accepted_quotation(
		&self,
		customer_id: &str,
		employee_id: &str,
	) -> String {
		let order = self.place_order(customer_id).await;
		self.order_service
			.validate(&order.id, employee_id, None)
			.await
			.unwrap();

		let quotation = self.quotation_repo.read_for_order(&order.id).await.unwrap()[0].clone();
		self.quotation_repo
			.update_status(
				&quotation.id,
				QuotationStatus::QuotationValidated,
				Some(employee_id),
				None,
			)
			.await
			.unwrap();
		self.quotation_repo
			.update_status(
				&quotation.id,
				QuotationStatus::QuotationAccepted,
				Some(customer_id),
				None,
			)
			.await
			.unwrap();

		order.id
	}

	pub async fn remove_employee(&self, employee_id: &str) {
		self.storage
			.remove(StorageKey::Employees.as_str(), employee_id)
			.await
			.unwrap();
	}
}
