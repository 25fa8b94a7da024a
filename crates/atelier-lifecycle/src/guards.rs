//! Shared authorization and existence predicates.
//!
//! The guards answer "is this identity a registered customer", "is this
//! identity a registered employee" and "does this order exist". They never
//! decide policy: a `false` answer is translated into Forbidden/NotFound
//! by the calling lifecycle service, keeping authorization policy and
//! status policy together in one place. A storage `Err` means the store
//! itself failed, not that authorization was refused.

use atelier_storage::{CustomerRepository, EmployeeRepository, OrderRepository, StorageError};
use std::sync::Arc;

/// Existence predicates consumed by all three lifecycle services.
pub struct Guards {
	customers: Arc<CustomerRepository>,
	employees: Arc<EmployeeRepository>,
	orders: Arc<OrderRepository>,
}

impl Guards {
	pub fn new(
		customers: Arc<CustomerRepository>,
		employees: Arc<EmployeeRepository>,
		orders: Arc<OrderRepository>,
	) -> Self {
		Self {
			customers,
			employees,
			orders,
		}
	}

	/// True when the id belongs to a registered customer.
	pub async fn is_customer(&self, id: &str) -> Result<bool, StorageError> {
		self.customers.exists(id).await
	}

	/// True when the id belongs to a registered employee.
	pub async fn is_employee(&self, id: &str) -> Result<bool, StorageError> {
		self.employees.exists(id).await
	}

	/// True when an order with this id exists.
	pub async fn order_exists(&self, id: &str) -> Result<bool, StorageError> {
		self.orders.exists(id).await
	}
}
