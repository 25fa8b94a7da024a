//! Employee collection repository.

use crate::{StorageError, StorageService};
use atelier_types::{Employee, StorageKey};
use std::sync::Arc;
use uuid::Uuid;

/// CRUD operations over the employee collection.
pub struct EmployeeRepository {
	storage: Arc<StorageService>,
}

impl EmployeeRepository {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Registers a new employee and returns the stored record.
	pub async fn create(
		&self,
		first_name: &str,
		last_name: &str,
		email: &str,
	) -> Result<Employee, StorageError> {
		let employee = Employee {
			id: Uuid::new_v4().to_string(),
			first_name: first_name.to_string(),
			last_name: last_name.to_string(),
			email: email.to_string(),
		};
		self.storage
			.store(StorageKey::Employees.as_str(), &employee.id, &employee)
			.await?;
		Ok(employee)
	}

	/// Reads one employee by id.
	pub async fn read(&self, id: &str) -> Result<Employee, StorageError> {
		self.storage.retrieve(StorageKey::Employees.as_str(), id).await
	}

	/// Lists every registered employee.
	pub async fn read_all(&self) -> Result<Vec<Employee>, StorageError> {
		self.storage.retrieve_all(StorageKey::Employees.as_str()).await
	}

	/// Checks whether an employee with this id is registered.
	pub async fn exists(&self, id: &str) -> Result<bool, StorageError> {
		self.storage.exists(StorageKey::Employees.as_str(), id).await
	}
}
