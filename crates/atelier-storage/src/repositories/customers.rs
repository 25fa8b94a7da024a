//! Customer collection repository.

use crate::{StorageError, StorageService};
use atelier_types::{Customer, StorageKey};
use std::sync::Arc;
use uuid::Uuid;

/// CRUD operations over the customer collection.
pub struct CustomerRepository {
	storage: Arc<StorageService>,
}

impl CustomerRepository {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Registers a new customer and returns the stored record.
	pub async fn create(
		&self,
		first_name: &str,
		last_name: &str,
		email: &str,
	) -> Result<Customer, StorageError> {
		let customer = Customer {
			id: Uuid::new_v4().to_string(),
			first_name: first_name.to_string(),
			last_name: last_name.to_string(),
			email: email.to_string(),
		};
		self.storage
			.store(StorageKey::Customers.as_str(), &customer.id, &customer)
			.await?;
		Ok(customer)
	}

	/// Reads one customer by id.
	pub async fn read(&self, id: &str) -> Result<Customer, StorageError> {
		self.storage.retrieve(StorageKey::Customers.as_str(), id).await
	}

	/// Lists every registered customer.
	pub async fn read_all(&self) -> Result<Vec<Customer>, StorageError> {
		self.storage.retrieve_all(StorageKey::Customers.as_str()).await
	}

	/// Checks whether a customer with this id is registered.
	pub async fn exists(&self, id: &str) -> Result<bool, StorageError> {
		self.storage.exists(StorageKey::Customers.as_str(), id).await
	}
}
