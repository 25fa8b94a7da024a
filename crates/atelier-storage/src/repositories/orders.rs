//! Order collection repository.
//!
//! Status changes go through `update_status`, a read-modify-write that
//! sets the new status and appends a ledger entry in one persisted write.

use crate::{StorageError, StorageService};
use atelier_types::{Order, OrderStatus, ServiceKind, StatusUpdate, StorageKey};
use std::sync::Arc;
use uuid::Uuid;

/// CRUD operations over the order collection.
pub struct OrderRepository {
	storage: Arc<StorageService>,
}

impl OrderRepository {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Persists a freshly placed order and returns the stored record.
	pub async fn create(
		&self,
		customer_id: &str,
		service: ServiceKind,
		description: &str,
	) -> Result<Order, StorageError> {
		let order = Order::new(
			Uuid::new_v4().to_string(),
			customer_id,
			service,
			description,
		);
		self.storage
			.store(StorageKey::Orders.as_str(), &order.id, &order)
			.await?;
		Ok(order)
	}

	/// Reads one order by id.
	pub async fn read(&self, id: &str) -> Result<Order, StorageError> {
		self.storage.retrieve(StorageKey::Orders.as_str(), id).await
	}

	/// Lists every order.
	pub async fn read_all(&self) -> Result<Vec<Order>, StorageError> {
		self.storage.retrieve_all(StorageKey::Orders.as_str()).await
	}

	/// Checks whether an order with this id exists.
	pub async fn exists(&self, id: &str) -> Result<bool, StorageError> {
		self.storage.exists(StorageKey::Orders.as_str(), id).await
	}

	/// Moves the order to `new_status` and appends the matching ledger
	/// entry. Returns the updated order.
	pub async fn update_status(
		&self,
		order_id: &str,
		new_status: OrderStatus,
		by: Option<&str>,
		comment: Option<&str>,
	) -> Result<Order, StorageError> {
		let mut order: Order = self.read(order_id).await?;

		order.status = new_status;
		order.update_history.push(StatusUpdate::now(
			new_status.as_str(),
			by.map(str::to_string),
			comment.map(str::to_string),
		));

		self.storage
			.update(StorageKey::Orders.as_str(), order_id, &order)
			.await?;

		Ok(order)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::implementations::memory::MemoryStorage;

	fn storage() -> Arc<StorageService> {
		Arc::new(StorageService::new(Box::new(MemoryStorage::new())))
	}

	#[tokio::test]
	async fn test_create_starts_under_review() {
		let repo = OrderRepository::new(storage());

		let order = repo
			.create("c1", ServiceKind::WebSite, "landing page")
			.await
			.unwrap();

		assert_eq!(order.status, OrderStatus::UnderReview);
		assert!(order.update_history.is_empty());
		assert!(repo.exists(&order.id).await.unwrap());
	}

	#[tokio::test]
	async fn test_update_status_appends_history() {
		let repo = OrderRepository::new(storage());
		let order = repo
			.create("c1", ServiceKind::MobileApp, "app")
			.await
			.unwrap();

		let updated = repo
			.update_status(&order.id, OrderStatus::OrderAccepted, Some("e1"), None)
			.await
			.unwrap();

		assert_eq!(updated.status, OrderStatus::OrderAccepted);
		assert_eq!(updated.update_history.len(), 1);
		assert_eq!(updated.update_history[0].new_status, "orderAccepted");
		assert_eq!(updated.update_history[0].by.as_deref(), Some("e1"));

		// The write must be durable, not only on the returned value
		let reread = repo.read(&order.id).await.unwrap();
		assert_eq!(reread.update_history.len(), 1);
	}

	#[tokio::test]
	async fn test_update_status_missing_order() {
		let repo = OrderRepository::new(storage());

		let result = repo
			.update_status("missing", OrderStatus::OrderCancelled, None, None)
			.await;

		assert!(matches!(result, Err(StorageError::NotFound)));
	}
}
