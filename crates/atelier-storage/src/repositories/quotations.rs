//! Quotation collection repository.
//!
//! Besides plain CRUD, this repository answers the two order-scoped
//! questions the lifecycle logic needs: does the order already carry a
//! live (non-cancelled) quotation, and does it carry an accepted one.

use crate::{StorageError, StorageService};
use atelier_types::{Quotation, QuotationStatus, StatusUpdate, StorageKey};
use std::sync::Arc;
use uuid::Uuid;

/// CRUD operations over the quotation collection.
pub struct QuotationRepository {
	storage: Arc<StorageService>,
}

impl QuotationRepository {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Persists a fresh quotation and returns the stored record.
	pub async fn create(
		&self,
		order_id: &str,
		price: u64,
		details: &str,
		owner_id: Option<String>,
	) -> Result<Quotation, StorageError> {
		let quotation = Quotation::new(
			Uuid::new_v4().to_string(),
			order_id,
			price,
			details,
			owner_id,
		);
		self.storage
			.store(StorageKey::Quotations.as_str(), &quotation.id, &quotation)
			.await?;
		Ok(quotation)
	}

	/// Reads one quotation by id.
	pub async fn read(&self, id: &str) -> Result<Quotation, StorageError> {
		self.storage.retrieve(StorageKey::Quotations.as_str(), id).await
	}

	/// Lists every quotation.
	pub async fn read_all(&self) -> Result<Vec<Quotation>, StorageError> {
		self.storage.retrieve_all(StorageKey::Quotations.as_str()).await
	}

	/// Checks whether a quotation with this id exists.
	pub async fn exists(&self, id: &str) -> Result<bool, StorageError> {
		self.storage.exists(StorageKey::Quotations.as_str(), id).await
	}

	/// Lists the quotations attached to one order.
	pub async fn read_for_order(&self, order_id: &str) -> Result<Vec<Quotation>, StorageError> {
		let all: Vec<Quotation> = self.read_all().await?;
		Ok(all.into_iter().filter(|q| q.order_id == order_id).collect())
	}

	/// True when the order already carries a non-cancelled quotation.
	pub async fn has_live_for_order(&self, order_id: &str) -> Result<bool, StorageError> {
		let quotations = self.read_for_order(order_id).await?;
		Ok(quotations.iter().any(|q| q.status.is_live()))
	}

	/// True when the order carries an accepted quotation.
	pub async fn has_accepted_for_order(&self, order_id: &str) -> Result<bool, StorageError> {
		let quotations = self.read_for_order(order_id).await?;
		Ok(quotations
			.iter()
			.any(|q| q.status == QuotationStatus::QuotationAccepted))
	}

	/// Moves the quotation to `new_status` and appends the matching ledger
	/// entry. Returns the updated quotation.
	pub async fn update_status(
		&self,
		quotation_id: &str,
		new_status: QuotationStatus,
		by: Option<&str>,
		comment: Option<&str>,
	) -> Result<Quotation, StorageError> {
		let mut quotation: Quotation = self.read(quotation_id).await?;

		quotation.status = new_status;
		quotation.update_history.push(StatusUpdate::now(
			new_status.as_str(),
			by.map(str::to_string),
			comment.map(str::to_string),
		));

		self.storage
			.update(StorageKey::Quotations.as_str(), quotation_id, &quotation)
			.await?;

		Ok(quotation)
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
	async fn test_live_quotation_detection() {
		let repo = QuotationRepository::new(storage());

		let quotation = repo.create("o1", 5000, "Generated", None).await.unwrap();
		assert!(repo.has_live_for_order("o1").await.unwrap());
		assert!(!repo.has_live_for_order("o2").await.unwrap());

		// A cancelled quotation no longer counts as live
		repo.update_status(
			&quotation.id,
			QuotationStatus::QuotationCancelled,
			Some("e1"),
			None,
		)
		.await
		.unwrap();
		assert!(!repo.has_live_for_order("o1").await.unwrap());
	}

	#[tokio::test]
	async fn test_accepted_quotation_detection() {
		let repo = QuotationRepository::new(storage());
		let quotation = repo.create("o1", 8000, "Generated", None).await.unwrap();

		assert!(!repo.has_accepted_for_order("o1").await.unwrap());

		repo.update_status(
			&quotation.id,
			QuotationStatus::QuotationAccepted,
			Some("c1"),
			None,
		)
		.await
		.unwrap();

		assert!(repo.has_accepted_for_order("o1").await.unwrap());
	}
}
