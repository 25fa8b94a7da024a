//! Realisation collection repository.

use crate::{StorageError, StorageService};
use atelier_types::{Realisation, RealisationStatus, StatusUpdate, StorageKey};
use std::sync::Arc;
use uuid::Uuid;

/// CRUD operations over the realisation collection.
pub struct RealisationRepository {
	storage: Arc<StorageService>,
}

impl RealisationRepository {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Persists a freshly scheduled realisation and returns the stored
	/// record.
	pub async fn create(
		&self,
		order_id: &str,
		employee_id: &str,
		created_by: Option<String>,
	) -> Result<Realisation, StorageError> {
		let realisation = Realisation::new(
			Uuid::new_v4().to_string(),
			order_id,
			employee_id,
			created_by,
		);
		self.storage
			.store(
				StorageKey::Realisations.as_str(),
				&realisation.id,
				&realisation,
			)
			.await?;
		Ok(realisation)
	}

	/// Reads one realisation by id.
	pub async fn read(&self, id: &str) -> Result<Realisation, StorageError> {
		self.storage
			.retrieve(StorageKey::Realisations.as_str(), id)
			.await
	}

	/// Lists every realisation.
	pub async fn read_all(&self) -> Result<Vec<Realisation>, StorageError> {
		self.storage
			.retrieve_all(StorageKey::Realisations.as_str())
			.await
	}

	/// Checks whether a realisation with this id exists.
	pub async fn exists(&self, id: &str) -> Result<bool, StorageError> {
		self.storage
			.exists(StorageKey::Realisations.as_str(), id)
			.await
	}

	/// Moves the realisation to `new_status` and appends the matching
	/// ledger entry. Returns the updated realisation.
	pub async fn update_status(
		&self,
		realisation_id: &str,
		new_status: RealisationStatus,
		by: Option<&str>,
		comment: Option<&str>,
	) -> Result<Realisation, StorageError> {
		let mut realisation: Realisation = self.read(realisation_id).await?;

		realisation.status = new_status;
		realisation.update_history.push(StatusUpdate::now(
			new_status.as_str(),
			by.map(str::to_string),
			comment.map(str::to_string),
		));

		self.storage
			.update(
				StorageKey::Realisations.as_str(),
				realisation_id,
				&realisation,
			)
			.await?;

		Ok(realisation)
	}
}
