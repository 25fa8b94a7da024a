//! File-based storage backend implementation for the atelier system.
//!
//! This module provides a file-backed implementation of the
//! StorageInterface trait. Each record lives in its own JSON file, laid
//! out as `<base>/<namespace>/<id>` so that collection scans are plain
//! directory listings.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use atelier_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use std::path::PathBuf;
use tokio::fs;

/// File-based storage implementation.
///
/// Keys of the form `namespace:id` map to `<base>/<namespace>/<id>`;
/// keys without a namespace separator map to files directly under the
/// base directory.
pub struct FileStorage {
	/// Base directory holding one subdirectory per namespace.
	base: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage rooted at the given directory.
	pub fn new(base: impl Into<PathBuf>) -> Self {
		Self { base: base.into() }
	}

	/// Resolves the file path for a storage key.
	fn path_for(&self, key: &str) -> PathBuf {
		match key.split_once(':') {
			Some((namespace, id)) => self.base.join(namespace).join(id),
			None => self.base.join(key),
		}
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.path_for(key);
		match fs::read(&path).await {
			Ok(bytes) => Ok(bytes),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.path_for(key);
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}
		fs::write(&path, value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.path_for(key);
		match fs::remove_file(&path).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.path_for(key);
		Ok(fs::metadata(&path).await.is_ok())
	}

	async fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
		// Prefix scans are namespace scans: "orders:" lists the orders dir.
		let namespace = prefix.strip_suffix(':').unwrap_or(prefix);
		let dir = self.base.join(namespace);

		let mut entries = match fs::read_dir(&dir).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let mut keys = Vec::new();
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			if let Some(name) = entry.file_name().to_str() {
				keys.push(format!("{}:{}", namespace, name));
			}
		}
		Ok(keys)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("storage_path", FieldType::String)],
			vec![],
		);
		schema.validate(config)
	}
}

/// Registry for the file storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: base directory for the stored collections
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	FileStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	let path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.ok_or_else(|| StorageError::Configuration("storage_path is required".into()))?;

	Ok(Box::new(FileStorage::new(path)))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_roundtrip_and_listing() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path());

		storage
			.set_bytes("orders:o1", b"first".to_vec())
			.await
			.unwrap();
		storage
			.set_bytes("orders:o2", b"second".to_vec())
			.await
			.unwrap();

		assert_eq!(storage.get_bytes("orders:o1").await.unwrap(), b"first");
		assert!(storage.exists("orders:o2").await.unwrap());
		assert!(!storage.exists("orders:o3").await.unwrap());

		let mut keys = storage.keys("orders:").await.unwrap();
		keys.sort();
		assert_eq!(keys, vec!["orders:o1".to_string(), "orders:o2".to_string()]);

		storage.delete("orders:o1").await.unwrap();
		assert!(matches!(
			storage.get_bytes("orders:o1").await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn test_missing_namespace_lists_empty() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path());

		assert!(storage.keys("quotations:").await.unwrap().is_empty());
	}
}
