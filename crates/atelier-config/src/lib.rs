//! Configuration module for the atelier system.
//!
//! This module provides structures and utilities for managing the service
//! configuration. It supports loading configuration from TOML files with
//! `${VAR}` environment-variable placeholders and validates that every
//! `primary` selection names a configured implementation.

mod loader;

pub use loader::from_file;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the atelier service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this service instance.
	pub agency: AgencyConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for the job dispatcher.
	#[serde(default)]
	pub dispatch: DispatchConfig,
	/// Configuration for realisation assignment.
	pub assignment: AssignmentConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to this service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgencyConfig {
	/// Unique identifier for this instance.
	pub id: String,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the job dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchConfig {
	/// Number of jobs processed concurrently.
	#[serde(default = "default_workers")]
	pub workers: usize,
	/// How many times a failed job is re-run before giving up.
	#[serde(default = "default_max_retries")]
	pub max_retries: u32,
	/// Fixed delay between retry attempts, in seconds.
	#[serde(default = "default_retry_delay_secs")]
	pub retry_delay_secs: u64,
}

impl Default for DispatchConfig {
	fn default() -> Self {
		Self {
			workers: default_workers(),
			max_retries: default_max_retries(),
			retry_delay_secs: default_retry_delay_secs(),
		}
	}
}

fn default_workers() -> usize {
	4
}

/// Mirrors the reference dispatcher: two retries with a fixed delay.
fn default_max_retries() -> u32 {
	2
}

fn default_retry_delay_secs() -> u64 {
	10
}

/// Configuration for realisation assignment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssignmentConfig {
	/// Which strategy implementation to use as primary.
	pub primary: String,
	/// Map of strategy implementation names to their configurations.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

impl Config {
	/// Validates cross-field consistency.
	///
	/// Each `primary` selection must name one of its configured
	/// implementations, and the dispatcher needs at least one worker.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if !self.storage.implementations.contains_key(&self.storage.primary) {
			return Err(ConfigError::Validation(format!(
				"storage.primary '{}' is not a configured implementation",
				self.storage.primary
			)));
		}

		// The assignment section may rely on a zero-config strategy, so a
		// missing table for the primary is only rejected when other
		// strategies were configured explicitly.
		if !self.assignment.implementations.is_empty()
			&& !self
				.assignment
				.implementations
				.contains_key(&self.assignment.primary)
		{
			return Err(ConfigError::Validation(format!(
				"assignment.primary '{}' is not a configured implementation",
				self.assignment.primary
			)));
		}

		if self.dispatch.workers == 0 {
			return Err(ConfigError::Validation(
				"dispatch.workers must be at least 1".to_string(),
			));
		}

		Ok(())
	}

	/// Returns the configuration section of the primary storage backend.
	pub fn primary_storage_section(&self) -> Option<&toml::Value> {
		self.storage.implementations.get(&self.storage.primary)
	}

	/// Returns the configuration section of the primary assignment
	/// strategy, or an empty table when none was given.
	pub fn primary_assignment_section(&self) -> toml::Value {
		self.assignment
			.implementations
			.get(&self.assignment.primary)
			.cloned()
			.unwrap_or_else(|| toml::Value::Table(Default::default()))
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let config: Config = toml::from_str(s)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const EXAMPLE: &str = r#"
		[agency]
		id = "atelier-test"

		[storage]
		primary = "memory"

		[storage.implementations.memory]

		[dispatch]
		workers = 2
		max_retries = 1
		retry_delay_secs = 0

		[assignment]
		primary = "random"

		[api]
		enabled = true
		port = 8080
	"#;

	#[test]
	fn test_parse_example() {
		let config: Config = EXAMPLE.parse().unwrap();

		assert_eq!(config.agency.id, "atelier-test");
		assert_eq!(config.storage.primary, "memory");
		assert_eq!(config.dispatch.workers, 2);
		assert_eq!(config.dispatch.max_retries, 1);
		assert_eq!(config.assignment.primary, "random");

		let api = config.api.unwrap();
		assert!(api.enabled);
		assert_eq!(api.host, "127.0.0.1");
		assert_eq!(api.port, 8080);
	}

	#[test]
	fn test_dispatch_defaults() {
		let without_dispatch = r#"
			[agency]
			id = "atelier-test"

			[storage]
			primary = "memory"

			[storage.implementations.memory]

			[assignment]
			primary = "random"
		"#;
		let config: Config = without_dispatch.parse().unwrap();

		assert_eq!(config.dispatch.workers, 4);
		assert_eq!(config.dispatch.max_retries, 2);
		assert_eq!(config.dispatch.retry_delay_secs, 10);
		assert!(config.api.is_none());
	}

	#[test]
	fn test_unknown_primary_is_rejected() {
		let broken = r#"
			[agency]
			id = "atelier-test"

			[storage]
			primary = "postgres"

			[storage.implementations.memory]

			[assignment]
			primary = "random"
		"#;

		let result: Result<Config, _> = broken.parse();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}
}
