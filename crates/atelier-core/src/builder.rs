//! Builder wiring configuration and factories into a running engine.
//!
//! The builder resolves the configured storage backend and assignment
//! strategy through their factory registries, constructs the repositories
//! and guards, and assembles the lifecycle services in dependency order:
//! realisation, then quotation, then order.

use atelier_config::Config;
use atelier_lifecycle::{
	get_all_assignment_implementations, AssignmentError, AssignmentFactory, Guards, OrderService,
	QuotationService, RealisationService,
};
use atelier_storage::{
	get_all_implementations, CustomerRepository, EmployeeRepository, OrderRepository,
	QuotationRepository, RealisationRepository, StorageError, StorageFactory, StorageService,
};
use atelier_types::EventBus;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::Engine;

/// Errors that can occur while building the engine.
#[derive(Debug, Error)]
pub enum BuilderError {
	/// A configured implementation name has no registered factory.
	#[error("Unknown implementation: {0}")]
	UnknownImplementation(String),
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
	#[error("Assignment error: {0}")]
	Assignment(#[from] AssignmentError),
}

/// Factory maps the builder resolves configured names against.
pub struct ServiceFactories {
	pub storage: HashMap<String, StorageFactory>,
	pub assignment: HashMap<String, AssignmentFactory>,
}

impl Default for ServiceFactories {
	/// Registers every implementation shipped with the workspace.
	fn default() -> Self {
		let mut storage = HashMap::new();
		for (name, factory) in get_all_implementations() {
			storage.insert(name.to_string(), factory);
		}

		let mut assignment = HashMap::new();
		for (name, factory) in get_all_assignment_implementations() {
			assignment.insert(name.to_string(), factory);
		}

		Self {
			storage,
			assignment,
		}
	}
}

/// Builds an [`Engine`] from configuration and factories.
pub struct EngineBuilder {
	config: Config,
	factories: ServiceFactories,
}

impl EngineBuilder {
	/// Creates a builder with the default factory registrations.
	pub fn new(config: Config) -> Self {
		Self {
			config,
			factories: ServiceFactories::default(),
		}
	}

	/// Replaces the factory maps, e.g. to add custom implementations.
	pub fn with_factories(mut self, factories: ServiceFactories) -> Self {
		self.factories = factories;
		self
	}

	/// Wires the full service graph.
	pub fn build(self) -> Result<Engine, BuilderError> {
		let config = self.config;

		// Storage backend
		let storage_factory = self
			.factories
			.storage
			.get(&config.storage.primary)
			.ok_or_else(|| BuilderError::UnknownImplementation(config.storage.primary.clone()))?;
		let storage_section = config
			.primary_storage_section()
			.cloned()
			.unwrap_or_else(|| toml::Value::Table(Default::default()));
		let backend = storage_factory(&storage_section)?;
		let storage = Arc::new(StorageService::new(backend));

		// Assignment strategy
		let assignment_factory = self
			.factories
			.assignment
			.get(&config.assignment.primary)
			.ok_or_else(|| {
				BuilderError::UnknownImplementation(config.assignment.primary.clone())
			})?;
		let assignment = assignment_factory(&config.primary_assignment_section())?;

		// Repositories and guards
		let customers = Arc::new(CustomerRepository::new(storage.clone()));
		let employees = Arc::new(EmployeeRepository::new(storage.clone()));
		let orders = Arc::new(OrderRepository::new(storage.clone()));
		let quotations = Arc::new(QuotationRepository::new(storage.clone()));
		let realisations = Arc::new(RealisationRepository::new(storage.clone()));
		let guards = Arc::new(Guards::new(
			customers.clone(),
			employees.clone(),
			orders.clone(),
		));

		// Lifecycle services, leaves first
		let event_bus = EventBus::default();
		let realisation_service = Arc::new(RealisationService::new(
			realisations,
			orders.clone(),
			quotations.clone(),
			guards.clone(),
			event_bus.clone(),
		));
		let quotation_service = Arc::new(QuotationService::new(
			quotations,
			orders.clone(),
			employees.clone(),
			guards.clone(),
			realisation_service.clone(),
			Arc::from(assignment),
			event_bus.clone(),
		));
		let order_service = Arc::new(OrderService::new(
			orders,
			guards,
			quotation_service.clone(),
			event_bus.clone(),
		));

		Ok(Engine::new(
			config,
			storage,
			customers,
			employees,
			order_service,
			quotation_service,
			realisation_service,
			event_bus,
		))
	}
}
