//! Registry trait for self-registering implementations.
//!
//! This module provides the base trait that pluggable atelier components
//! (storage backends, assignment strategies) implement to register
//! themselves with their configuration name and factory function.

/// Base trait for implementation registries.
///
/// Each pluggable module must provide a Registry struct that implements
/// this trait, declaring its configuration name and factory function.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This should match the key used in the TOML configuration, for example:
	/// - "memory" for storage.implementations.memory
	/// - "random" for assignment.implementations.random
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	///
	/// Each module defines its own factory type, for example:
	/// - StorageFactory for storage backends
	/// - AssignmentFactory for assignment strategies
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
