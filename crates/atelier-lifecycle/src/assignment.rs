//! Pluggable employee-assignment strategies.
//!
//! When a quotation is accepted, one employee is picked to execute the
//! realisation. The strategy behind that pick is pluggable so that
//! uniform-random distribution can later be swapped for load-aware
//! assignment without touching the lifecycle logic.

use atelier_types::{ConfigSchema, Employee, ImplementationRegistry};
use thiserror::Error;

/// Errors that can occur while picking an employee.
#[derive(Debug, Error)]
pub enum AssignmentError {
	/// No employees are registered to pick from.
	#[error("No employees available for assignment")]
	NoCandidates,
	/// Error that occurs when strategy configuration is invalid.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
}

/// Trait defining the interface for assignment strategies.
pub trait AssignmentStrategy: Send + Sync {
	/// Returns the configuration schema for this strategy implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Picks the employee to assign from the given candidates.
	fn pick(&self, employees: &[Employee]) -> Result<String, AssignmentError>;
}

/// Type alias for assignment strategy factory functions.
pub type AssignmentFactory =
	fn(&toml::Value) -> Result<Box<dyn AssignmentStrategy>, AssignmentError>;

/// Registry trait for assignment strategy implementations.
pub trait AssignmentRegistry: ImplementationRegistry<Factory = AssignmentFactory> {}

/// Get all registered assignment strategy implementations.
///
/// Returns a vector of (name, factory) tuples for all available
/// strategies. This is used by the engine builder to automatically
/// register all implementations.
pub fn get_all_assignment_implementations() -> Vec<(&'static str, AssignmentFactory)> {
	use crate::implementations::random;

	vec![(random::Registry::NAME, random::Registry::factory())]
}
