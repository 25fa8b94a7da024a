//! Uniform-random assignment strategy.
//!
//! Picks one employee uniformly at random from the registered pool,
//! spreading realisation workload without tracking any state.

use crate::assignment::{AssignmentError, AssignmentStrategy};
use atelier_types::{ConfigSchema, Employee, ImplementationRegistry, Schema, ValidationError};
use rand::seq::SliceRandom;

/// Uniform-random employee picker.
pub struct RandomAssignment;

impl RandomAssignment {
	pub fn new() -> Self {
		Self
	}
}

impl Default for RandomAssignment {
	fn default() -> Self {
		Self::new()
	}
}

impl AssignmentStrategy for RandomAssignment {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(RandomAssignmentSchema)
	}

	fn pick(&self, employees: &[Employee]) -> Result<String, AssignmentError> {
		employees
			.choose(&mut rand::thread_rng())
			.map(|employee| employee.id.clone())
			.ok_or(AssignmentError::NoCandidates)
	}
}

/// Configuration schema for RandomAssignment.
pub struct RandomAssignmentSchema;

impl ConfigSchema for RandomAssignmentSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// The random strategy has no required configuration
		let schema = Schema::new(vec![], vec![]);
		schema.validate(config)
	}
}

/// Registry for the random assignment strategy.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "random";
	type Factory = crate::assignment::AssignmentFactory;

	fn factory() -> Self::Factory {
		create_strategy
	}
}

impl crate::assignment::AssignmentRegistry for Registry {}

/// Factory function to create the random assignment strategy.
///
/// Configuration parameters:
/// - None required
pub fn create_strategy(
	_config: &toml::Value,
) -> Result<Box<dyn AssignmentStrategy>, AssignmentError> {
	Ok(Box::new(RandomAssignment::new()))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn employee(id: &str) -> Employee {
		Employee {
			id: id.to_string(),
			first_name: "Test".to_string(),
			last_name: "Employee".to_string(),
			email: format!("{}@atelier.test", id),
		}
	}

	#[test]
	fn test_pick_returns_a_candidate() {
		let strategy = RandomAssignment::new();
		let pool = vec![employee("e1"), employee("e2"), employee("e3")];

		for _ in 0..32 {
			let picked = strategy.pick(&pool).unwrap();
			assert!(pool.iter().any(|e| e.id == picked));
		}
	}

	#[test]
	fn test_pick_fails_on_empty_pool() {
		let strategy = RandomAssignment::new();
		assert!(matches!(
			strategy.pick(&[]),
			Err(AssignmentError::NoCandidates)
		));
	}
}
