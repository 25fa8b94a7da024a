//! Lifecycle logic for the atelier order-processing system.
//!
//! This crate is the business core: the order, quotation and realisation
//! lifecycle services, the authorization guards they share, the legal
//! transition tables, and the pluggable employee-assignment strategies.
//! Each service receives its repositories and downstream collaborators as
//! constructor arguments; cross-entity cascades (order validation spawns a
//! quotation, quotation acceptance spawns a realisation, realisation
//! progress updates the order) run synchronously inside the triggering
//! operation.

use atelier_storage::StorageError;
use atelier_types::ApiError;
use thiserror::Error;

/// Pluggable employee-assignment strategies.
pub mod assignment;
/// Shared authorization and existence predicates.
pub mod guards;
/// Order lifecycle service.
pub mod order;
/// Quotation lifecycle service.
pub mod quotation;
/// Realisation lifecycle service.
pub mod realisation;
/// Legal status-transition tables.
pub mod state;

/// Re-export implementations
pub mod implementations {
	pub mod random;
}

#[cfg(test)]
pub(crate) mod testutil;

pub use assignment::{
	get_all_assignment_implementations, AssignmentError, AssignmentFactory, AssignmentRegistry,
	AssignmentStrategy,
};
pub use guards::Guards;
pub use order::OrderService;
pub use quotation::QuotationService;
pub use realisation::RealisationService;

/// Errors surfaced by the lifecycle services.
///
/// Every rejected precondition embeds the entity id and the offending
/// status or identity so a caller can tell which rule failed.
#[derive(Debug, Error)]
pub enum LifecycleError {
	/// A referenced entity id does not resolve.
	#[error("{entity} {id} not found")]
	NotFound { entity: &'static str, id: String },
	/// An authorization predicate failed, or a status-gated precondition
	/// framed as an authorization concern failed.
	#[error("{0}")]
	Forbidden(String),
	/// The current status does not permit the requested transition.
	#[error("{0}")]
	InvalidTransition(String),
	/// A repository write did not apply.
	#[error("Persistence failure: {0}")]
	Persistence(String),
	/// A cascade step failed after earlier writes were already committed.
	/// The triggering entity keeps its new status; nothing is rolled back.
	#[error("Cascade step '{step}' failed: {reason}")]
	PartialFailure { step: &'static str, reason: String },
}

impl LifecycleError {
	/// Maps a repository read error onto the lifecycle taxonomy.
	pub(crate) fn from_read(entity: &'static str, id: &str, err: StorageError) -> Self {
		match err {
			StorageError::NotFound => LifecycleError::NotFound {
				entity,
				id: id.to_string(),
			},
			other => LifecycleError::Persistence(other.to_string()),
		}
	}
}

impl From<StorageError> for LifecycleError {
	fn from(err: StorageError) -> Self {
		LifecycleError::Persistence(err.to_string())
	}
}

impl From<LifecycleError> for ApiError {
	fn from(err: LifecycleError) -> Self {
		match err {
			LifecycleError::NotFound { .. } => ApiError::NotFound {
				message: err.to_string(),
			},
			LifecycleError::Forbidden(message) => ApiError::Forbidden { message },
			LifecycleError::InvalidTransition(message) => ApiError::BadRequest { message },
			LifecycleError::Persistence(_) | LifecycleError::PartialFailure { .. } => {
				ApiError::BadRequest {
					message: err.to_string(),
				}
			},
		}
	}
}
