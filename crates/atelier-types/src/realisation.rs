//! Realisation entity and its status lifecycle.
//!
//! A realisation is the work assignment spawned when a quotation is
//! accepted. Only the assigned employee may drive it forward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::StatusUpdate;

/// Status of a realisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RealisationStatus {
	/// Work is scheduled and waiting for the assignee to start.
	RealisationScheduled,
	/// The assignee started working.
	RealisationStarted,
	/// The work is done.
	RealisationCompleted,
}

impl RealisationStatus {
	/// Wire spelling of this status, as persisted in history entries.
	pub fn as_str(&self) -> &'static str {
		match self {
			RealisationStatus::RealisationScheduled => "realisationScheduled",
			RealisationStatus::RealisationStarted => "realisationStarted",
			RealisationStatus::RealisationCompleted => "realisationCompleted",
		}
	}
}

impl fmt::Display for RealisationStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A scheduled piece of work executing an accepted quotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Realisation {
	/// Unique identifier for this realisation.
	pub id: String,
	/// The order being realised.
	pub order_id: String,
	/// The employee assigned to execute the work.
	pub employee_id: String,
	/// Employee that created the realisation manually; None when the
	/// system scheduled it from a quotation acceptance.
	pub created_by: Option<String>,
	/// Current status of the realisation.
	pub status: RealisationStatus,
	/// Timestamp when the work was assigned.
	pub assignment_date: DateTime<Utc>,
	/// Append-only transition ledger, oldest first.
	pub update_history: Vec<StatusUpdate>,
}

impl Realisation {
	/// Builds a freshly scheduled realisation with an empty ledger and the
	/// current time as assignment date.
	pub fn new(
		id: impl Into<String>,
		order_id: impl Into<String>,
		employee_id: impl Into<String>,
		created_by: Option<String>,
	) -> Self {
		Self {
			id: id.into(),
			order_id: order_id.into(),
			employee_id: employee_id.into(),
			created_by,
			status: RealisationStatus::RealisationScheduled,
			assignment_date: Utc::now(),
			update_history: Vec::new(),
		}
	}
}
