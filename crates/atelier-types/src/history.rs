//! Status-history ledger entry.
//!
//! Every lifecycle entity (order, quotation, realisation) embeds an
//! append-only list of these entries; insertion order is chronological
//! order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded status transition.
///
/// `new_status` carries the wire spelling of the status so that one entry
/// type serves all three lifecycle entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
	/// Wire spelling of the status the entity moved to.
	pub new_status: String,
	/// When the transition was applied.
	pub when: DateTime<Utc>,
	/// Actor that triggered the transition, if any (system cascades leave
	/// this unset).
	pub by: Option<String>,
	/// Free-form note attached to the transition.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
}

impl StatusUpdate {
	/// Creates an entry stamped with the current time.
	pub fn now(new_status: impl Into<String>, by: Option<String>, comment: Option<String>) -> Self {
		Self {
			new_status: new_status.into(),
			when: Utc::now(),
			by,
			comment,
		}
	}
}
