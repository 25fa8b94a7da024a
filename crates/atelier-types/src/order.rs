//! Order entity, service catalogue and order status lifecycle.
//!
//! An order is created by a customer for one of the catalogued services and
//! moves through review, quotation and realisation phases. The status enum
//! is the closed set of states the order state machine operates on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::StatusUpdate;

/// The services a customer can order.
///
/// Each service maps to a fixed price used when a quotation is generated
/// for a validated order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
	WebSite,
	MobileApp,
	DesktopApp,
}

impl ServiceKind {
	/// Fixed quotation price for this service.
	pub fn price(&self) -> u64 {
		match self {
			ServiceKind::WebSite => 5000,
			ServiceKind::MobileApp => 8000,
			ServiceKind::DesktopApp => 10000,
		}
	}

	/// Human-readable catalogue label.
	pub fn label(&self) -> &'static str {
		match self {
			ServiceKind::WebSite => "Make a web site",
			ServiceKind::MobileApp => "Make a mobile app",
			ServiceKind::DesktopApp => "Make a desktop app",
		}
	}
}

impl fmt::Display for ServiceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Status of an order in the atelier system.
///
/// The realisation-phase states mirror the status of the order's
/// realisation so that the order record alone tells the whole story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
	/// Order has been placed and awaits an employee decision.
	UnderReview,
	/// An employee validated the order; a quotation has been generated.
	OrderAccepted,
	/// An employee rejected the order.
	OrderRejected,
	/// The owning customer cancelled the order.
	OrderCancelled,
	/// A realisation has been scheduled for the order.
	RealisationScheduled,
	/// The assigned employee started working on the realisation.
	RealisationStarted,
	/// The realisation finished; the order is complete.
	RealisationCompleted,
}

impl OrderStatus {
	/// Wire spelling of this status, as persisted in history entries.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::UnderReview => "underReview",
			OrderStatus::OrderAccepted => "orderAccepted",
			OrderStatus::OrderRejected => "orderRejected",
			OrderStatus::OrderCancelled => "orderCancelled",
			OrderStatus::RealisationScheduled => "realisationScheduled",
			OrderStatus::RealisationStarted => "realisationStarted",
			OrderStatus::RealisationCompleted => "realisationCompleted",
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A customer order for one catalogued service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
	/// Unique identifier for this order.
	pub id: String,
	/// The customer that placed the order.
	pub customer_id: String,
	/// Ordered service; fixes the quotation price tier.
	pub service: ServiceKind,
	/// Free-form description of what the customer wants.
	pub description: String,
	/// Current status of the order.
	pub status: OrderStatus,
	/// Append-only transition ledger, oldest first.
	pub update_history: Vec<StatusUpdate>,
	/// Timestamp when this order was created.
	pub created: DateTime<Utc>,
}

impl Order {
	/// Builds a freshly placed order: under review, empty ledger, stamped
	/// with the current time.
	pub fn new(
		id: impl Into<String>,
		customer_id: impl Into<String>,
		service: ServiceKind,
		description: impl Into<String>,
	) -> Self {
		Self {
			id: id.into(),
			customer_id: customer_id.into(),
			service,
			description: description.into(),
			status: OrderStatus::UnderReview,
			update_history: Vec::new(),
			created: Utc::now(),
		}
	}
}
