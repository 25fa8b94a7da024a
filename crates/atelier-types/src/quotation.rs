//! Quotation entity and its status lifecycle.
//!
//! A quotation prices a validated order. At most one non-cancelled
//! quotation may exist per order at any time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::StatusUpdate;

/// Status of a quotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuotationStatus {
	/// Quotation awaits employee validation.
	QuotationUnderReview,
	/// An employee validated the quotation; the customer may now decide.
	QuotationValidated,
	/// An employee cancelled the quotation before validation.
	QuotationCancelled,
	/// The order owner rejected the quotation.
	QuotationRejected,
	/// The order owner accepted the quotation; a realisation is scheduled.
	QuotationAccepted,
}

impl QuotationStatus {
	/// Wire spelling of this status, as persisted in history entries.
	pub fn as_str(&self) -> &'static str {
		match self {
			QuotationStatus::QuotationUnderReview => "quotationUnderReview",
			QuotationStatus::QuotationValidated => "quotationValidated",
			QuotationStatus::QuotationCancelled => "quotationCancelled",
			QuotationStatus::QuotationRejected => "quotationRejected",
			QuotationStatus::QuotationAccepted => "quotationAccepted",
		}
	}

	/// A quotation counts as live unless it has been cancelled.
	pub fn is_live(&self) -> bool {
		!matches!(self, QuotationStatus::QuotationCancelled)
	}
}

impl fmt::Display for QuotationStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A price quotation attached to an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quotation {
	/// Unique identifier for this quotation.
	pub id: String,
	/// The order this quotation prices.
	pub order_id: String,
	/// Quoted price.
	pub price: u64,
	/// Free-form details; system-generated quotations carry "Generated".
	pub details: String,
	/// Employee that created the quotation manually; None when the system
	/// generated it as part of order validation.
	pub owner_id: Option<String>,
	/// Current status of the quotation.
	pub status: QuotationStatus,
	/// Append-only transition ledger, oldest first.
	pub update_history: Vec<StatusUpdate>,
	/// Timestamp when this quotation was created.
	pub created: DateTime<Utc>,
}

impl Quotation {
	/// Builds a fresh quotation: under review, empty ledger, stamped with
	/// the current time.
	pub fn new(
		id: impl Into<String>,
		order_id: impl Into<String>,
		price: u64,
		details: impl Into<String>,
		owner_id: Option<String>,
	) -> Self {
		Self {
			id: id.into(),
			order_id: order_id.into(),
			price,
			details: details.into(),
			owner_id,
			status: QuotationStatus::QuotationUnderReview,
			update_history: Vec::new(),
			created: Utc::now(),
		}
	}
}
