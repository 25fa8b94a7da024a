//! Customer and employee identities.
//!
//! Both parties are created through direct registration and are immutable
//! afterwards. Customers own orders; employees review orders, issue
//! quotations and execute realisations.

use serde::{Deserialize, Serialize};

/// A registered customer.
///
/// Customers create orders and are the only party allowed to cancel their
/// own orders or accept/reject quotations attached to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
	/// Unique identifier for this customer.
	pub id: String,
	pub first_name: String,
	pub last_name: String,
	pub email: String,
}

/// A registered employee.
///
/// Employees validate or reject orders, manage quotations and are assigned
/// to realisations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
	/// Unique identifier for this employee.
	pub id: String,
	pub first_name: String,
	pub last_name: String,
	pub email: String,
}
