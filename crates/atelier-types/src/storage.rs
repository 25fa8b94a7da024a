//! Storage-related types for the atelier system.

use std::str::FromStr;

/// Storage keys for the persisted collections.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Key for the customer collection
	Customers,
	/// Key for the employee collection
	Employees,
	/// Key for the order collection
	Orders,
	/// Key for the quotation collection
	Quotations,
	/// Key for the realisation collection
	Realisations,
	/// Key for dispatched job records
	Jobs,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Customers => "customers",
			StorageKey::Employees => "employees",
			StorageKey::Orders => "orders",
			StorageKey::Quotations => "quotations",
			StorageKey::Realisations => "realisations",
			StorageKey::Jobs => "jobs",
		}
	}

	/// Returns an iterator over all StorageKey variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Customers,
			Self::Employees,
			Self::Orders,
			Self::Quotations,
			Self::Realisations,
			Self::Jobs,
		]
		.into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"customers" => Ok(Self::Customers),
			"employees" => Ok(Self::Employees),
			"orders" => Ok(Self::Orders),
			"quotations" => Ok(Self::Quotations),
			"realisations" => Ok(Self::Realisations),
			"jobs" => Ok(Self::Jobs),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}
