//! Typed per-entity repositories.
//!
//! Each repository owns the CRUD surface of one collection: read, create,
//! existence check, collection scan and — for the lifecycle entities —
//! the status update that appends to the history ledger. Lifecycle logic
//! receives the repositories it needs as constructor arguments; no
//! repository is reachable through a global handle.

mod customers;
mod employees;
mod orders;
mod quotations;
mod realisations;

pub use customers::CustomerRepository;
pub use employees::EmployeeRepository;
pub use orders::OrderRepository;
pub use quotations::QuotationRepository;
pub use realisations::RealisationRepository;
