//! Legal status-transition tables.
//!
//! One static table per lifecycle entity maps each state to the set of
//! states it may move to. The tables are the single written-down form of
//! the three state machines; the lifecycle services consult them (or the
//! equivalent single-state preconditions) before every transition, so a
//! status can never move backward or skip a state.

use atelier_types::{OrderStatus, QuotationStatus, RealisationStatus};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Order state machine:
/// underReview -> orderAccepted/orderRejected/orderCancelled,
/// orderAccepted -> orderCancelled/realisationScheduled,
/// then realisationScheduled -> realisationStarted -> realisationCompleted.
static ORDER_TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(
		OrderStatus::UnderReview,
		HashSet::from([
			OrderStatus::OrderAccepted,
			OrderStatus::OrderRejected,
			OrderStatus::OrderCancelled,
		]),
	);
	m.insert(
		OrderStatus::OrderAccepted,
		HashSet::from([
			OrderStatus::OrderCancelled,
			OrderStatus::RealisationScheduled,
		]),
	);
	m.insert(
		OrderStatus::RealisationScheduled,
		HashSet::from([OrderStatus::RealisationStarted]),
	);
	m.insert(
		OrderStatus::RealisationStarted,
		HashSet::from([OrderStatus::RealisationCompleted]),
	);
	m.insert(OrderStatus::OrderRejected, HashSet::new()); // terminal
	m.insert(OrderStatus::OrderCancelled, HashSet::new()); // terminal
	m.insert(OrderStatus::RealisationCompleted, HashSet::new()); // terminal
	m
});

/// Quotation state machine:
/// quotationUnderReview -> quotationValidated/quotationCancelled,
/// quotationValidated -> quotationAccepted/quotationRejected.
static QUOTATION_TRANSITIONS: Lazy<HashMap<QuotationStatus, HashSet<QuotationStatus>>> =
	Lazy::new(|| {
		let mut m = HashMap::new();
		m.insert(
			QuotationStatus::QuotationUnderReview,
			HashSet::from([
				QuotationStatus::QuotationValidated,
				QuotationStatus::QuotationCancelled,
			]),
		);
		m.insert(
			QuotationStatus::QuotationValidated,
			HashSet::from([
				QuotationStatus::QuotationAccepted,
				QuotationStatus::QuotationRejected,
			]),
		);
		m.insert(QuotationStatus::QuotationCancelled, HashSet::new()); // terminal
		m.insert(QuotationStatus::QuotationRejected, HashSet::new()); // terminal
		m.insert(QuotationStatus::QuotationAccepted, HashSet::new()); // terminal
		m
	});

/// Realisation state machine:
/// realisationScheduled -> realisationStarted -> realisationCompleted.
static REALISATION_TRANSITIONS: Lazy<HashMap<RealisationStatus, HashSet<RealisationStatus>>> =
	Lazy::new(|| {
		let mut m = HashMap::new();
		m.insert(
			RealisationStatus::RealisationScheduled,
			HashSet::from([RealisationStatus::RealisationStarted]),
		);
		m.insert(
			RealisationStatus::RealisationStarted,
			HashSet::from([RealisationStatus::RealisationCompleted]),
		);
		m.insert(RealisationStatus::RealisationCompleted, HashSet::new()); // terminal
		m
	});

/// Checks whether an order may move from `from` to `to`.
pub fn order_transition_allowed(from: OrderStatus, to: OrderStatus) -> bool {
	ORDER_TRANSITIONS
		.get(&from)
		.is_some_and(|set| set.contains(&to))
}

/// Checks whether a quotation may move from `from` to `to`.
pub fn quotation_transition_allowed(from: QuotationStatus, to: QuotationStatus) -> bool {
	QUOTATION_TRANSITIONS
		.get(&from)
		.is_some_and(|set| set.contains(&to))
}

/// Checks whether a realisation may move from `from` to `to`.
pub fn realisation_transition_allowed(from: RealisationStatus, to: RealisationStatus) -> bool {
	REALISATION_TRANSITIONS
		.get(&from)
		.is_some_and(|set| set.contains(&to))
}

#[cfg(test)]
mod tests {
	use super::*;
	use atelier_types::OrderStatus::*;

	#[test]
	fn test_order_edges_are_exactly_the_machine() {
		let all = [
			UnderReview,
			OrderAccepted,
			OrderRejected,
			OrderCancelled,
			RealisationScheduled,
			RealisationStarted,
			RealisationCompleted,
		];
		let edges = [
			(UnderReview, OrderAccepted),
			(UnderReview, OrderRejected),
			(UnderReview, OrderCancelled),
			(OrderAccepted, OrderCancelled),
			(OrderAccepted, RealisationScheduled),
			(RealisationScheduled, RealisationStarted),
			(RealisationStarted, RealisationCompleted),
		];

		for from in all {
			for to in all {
				let expected = edges.contains(&(from, to));
				assert_eq!(
					order_transition_allowed(from, to),
					expected,
					"unexpected verdict for {:?} -> {:?}",
					from,
					to
				);
			}
		}
	}

	#[test]
	fn test_order_cannot_move_backward() {
		assert!(!order_transition_allowed(OrderAccepted, UnderReview));
		assert!(!order_transition_allowed(RealisationStarted, RealisationScheduled));
		assert!(!order_transition_allowed(RealisationCompleted, RealisationStarted));
	}

	#[test]
	fn test_quotation_edges() {
		use atelier_types::QuotationStatus::*;

		assert!(quotation_transition_allowed(
			QuotationUnderReview,
			QuotationValidated
		));
		assert!(quotation_transition_allowed(
			QuotationUnderReview,
			QuotationCancelled
		));
		assert!(quotation_transition_allowed(
			QuotationValidated,
			QuotationAccepted
		));
		assert!(quotation_transition_allowed(
			QuotationValidated,
			QuotationRejected
		));

		// No skipping review, no leaving a terminal state
		assert!(!quotation_transition_allowed(
			QuotationUnderReview,
			QuotationAccepted
		));
		assert!(!quotation_transition_allowed(
			QuotationAccepted,
			QuotationRejected
		));
		assert!(!quotation_transition_allowed(
			QuotationCancelled,
			QuotationValidated
		));
	}

	#[test]
	fn test_realisation_edges() {
		use atelier_types::RealisationStatus::*;

		assert!(realisation_transition_allowed(
			RealisationScheduled,
			RealisationStarted
		));
		assert!(realisation_transition_allowed(
			RealisationStarted,
			RealisationCompleted
		));

		assert!(!realisation_transition_allowed(
			RealisationScheduled,
			RealisationCompleted
		));
		assert!(!realisation_transition_allowed(
			RealisationCompleted,
			RealisationStarted
		));
	}
}
