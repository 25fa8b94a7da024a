//! Event types for inter-service communication.
//!
//! Lifecycle services publish an event for every entity creation and
//! status transition. Events flow through a broadcast bus; the dispatch
//! engine subscribes to log them, and further consumers can attach without
//! touching the lifecycle logic.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::{OrderStatus, QuotationStatus, RealisationStatus};

/// Main event type encompassing all lifecycle events.
///
/// Events are categorized by the entity that produced them, allowing
/// consumers to filter and handle specific event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LifecycleEvent {
	/// Events from the order lifecycle.
	Order(OrderEvent),
	/// Events from the quotation lifecycle.
	Quotation(QuotationEvent),
	/// Events from the realisation lifecycle.
	Realisation(RealisationEvent),
}

/// Events related to orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderEvent {
	/// A customer placed a new order.
	Created { order_id: String, customer_id: String },
	/// An order moved to a new status.
	Transitioned {
		order_id: String,
		status: OrderStatus,
		by: Option<String>,
	},
}

/// Events related to quotations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QuotationEvent {
	/// A quotation was attached to an order. `generated` is true when the
	/// system created it as part of order validation.
	Created {
		quotation_id: String,
		order_id: String,
		generated: bool,
	},
	/// A quotation moved to a new status.
	Transitioned {
		quotation_id: String,
		status: QuotationStatus,
		by: Option<String>,
	},
}

/// Events related to realisations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RealisationEvent {
	/// A realisation was scheduled for an order.
	Created {
		realisation_id: String,
		order_id: String,
		employee_id: String,
	},
	/// A realisation moved to a new status.
	Transitioned {
		realisation_id: String,
		status: RealisationStatus,
		by: Option<String>,
	},
}

/// Broadcast bus carrying lifecycle events between services.
///
/// Cloning the bus clones the sending half; every subscriber gets its own
/// receiver. Publishing never blocks; events published with no subscriber
/// are dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
	sender: broadcast::Sender<LifecycleEvent>,
}

impl EventBus {
	/// Creates a bus buffering up to `capacity` events per subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event to all current subscribers.
	pub fn publish(
		&self,
		event: LifecycleEvent,
	) -> Result<usize, broadcast::error::SendError<LifecycleEvent>> {
		self.sender.send(event)
	}

	/// Creates a new subscription to the bus.
	pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
		self.sender.subscribe()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(1024)
	}
}
