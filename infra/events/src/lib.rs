//! # Event Bus
//!
//! Typed, bounded in-process queues keyed by the event's Rust type.
//!
//! A slice that reacts to events calls [`EventBus::consume`] once to own the receiving end;
//! producers call [`EventBus::enqueue`], which never waits. Producers for an event type without
//! a consumer get [`EventBusError::NoConsumer`] and can treat it as a no-op.
//!
//! ```rust
//! use tport_event_bus::{EventBus, EventBusError};
//!
//! #[derive(Debug, PartialEq)]
//! struct ShipmentCreated { tracking_id: String }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), EventBusError> {
//! let bus = EventBus::new();
//! let mut rx = bus.consume::<ShipmentCreated>(16)?;
//! bus.enqueue(ShipmentCreated { tracking_id: "TRANS1".into() })?;
//! assert_eq!(rx.recv().await.unwrap().tracking_id, "TRANS1");
//! # Ok(())
//! # }
//! ```

mod bus;
mod error;

pub use bus::{Event, EventBus, EventReceiver};
pub use error::{EventBusError, EventBusErrorExt};
