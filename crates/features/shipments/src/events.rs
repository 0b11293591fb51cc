//! Events published after a shipment write has been stored.

use crate::model::Shipment;
use crate::status::ShipmentStatus;
use tport_event_bus::{EventBus, EventBusError};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ShipmentCreated {
    pub shipment: Shipment,
}

#[derive(Debug, Clone)]
pub struct ShipmentStatusChanged {
    pub shipment: Shipment,
    pub previous: ShipmentStatus,
    pub current: ShipmentStatus,
    /// Location recorded with the change, when known
    pub location: Option<String>,
}

/// Fire and forget: a failed enqueue never fails the request that caused it.
pub(crate) fn publish<T>(events: &EventBus, tracking_id: &str, event: T)
where
    T: tport_event_bus::Event,
{
    match events.enqueue(event) {
        Ok(()) => {}
        Err(EventBusError::NoConsumer { message, .. }) => {
            debug!(%tracking_id, event = %message, "No consumer registered, event dropped");
        }
        Err(err) => warn!(%tracking_id, error = %err, "Shipment event dropped"),
    }
}
