//! Shipment slice.
//!
//! Owns the `shipment` table: document model, status state machine, repository, the admin
//! management API and the public tracking lookup. Writes publish [`ShipmentCreated`] and
//! [`ShipmentStatusChanged`] on the event bus.

mod error;
mod events;
mod input;
mod model;
mod repository;
mod routes;
mod service;
mod status;

pub use error::{ShipmentError, ShipmentErrorExt};
pub use events::{ShipmentCreated, ShipmentStatusChanged};
pub use input::{
    ContactInput, CoordinatesInput, CreateShipmentRequest, CurrentLocationInput, ListShipmentsQuery,
    LocationUpdateRequest, PackageInput, PlaceInput, UpdateShipmentRequest,
};
pub use model::{
    Contact, Coordinates, CurrentLocation, PackageDetails, Place, Shipment, ShipmentStats, StatusCount,
    TrackingEvent, TrackingView,
};
pub use repository::ShipmentRepository;
pub use routes::{admin_router, public_router};
pub use service::ShipmentService;
pub use status::ShipmentStatus;

use tport_database::{Database, Migration};
use tport_event_bus::EventBus;
use tport_kernel::domain::registry::InitializedSlice;
use tracing::info;

pub const MIGRATIONS: &[Migration] =
    &[Migration::new("shipments", "0001_init", include_str!("../migrations/0001_init.surql"))];

/// Shipments feature state
#[tport_derive::tport_slice]
pub struct Shipments {
    pub service: ShipmentService,
}

/// Initialize the shipments feature. Run [`MIGRATIONS`] on `database` first.
#[must_use]
pub fn init(database: Database, events: EventBus) -> InitializedSlice {
    let service = ShipmentService::new(ShipmentRepository::new(database), events);
    info!("Shipments slice initialized");
    InitializedSlice::new(Shipments::new(ShipmentsInner { service }))
}
