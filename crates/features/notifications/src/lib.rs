//! Notification slice.
//!
//! Subscribes to [`ShipmentCreated`](tport_shipments::ShipmentCreated) and
//! [`ShipmentStatusChanged`](tport_shipments::ShipmentStatusChanged), renders the shipment emails
//! and sends them through the [`MailDispatcher`] chain from a background worker. Also serves the
//! admin test-email route.

mod error;
mod routes;
pub mod templates;
mod worker;

pub use error::{NotificationError, NotificationErrorExt};
pub use routes::{TestEmailRequest, TestEmailResponse, router};
pub use worker::{NotificationWorker, WorkerHandle};

use tport_domain::config::ApiConfig;
use tport_event_bus::EventBus;
use tport_kernel::domain::registry::InitializedSlice;
use tport_mailer::MailDispatcher;
use tport_shipments::{ShipmentCreated, ShipmentStatusChanged};
use tracing::{info, warn};

/// Notifications feature state
#[tport_derive::tport_slice]
pub struct Notifications {
    pub mailer: MailDispatcher,
    pub worker: WorkerHandle,
}

/// Initialize the notifications feature. Must run inside a Tokio runtime when notifications are
/// enabled, since the worker is spawned here.
///
/// # Errors
///
/// [`NotificationError::Events`] when another consumer already owns the shipment events.
pub fn init(config: &ApiConfig, events: &EventBus) -> Result<InitializedSlice, NotificationError> {
    let mailer = MailDispatcher::from_config(&config.mail);
    info!(providers = ?mailer.providers(), "Mail chain ready");

    let worker = if config.notifications.enabled {
        let capacity = config.notifications.queue_capacity;
        let created = events.consume::<ShipmentCreated>(capacity)?;
        let changed = events.consume::<ShipmentStatusChanged>(capacity)?;
        Some(NotificationWorker::new(mailer.clone(), config).spawn(created, changed))
    } else {
        warn!("Shipment notifications are disabled");
        None
    };

    let slice = Notifications::new(NotificationsInner { mailer, worker: WorkerHandle::new(worker) });
    info!("Notifications slice initialized");
    Ok(InitializedSlice::new(slice))
}
