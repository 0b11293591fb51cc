use crate::templates::{self, EmailContent};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tport_domain::config::ApiConfig;
use tport_domain::recipients::RecipientSet;
use tport_event_bus::EventReceiver;
use tport_mailer::{MailDispatcher, MailMessage};
use tport_shipments::{Contact, Shipment, ShipmentCreated, ShipmentStatusChanged};
use tracing::{debug, info, instrument, warn};

/// Turns shipment events into emails for the configured recipients.
#[derive(Debug, Clone)]
pub struct NotificationWorker {
    mailer: MailDispatcher,
    notify: RecipientSet,
    base_url: Arc<str>,
}

impl NotificationWorker {
    #[must_use]
    pub fn new(mailer: MailDispatcher, config: &ApiConfig) -> Self {
        Self {
            mailer,
            notify: config.notifications.notify,
            base_url: Arc::from(config.tracking.base_url.as_str()),
        }
    }

    /// Drains both queues until the bus is shut down.
    pub fn spawn(
        self,
        mut created: EventReceiver<ShipmentCreated>,
        mut changed: EventReceiver<ShipmentStatusChanged>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let (mut created_open, mut changed_open) = (true, true);
            while created_open || changed_open {
                tokio::select! {
                    event = created.recv(), if created_open => match event {
                        Some(event) => { self.shipment_created(&event).await; }
                        None => created_open = false,
                    },
                    event = changed.recv(), if changed_open => match event {
                        Some(event) => { self.status_changed(&event).await; }
                        None => changed_open = false,
                    },
                }
            }
            debug!("Notification worker stopped");
        })
    }

    /// Returns how many recipients accepted the email.
    #[instrument(skip_all, fields(tracking_id = %event.shipment.tracking_id))]
    pub async fn shipment_created(&self, event: &ShipmentCreated) -> usize {
        let content = templates::shipment_created(&event.shipment, &self.base_url);
        let mut sent = 0;
        for contact in recipients(&event.shipment, self.notify) {
            sent += usize::from(self.deliver(&contact.email, &content).await);
        }
        sent
    }

    /// Returns how many recipients accepted the email.
    #[instrument(skip_all, fields(tracking_id = %event.shipment.tracking_id, status = %event.current))]
    pub async fn status_changed(&self, event: &ShipmentStatusChanged) -> usize {
        let mut sent = 0;
        for contact in recipients(&event.shipment, self.notify) {
            let content = templates::status_changed(event, contact, &self.base_url);
            sent += usize::from(self.deliver(&contact.email, &content).await);
        }
        sent
    }

    async fn deliver(&self, to: &str, content: &EmailContent) -> bool {
        let message = MailMessage::new(content.subject.as_str())
            .to(to)
            .text(content.text.as_str())
            .html(content.html.as_str());
        match self.mailer.send(&message).await {
            Ok(delivery) => {
                info!(provider = delivery.provider, "Notification sent");
                true
            }
            Err(err) => {
                warn!(error = %err, "Notification not delivered");
                false
            }
        }
    }
}

/// Contacts selected by `notify` that have an address, without duplicate addresses.
fn recipients(shipment: &Shipment, notify: RecipientSet) -> Vec<&Contact> {
    let mut selected: Vec<&Contact> = Vec::with_capacity(2);
    let candidates = [
        (RecipientSet::RECEIVER, &shipment.receiver),
        (RecipientSet::SENDER, &shipment.sender),
    ];
    for (role, contact) in candidates {
        let address = contact.email.trim();
        if !notify.contains(role) || address.is_empty() {
            continue;
        }
        if selected.iter().any(|c| c.email.trim().eq_ignore_ascii_case(address)) {
            continue;
        }
        selected.push(contact);
    }
    selected
}

/// Handle to the spawned worker so shutdown can wait for queued mail.
#[derive(Debug, Default)]
pub struct WorkerHandle {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl WorkerHandle {
    pub(crate) fn new(task: Option<JoinHandle<()>>) -> Self {
        Self { task: Mutex::new(task) }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.lock().as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Waits up to `timeout` for the worker to finish; call after the event bus is shut down.
    /// Returns `false` when the worker had to be abandoned.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let Some(task) = self.task.lock().take() else {
            return true;
        };
        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!(error = %err, "Notification worker failed");
                false
            }
            Err(_) => {
                warn!(?timeout, "Notification worker still busy, abandoning queued mail");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tport_shipments::ShipmentStatus;

    fn shipment(receiver: &str, sender: &str) -> Shipment {
        serde_json::from_value(serde_json::json!({
            "id": "abc",
            "trackingID": "TRANSX",
            "status": ShipmentStatus::Pending,
            "createdAt": "2025-03-01T12:00:00.000Z",
            "lastUpdated": "2025-03-01T12:00:00.000Z",
            "receiver": {"email": receiver},
            "sender": {"email": sender},
        }))
        .unwrap()
    }

    fn emails(shipment: &Shipment, notify: RecipientSet) -> Vec<&str> {
        recipients(shipment, notify).into_iter().map(|c| c.email.as_str()).collect()
    }

    #[test]
    fn default_notifies_only_the_receiver() {
        let shipment = shipment("r@example.com", "s@example.com");
        assert_eq!(emails(&shipment, RecipientSet::default()), ["r@example.com"]);
        assert_eq!(emails(&shipment, RecipientSet::ALL), ["r@example.com", "s@example.com"]);
        assert_eq!(emails(&shipment, RecipientSet::SENDER), ["s@example.com"]);
    }

    #[test]
    fn empty_and_duplicate_addresses_are_skipped() {
        assert!(emails(&shipment("", "s@example.com"), RecipientSet::RECEIVER).is_empty());
        assert_eq!(emails(&shipment("a@example.com", "A@example.com"), RecipientSet::ALL), ["a@example.com"]);
    }
}
