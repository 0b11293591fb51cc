use crate::error::ShipmentError;
use crate::events::{ShipmentCreated, ShipmentStatusChanged, publish};
use crate::input::{CreateShipmentRequest, LocationUpdateRequest, UpdateShipmentRequest};
use crate::model::{
    Contact, Coordinates, CurrentLocation, PackageDetails, Place, Shipment, ShipmentStats, TrackingEvent,
    TrackingView, timestamp,
};
use crate::repository::{ShipmentPatch, ShipmentRepository, is_retryable};
use crate::status::ShipmentStatus;
use chrono::{DateTime, SubsecRound, Utc};
use tport_domain::constants::SHIPMENT_TABLE;
use tport_event_bus::EventBus;
use tport_kernel::security::ResourceGuard;
use tport_kernel::{safe_nanoid, tracking};
use tracing::{debug, info, instrument};

/// How often a status change re-reads and retries when the stored status moved underneath it.
const WRITE_ATTEMPTS: u32 = 3;

/// Shipment use cases on top of the repository; publishes events after successful writes.
#[derive(Debug, Clone)]
pub struct ShipmentService {
    repo: ShipmentRepository,
    events: EventBus,
}

impl ShipmentService {
    #[must_use]
    pub const fn new(repo: ShipmentRepository, events: EventBus) -> Self {
        Self { repo, events }
    }

    #[must_use]
    pub const fn repository(&self) -> &ShipmentRepository {
        &self.repo
    }

    /// # Errors
    /// [`ShipmentError::Validation`] for an unknown status filter, storage errors otherwise.
    pub async fn list(&self, status: Option<&str>) -> Result<Vec<Shipment>, ShipmentError> {
        let status = status.filter(|s| !s.trim().is_empty()).map(str::parse).transpose()?;
        self.repo.list(status).await
    }

    /// # Errors
    /// Storage errors.
    pub async fn stats(&self) -> Result<ShipmentStats, ShipmentError> {
        Ok(ShipmentStats::from_counts(&self.repo.count_by_status().await?))
    }

    /// # Errors
    /// [`ShipmentError::NotFound`] for unknown or malformed ids.
    pub async fn get(&self, id: &str) -> Result<Shipment, ShipmentError> {
        self.repo.find(&record_key(id)?).await?.ok_or_else(ShipmentError::not_found)
    }

    /// Public lookup; the id is matched case-insensitively.
    ///
    /// # Errors
    /// [`ShipmentError::NotFound`] with `Tracking ID not found`.
    pub async fn track(&self, tracking_id: &str) -> Result<TrackingView, ShipmentError> {
        let normalized = tracking::normalize(tracking_id);
        self.repo
            .find_by_tracking_id(&normalized)
            .await?
            .map(TrackingView::from)
            .ok_or_else(|| ShipmentError::NotFound { message: "Tracking ID not found".into(), context: None })
    }

    /// # Errors
    /// [`ShipmentError::Validation`] for an unknown status, storage errors otherwise.
    #[instrument(skip_all)]
    pub async fn create(&self, mut request: CreateShipmentRequest) -> Result<Shipment, ShipmentError> {
        let status = request.initial_status()?;
        let package = request.package_details();
        let origin: Place = request.origin.take().unwrap_or_default().into();
        let now = now();

        let first_entry = TrackingEvent {
            status,
            location: non_empty(&origin.city).unwrap_or("Origin").to_owned(),
            timestamp: now,
            coordinates: Some(origin.coordinates),
            notes: "Shipment created".to_owned(),
        };

        let shipment = Shipment {
            id: safe_nanoid!(),
            tracking_id: tracking::generate_tracking_id(),
            status,
            estimated_delivery_date: request.estimated_delivery_date,
            created_at: now,
            last_updated: now,
            origin,
            destination: request.destination.take().unwrap_or_default().into(),
            sender: request.sender.take().unwrap_or_default().into(),
            receiver: request.receiver.take().unwrap_or_default().into(),
            package,
            current_location: None,
            tracking_history: vec![first_entry],
        };

        self.repo.insert(&shipment).await?;
        info!(id = %shipment.id, tracking_id = %shipment.tracking_id, %status, "Shipment created");

        publish(&self.events, &shipment.tracking_id, ShipmentCreated { shipment: shipment.clone() });
        Ok(shipment)
    }

    /// Partial update. A requested status goes through the state machine, appends one history
    /// entry and is applied only while the status it was validated against is still stored.
    ///
    /// # Errors
    /// * [`ShipmentError::NotFound`] when the shipment does not exist.
    /// * [`ShipmentError::Validation`] for an unknown status.
    /// * [`ShipmentError::Conflict`] when leaving a terminal status, or when the status kept
    ///   changing concurrently.
    #[instrument(skip(self, request))]
    pub async fn update(&self, id: &str, request: UpdateShipmentRequest) -> Result<Shipment, ShipmentError> {
        let key = record_key(id)?;
        let requested = request.requested_status()?;

        for attempt in 1..=WRITE_ATTEMPTS {
            let current = self.repo.find(&key).await?.ok_or_else(ShipmentError::not_found)?;
            let now = now();
            let mut patch = editable_fields(&request)?;
            let mut change = None;

            if let Some(requested) = requested {
                let next = current.status.transition_to(requested)?;
                let entry = status_entry(&request, &current, next, now);
                change = Some((current.status, next, entry.location.clone()));
                patch = patch.set("status", next)?.append(entry).expect_status(current.status);
            }

            match self.repo.apply(&key, patch, now).await {
                Ok(true) => {
                    let updated = self.repo.find(&key).await?.ok_or_else(ShipmentError::not_found)?;
                    if let Some((previous, next, location)) = change {
                        info!(tracking_id = %updated.tracking_id, %previous, current = %next, "Shipment status changed");
                        publish(
                            &self.events,
                            &updated.tracking_id,
                            ShipmentStatusChanged {
                                shipment: updated.clone(),
                                previous,
                                current: next,
                                location: Some(location),
                            },
                        );
                    }
                    return Ok(updated);
                }
                Ok(false) if change.is_none() => return Err(ShipmentError::not_found()),
                Ok(false) => debug!(attempt, "Status changed concurrently, re-validating"),
                Err(err) if is_retryable(&err) => debug!(attempt, error = %err, "Write conflict, retrying"),
                Err(err) => return Err(err),
            }
        }

        Err(concurrent_modification())
    }

    /// Moves the shipment to `{lat, lng}` and records the move in its history.
    ///
    /// # Errors
    /// * [`ShipmentError::Validation`] for missing or out-of-range coordinates.
    /// * [`ShipmentError::NotFound`] for unknown shipments.
    /// * [`ShipmentError::Conflict`] when write conflicts persist across every attempt.
    #[instrument(skip(self, request))]
    pub async fn update_location(
        &self,
        id: &str,
        request: &LocationUpdateRequest,
    ) -> Result<Shipment, ShipmentError> {
        let (lat, lng) = request.coordinates()?;
        let key = record_key(id)?;
        let coordinates = Coordinates::new(lat, lng);
        let location = CurrentLocation { name: request.name().map(str::to_owned), coordinates };

        let name = request.name().unwrap_or("Current Location");
        let location = serde_json::to_value(&location)?;
        let coordinates = serde_json::to_value(coordinates)?;

        for attempt in 1..=WRITE_ATTEMPTS {
            match self.repo.record_location(&key, name, location.clone(), coordinates.clone(), now()).await {
                Ok(true) => {
                    debug!(lat, lng, "Shipment location recorded");
                    return self.get(&key).await;
                }
                Ok(false) => return Err(ShipmentError::not_found()),
                Err(err) if is_retryable(&err) => debug!(attempt, error = %err, "Write conflict, retrying"),
                Err(err) => return Err(err),
            }
        }

        Err(concurrent_modification())
    }

    /// # Errors
    /// [`ShipmentError::NotFound`] when nothing was deleted.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ShipmentError> {
        if self.repo.delete(&record_key(id)?).await? {
            info!("Shipment deleted");
            Ok(())
        } else {
            Err(ShipmentError::not_found())
        }
    }
}

/// Stored timestamps carry millisecond precision; keep in-memory values identical.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn concurrent_modification() -> ShipmentError {
    ShipmentError::Conflict { message: "Shipment was modified concurrently, please retry".into(), context: None }
}

fn record_key(id: &str) -> Result<String, ShipmentError> {
    ResourceGuard::verify(id, SHIPMENT_TABLE).map_err(|_| ShipmentError::not_found())
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|v| !v.is_empty())
}

/// Everything in the request except the status, which needs the state machine.
fn editable_fields(request: &UpdateShipmentRequest) -> Result<ShipmentPatch, ShipmentError> {
    let mut patch = ShipmentPatch::new();
    if let Some(date) = request.estimated_delivery_date {
        patch = patch.set("estimatedDeliveryDate", timestamp::format(&date))?;
    }
    if let Some(origin) = &request.origin {
        patch = patch.set("origin", Place::from(origin.clone()))?;
    }
    if let Some(destination) = &request.destination {
        patch = patch.set("destination", Place::from(destination.clone()))?;
    }
    if let Some(sender) = &request.sender {
        patch = patch.set("sender", Contact::from(sender.clone()))?;
    }
    if let Some(receiver) = &request.receiver {
        patch = patch.set("receiver", Contact::from(receiver.clone()))?;
    }
    if let Some(package) = &request.package {
        patch = patch.set("package", PackageDetails::from(package.clone()))?;
    }
    if let Some(location) = &request.current_location {
        patch = patch.set("currentLocation", CurrentLocation::from(location.clone()))?;
    }
    Ok(patch)
}

fn status_entry(
    request: &UpdateShipmentRequest,
    current: &Shipment,
    status: ShipmentStatus,
    now: DateTime<Utc>,
) -> TrackingEvent {
    let requested_location = request.current_location.as_ref();
    let location = requested_location
        .and_then(|l| l.name.as_deref())
        .and_then(non_empty)
        .or_else(|| current.current_location.as_ref().and_then(|l| l.name.as_deref()).and_then(non_empty))
        .unwrap_or("Unknown")
        .to_owned();
    let coordinates = request
        .current_coordinates
        .clone()
        .or_else(|| requested_location.and_then(|l| l.coordinates.clone()))
        .map(Coordinates::from);
    let notes = request
        .notes
        .as_deref()
        .and_then(non_empty)
        .map_or_else(|| format!("Status changed to {status}"), str::to_owned);

    TrackingEvent { status, location, timestamp: now, coordinates, notes }
}
