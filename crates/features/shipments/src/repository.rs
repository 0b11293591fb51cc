//! `SurrealDB` access for the `shipment` table.
//!
//! Record ids never leave this module: reads project `meta::id(id) AS id`, so documents
//! deserialize straight into [`Shipment`] with the bare key as `id`.

use crate::error::{ShipmentError, ShipmentErrorExt};
use crate::model::{Shipment, StatusCount, TrackingEvent, timestamp};
use crate::status::ShipmentStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write as _;
use tport_database::Database;
use tport_domain::constants::SHIPMENT_TABLE;
use tracing::instrument;

const SELECT: &str = "SELECT *, meta::id(id) AS id";

/// Field assignments for one `UPDATE`. Field names are fixed by the callers, values are bound.
#[derive(Debug, Default)]
pub(crate) struct ShipmentPatch {
    fields: Vec<(&'static str, Value)>,
    entry: Option<TrackingEvent>,
    expected: Option<ShipmentStatus>,
}

impl ShipmentPatch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(mut self, field: &'static str, value: impl Serialize) -> Result<Self, ShipmentError> {
        let value = serde_json::to_value(value).context(field)?;
        self.fields.retain(|(existing, _)| *existing != field);
        self.fields.push((field, value));
        Ok(self)
    }

    /// Appends one entry to `trackingHistory` in the same statement.
    pub(crate) fn append(mut self, entry: TrackingEvent) -> Self {
        self.entry = Some(entry);
        self
    }

    /// Only applies while the stored status still equals `status`.
    pub(crate) const fn expect_status(mut self, status: ShipmentStatus) -> Self {
        self.expected = Some(status);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ShipmentRepository {
    db: Database,
}

impl ShipmentRepository {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Stores a new document under `shipment.id`.
    ///
    /// # Errors
    /// Storage errors, including a duplicate `trackingID`.
    #[instrument(skip_all, fields(id = %shipment.id, tracking_id = %shipment.tracking_id))]
    pub async fn insert(&self, shipment: &Shipment) -> Result<(), ShipmentError> {
        let mut document = serde_json::to_value(shipment).context("Encoding shipment")?;
        if let Value::Object(fields) = &mut document {
            fields.remove("id");
        }

        self.db
            .query("CREATE type::thing($table, $key) CONTENT $doc RETURN NONE")
            .bind(("table", SHIPMENT_TABLE))
            .bind(("key", shipment.id.clone()))
            .bind(("doc", document))
            .await
            .and_then(surrealdb::Response::check)
            .context("Creating shipment")?;
        Ok(())
    }

    /// Newest first, optionally restricted to one status.
    ///
    /// # Errors
    /// Storage errors.
    pub async fn list(&self, status: Option<ShipmentStatus>) -> Result<Vec<Shipment>, ShipmentError> {
        let query = match status {
            Some(_) => format!(
                "{SELECT} FROM type::table($table) WHERE status = $status ORDER BY createdAt DESC"
            ),
            None => format!("{SELECT} FROM type::table($table) ORDER BY createdAt DESC"),
        };

        self.db
            .query(query)
            .bind(("table", SHIPMENT_TABLE))
            .bind(("status", status.map(ShipmentStatus::as_str)))
            .await
            .context("Listing shipments")?
            .take(0)
            .context("Decoding shipments")
    }

    /// # Errors
    /// Storage errors.
    pub async fn find(&self, id: &str) -> Result<Option<Shipment>, ShipmentError> {
        self.db
            .query(format!("{SELECT} FROM type::thing($table, $key)"))
            .bind(("table", SHIPMENT_TABLE))
            .bind(("key", id.to_owned()))
            .await
            .context("Loading shipment")?
            .take(0)
            .context("Decoding shipment")
    }

    /// Exact match on the stored (upper-case) tracking id.
    ///
    /// # Errors
    /// Storage errors.
    pub async fn find_by_tracking_id(&self, tracking_id: &str) -> Result<Option<Shipment>, ShipmentError> {
        self.db
            .query(format!("{SELECT} FROM type::table($table) WHERE trackingID = $tracking_id LIMIT 1"))
            .bind(("table", SHIPMENT_TABLE))
            .bind(("tracking_id", tracking_id.to_owned()))
            .await
            .context("Looking up tracking id")?
            .take(0)
            .context("Decoding shipment")
    }

    /// Applies `patch` and refreshes `lastUpdated`. Returns `false` when no record matched,
    /// either because it does not exist or because the expected status no longer holds.
    ///
    /// # Errors
    /// Storage errors.
    #[instrument(skip(self, patch), fields(fields = patch.fields.len()))]
    pub(crate) async fn apply(
        &self,
        id: &str,
        patch: ShipmentPatch,
        now: DateTime<Utc>,
    ) -> Result<bool, ShipmentError> {
        let mut assignments = String::from("lastUpdated = $now");
        for (index, (field, _)) in patch.fields.iter().enumerate() {
            let _ = write!(assignments, ", {field} = $p{index}");
        }
        if patch.entry.is_some() {
            assignments.push_str(", trackingHistory += $entry");
        }
        let condition = if patch.expected.is_some() { "status = $expected" } else { "trackingID != NONE" };

        let query = format!(
            "LET $matched = (UPDATE type::thing($table, $key) SET {assignments} WHERE {condition} RETURN AFTER);
            RETURN array::len($matched);"
        );

        let mut request = self
            .db
            .query(query)
            .bind(("table", SHIPMENT_TABLE))
            .bind(("key", id.to_owned()))
            .bind(("now", timestamp::format(&now)))
            .bind(("expected", patch.expected.map(ShipmentStatus::as_str)));
        if let Some(entry) = patch.entry {
            request = request.bind(("entry", serde_json::to_value(entry).context("Encoding history entry")?));
        }
        for (index, (_, value)) in patch.fields.into_iter().enumerate() {
            request = request.bind((format!("p{index}"), value));
        }

        let matched: Option<usize> = request
            .await
            .and_then(surrealdb::Response::check)
            .context("Updating shipment")?
            .take(1)
            .context("Reading update result")?;
        Ok(matched.unwrap_or_default() > 0)
    }

    /// Sets `currentLocation` and appends a history entry carrying the status stored at that
    /// moment, in one statement.
    ///
    /// # Errors
    /// Storage errors.
    pub(crate) async fn record_location(
        &self,
        id: &str,
        name: &str,
        location: Value,
        coordinates: Value,
        now: DateTime<Utc>,
    ) -> Result<bool, ShipmentError> {
        let query = "LET $matched = (UPDATE type::thing($table, $key) SET
                currentLocation = $location,
                lastUpdated = $now,
                trackingHistory += {
                    status: status,
                    location: $name,
                    timestamp: $now,
                    coordinates: $coordinates,
                    notes: 'Location updated'
                }
            WHERE trackingID != NONE RETURN AFTER);
            RETURN array::len($matched);";

        let matched: Option<usize> = self
            .db
            .query(query)
            .bind(("table", SHIPMENT_TABLE))
            .bind(("key", id.to_owned()))
            .bind(("location", location))
            .bind(("coordinates", coordinates))
            .bind(("name", name.to_owned()))
            .bind(("now", timestamp::format(&now)))
            .await
            .and_then(surrealdb::Response::check)
            .context("Recording location")?
            .take(1)
            .context("Reading update result")?;
        Ok(matched.unwrap_or_default() > 0)
    }

    /// Returns `false` when nothing was deleted.
    ///
    /// # Errors
    /// Storage errors.
    pub async fn delete(&self, id: &str) -> Result<bool, ShipmentError> {
        let deleted: Option<usize> = self
            .db
            .query(
                "LET $deleted = (DELETE type::thing($table, $key) RETURN BEFORE);
                RETURN array::len($deleted);",
            )
            .bind(("table", SHIPMENT_TABLE))
            .bind(("key", id.to_owned()))
            .await
            .and_then(surrealdb::Response::check)
            .context("Deleting shipment")?
            .take(1)
            .context("Reading delete result")?;
        Ok(deleted.unwrap_or_default() > 0)
    }

    /// # Errors
    /// Storage errors.
    pub async fn count_by_status(&self) -> Result<Vec<StatusCount>, ShipmentError> {
        self.db
            .query("SELECT status, count() AS count FROM type::table($table) GROUP BY status")
            .bind(("table", SHIPMENT_TABLE))
            .await
            .context("Counting shipments")?
            .take(0)
            .context("Decoding counts")
    }
}

/// Optimistic transaction conflicts reported by the storage engine are safe to retry.
pub(crate) fn is_retryable(err: &ShipmentError) -> bool {
    matches!(err, ShipmentError::Database { source, .. } if source.to_string().contains("retried"))
}
