//! Stored shipment document and the public tracking view.

use crate::status::ShipmentStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Latitude/longitude pair; either side may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl Coordinates {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat: Some(lat), lng: Some(lng) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Place {
    pub city: String,
    pub state: String,
    pub country: String,
    pub facility: String,
    pub address: String,
    pub coordinates: Coordinates,
}

impl Place {
    /// `city, state, country` with empty parts skipped.
    #[must_use]
    pub fn summary(&self) -> String {
        [&self.city, &self.state, &self.country]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PackageDetails {
    pub name: String,
    pub description: String,
    pub category: String,
    pub cost: Option<f64>,
    pub weight: Option<f64>,
    pub dimensions: String,
    pub payment_method: String,
    pub service_type: String,
    pub carrier_id: String,
    pub driver_id: String,
}

impl Default for PackageDetails {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            category: String::new(),
            cost: None,
            weight: None,
            dimensions: String::new(),
            payment_method: String::new(),
            service_type: DEFAULT_SERVICE_TYPE.to_owned(),
            carrier_id: String::new(),
            driver_id: String::new(),
        }
    }
}

pub(crate) const DEFAULT_SERVICE_TYPE: &str = "standard";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CurrentLocation {
    pub name: Option<String>,
    pub coordinates: Coordinates,
}

/// One entry of the append-only tracking history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub status: ShipmentStatus,
    pub location: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: String,
    #[serde(rename = "trackingID")]
    pub tracking_id: String,
    pub status: ShipmentStatus,
    #[serde(default, with = "timestamp::option")]
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub origin: Place,
    #[serde(default)]
    pub destination: Place,
    #[serde(default)]
    pub sender: Contact,
    #[serde(default)]
    pub receiver: Contact,
    #[serde(default)]
    pub package: PackageDetails,
    #[serde(default)]
    pub current_location: Option<CurrentLocation>,
    #[serde(default)]
    pub tracking_history: Vec<TrackingEvent>,
}

/// What the public lookup reveals about a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingView {
    pub id: String,
    #[serde(rename = "trackingID")]
    pub tracking_id: String,
    pub status: ShipmentStatus,
    #[serde(with = "timestamp::option")]
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub last_updated: DateTime<Utc>,
    pub origin: Place,
    pub destination: Place,
    pub sender: Contact,
    pub receiver: Contact,
    pub package: PackageDetails,
    pub current_location: Option<CurrentLocation>,
    pub tracking_history: Vec<TrackingEvent>,
}

impl From<Shipment> for TrackingView {
    fn from(shipment: Shipment) -> Self {
        Self {
            id: shipment.id,
            tracking_id: shipment.tracking_id,
            status: shipment.status,
            estimated_delivery_date: shipment.estimated_delivery_date,
            last_updated: shipment.last_updated,
            origin: shipment.origin,
            destination: shipment.destination,
            sender: shipment.sender,
            receiver: shipment.receiver,
            package: shipment.package,
            current_location: shipment.current_location,
            tracking_history: shipment.tracking_history,
        }
    }
}

/// Per-status counters for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusCount {
    pub status: ShipmentStatus,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ShipmentStats {
    pub total: u64,
    /// Every status, in lifecycle order, including zero counts
    pub counts: Vec<StatusCount>,
}

impl ShipmentStats {
    #[must_use]
    pub fn from_counts(found: &[StatusCount]) -> Self {
        let counts: Vec<StatusCount> = ShipmentStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: found.iter().filter(|c| c.status == status).map(|c| c.count).sum(),
            })
            .collect();
        Self { total: counts.iter().map(|c| c.count).sum(), counts }
    }

    #[must_use]
    pub fn count(&self, status: ShipmentStatus) -> u64 {
        self.counts.iter().find(|c| c.status == status).map_or(0, |c| c.count)
    }
}

/// RFC 3339 with fixed millisecond precision, so stored values sort lexically.
pub(crate) mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[must_use]
    pub(crate) fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub(crate) fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }

    pub(crate) mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub(crate) fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_str(&super::format(value)),
                None => serializer.serialize_none(),
            }
        }

        pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<DateTime<Utc>>::deserialize(deserializer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_have_fixed_precision() {
        let whole = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(timestamp::format(&whole), "2025-03-01T12:00:00.000Z");
    }

    #[test]
    fn stats_fill_missing_statuses() {
        let stats = ShipmentStats::from_counts(&[
            StatusCount { status: ShipmentStatus::InTransit, count: 3 },
            StatusCount { status: ShipmentStatus::Delivered, count: 2 },
        ]);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.counts.len(), ShipmentStatus::ALL.len());
        assert_eq!(stats.count(ShipmentStatus::InTransit), 3);
        assert_eq!(stats.count(ShipmentStatus::Pending), 0);
    }

    #[test]
    fn place_summary_skips_blanks() {
        let place = Place { city: "Lagos".into(), country: "Nigeria".into(), ..Place::default() };
        assert_eq!(place.summary(), "Lagos, Nigeria");
    }

    #[test]
    fn document_uses_wire_names() {
        let json = serde_json::json!({
            "id": "abc",
            "trackingID": "TRANSX",
            "status": "on-hold",
            "estimatedDeliveryDate": null,
            "createdAt": "2025-03-01T12:00:00.000Z",
            "lastUpdated": "2025-03-01T12:00:00.000Z",
            "trackingHistory": []
        });
        let shipment: Shipment = serde_json::from_value(json).unwrap();
        assert_eq!(shipment.status, ShipmentStatus::OnHold);
        assert_eq!(shipment.package.service_type, DEFAULT_SERVICE_TYPE);

        let back = serde_json::to_value(&shipment).unwrap();
        assert_eq!(back["trackingID"], "TRANSX");
        assert_eq!(back["package"]["serviceType"], "standard");
        assert_eq!(back["currentLocation"], serde_json::Value::Null);
    }
}
