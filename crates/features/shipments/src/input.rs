//! Request bodies. Every field is optional; missing values fall back to empty strings or null.

use crate::error::ShipmentError;
use crate::model::{Contact, Coordinates, CurrentLocation, DEFAULT_SERVICE_TYPE, PackageDetails, Place};
use crate::status::ShipmentStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use tport_derive::api_model;

#[api_model(deny_unknown_fields = false)]
#[derive(Default, Clone)]
pub struct CoordinatesInput {
    #[serde(default, deserialize_with = "lenient::number")]
    #[schema(value_type = Option<f64>)]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    #[schema(value_type = Option<f64>)]
    pub lng: Option<f64>,
}

impl From<CoordinatesInput> for Coordinates {
    fn from(input: CoordinatesInput) -> Self {
        Self { lat: input.lat, lng: input.lng }
    }
}

#[api_model(deny_unknown_fields = false)]
#[derive(Default, Clone)]
pub struct PlaceInput {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub facility: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<CoordinatesInput>,
}

impl From<PlaceInput> for Place {
    fn from(input: PlaceInput) -> Self {
        Self {
            city: input.city.unwrap_or_default(),
            state: input.state.unwrap_or_default(),
            country: input.country.unwrap_or_default(),
            facility: input.facility.unwrap_or_default(),
            address: input.address.unwrap_or_default(),
            coordinates: input.coordinates.map(Into::into).unwrap_or_default(),
        }
    }
}

#[api_model(deny_unknown_fields = false)]
#[derive(Default, Clone)]
pub struct ContactInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl From<ContactInput> for Contact {
    fn from(input: ContactInput) -> Self {
        Self {
            name: input.name.unwrap_or_default(),
            email: input.email.map(|email| email.trim().to_owned()).unwrap_or_default(),
            phone: input.phone.unwrap_or_default(),
            address: input.address.unwrap_or_default(),
        }
    }
}

#[api_model(deny_unknown_fields = false)]
#[derive(Default, Clone)]
pub struct PackageInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    #[schema(value_type = Option<f64>)]
    pub cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    #[schema(value_type = Option<f64>)]
    pub weight: Option<f64>,
    pub dimensions: Option<String>,
    pub payment_method: Option<String>,
    pub service_type: Option<String>,
    pub carrier_id: Option<String>,
    pub driver_id: Option<String>,
}

impl PackageInput {
    /// Fields set on `self` win over `fallback`; blanks count as unset.
    fn or(self, fallback: Self) -> Self {
        fn pick(preferred: Option<String>, fallback: Option<String>) -> Option<String> {
            preferred.filter(|v| !v.trim().is_empty()).or(fallback)
        }
        Self {
            name: pick(self.name, fallback.name),
            description: pick(self.description, fallback.description),
            category: pick(self.category, fallback.category),
            cost: self.cost.or(fallback.cost),
            weight: self.weight.or(fallback.weight),
            dimensions: pick(self.dimensions, fallback.dimensions),
            payment_method: pick(self.payment_method, fallback.payment_method),
            service_type: pick(self.service_type, fallback.service_type),
            carrier_id: pick(self.carrier_id, fallback.carrier_id),
            driver_id: pick(self.driver_id, fallback.driver_id),
        }
    }
}

impl From<PackageInput> for PackageDetails {
    fn from(input: PackageInput) -> Self {
        Self {
            name: input.name.unwrap_or_default(),
            description: input.description.unwrap_or_default(),
            category: input.category.unwrap_or_default(),
            cost: input.cost,
            weight: input.weight,
            dimensions: input.dimensions.unwrap_or_default(),
            payment_method: input.payment_method.unwrap_or_default(),
            service_type: input
                .service_type
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SERVICE_TYPE.to_owned()),
            carrier_id: input.carrier_id.unwrap_or_default(),
            driver_id: input.driver_id.unwrap_or_default(),
        }
    }
}

#[api_model(deny_unknown_fields = false)]
#[derive(Default, Clone)]
pub struct CurrentLocationInput {
    pub name: Option<String>,
    pub coordinates: Option<CoordinatesInput>,
}

impl From<CurrentLocationInput> for CurrentLocation {
    fn from(input: CurrentLocationInput) -> Self {
        Self {
            name: input.name.filter(|name| !name.trim().is_empty()),
            coordinates: input.coordinates.map(Into::into).unwrap_or_default(),
        }
    }
}

/// Create payload. Package fields may also be sent flattened (`packageName`, `cost`, ...);
/// flattened values win over the nested `package` object.
#[api_model(deny_unknown_fields = false)]
#[derive(Default, Clone)]
pub struct CreateShipmentRequest {
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    pub origin: Option<PlaceInput>,
    pub destination: Option<PlaceInput>,
    pub sender: Option<ContactInput>,
    pub receiver: Option<ContactInput>,
    pub package: Option<PackageInput>,

    pub package_name: Option<String>,
    pub package_description: Option<String>,
    pub package_category: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    #[schema(value_type = Option<f64>)]
    pub cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    #[schema(value_type = Option<f64>)]
    pub weight: Option<f64>,
    pub dimensions: Option<String>,
    pub payment_method: Option<String>,
    pub service_type: Option<String>,
    pub carrier_id: Option<String>,
    pub driver_id: Option<String>,
}

impl CreateShipmentRequest {
    /// # Errors
    /// [`ShipmentError::Validation`] for an unknown status.
    pub fn initial_status(&self) -> Result<ShipmentStatus, ShipmentError> {
        self.status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map_or(Ok(ShipmentStatus::default()), str::parse)
    }

    /// Merges flattened and nested package fields.
    pub fn package_details(&mut self) -> PackageDetails {
        let flattened = PackageInput {
            name: self.package_name.take(),
            description: self.package_description.take(),
            category: self.package_category.take(),
            cost: self.cost.take(),
            weight: self.weight.take(),
            dimensions: self.dimensions.take(),
            payment_method: self.payment_method.take(),
            service_type: self.service_type.take(),
            carrier_id: self.carrier_id.take(),
            driver_id: self.driver_id.take(),
        };
        flattened.or(self.package.take().unwrap_or_default()).into()
    }
}

/// Partial update; only present fields change. Sub-objects are replaced whole.
#[api_model(deny_unknown_fields = false)]
#[derive(Default, Clone)]
pub struct UpdateShipmentRequest {
    pub status: Option<String>,
    /// History note for a status change
    pub notes: Option<String>,
    /// History coordinates for a status change
    pub current_coordinates: Option<CoordinatesInput>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    pub origin: Option<PlaceInput>,
    pub destination: Option<PlaceInput>,
    pub sender: Option<ContactInput>,
    pub receiver: Option<ContactInput>,
    pub package: Option<PackageInput>,
    pub current_location: Option<CurrentLocationInput>,
}

impl UpdateShipmentRequest {
    /// # Errors
    /// [`ShipmentError::Validation`] for an unknown status.
    pub fn requested_status(&self) -> Result<Option<ShipmentStatus>, ShipmentError> {
        self.status.as_deref().filter(|s| !s.trim().is_empty()).map(str::parse).transpose()
    }
}

#[api_model(deny_unknown_fields = false)]
pub struct LocationUpdateRequest {
    #[schema(value_type = f64)]
    pub lat: Option<serde_json::Value>,
    #[schema(value_type = f64)]
    pub lng: Option<serde_json::Value>,
    pub location_name: Option<String>,
}

impl LocationUpdateRequest {
    /// Both values must be JSON numbers within geographic range.
    ///
    /// # Errors
    /// [`ShipmentError::Validation`] otherwise.
    pub fn coordinates(&self) -> Result<(f64, f64), ShipmentError> {
        let number = |value: &Option<serde_json::Value>| value.as_ref().and_then(serde_json::Value::as_f64);
        match (number(&self.lat), number(&self.lng)) {
            (Some(lat), Some(lng)) if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) => {
                Ok((lat, lng))
            }
            _ => Err(ShipmentError::validation("lat and lng are required numbers")),
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.location_name.as_deref().map(str::trim).filter(|name| !name.is_empty())
    }
}

#[api_model(deny_unknown_fields = false)]
#[derive(Default, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListShipmentsQuery {
    /// Only shipments with this status
    pub status: Option<String>,
}

/// Deserializers for form-style input where numbers arrive as strings and blanks mean unset.
mod lenient {
    use super::{DateTime, Deserialize, Deserializer, NaiveDate, Utc};
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    pub(super) fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Option::<NumberOrText>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrText::Number(n)) => Ok(Some(n)),
            Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(NumberOrText::Text(text)) => {
                text.trim().parse().map(Some).map_err(|_| D::Error::custom(format!("'{text}' is not a number")))
            }
        }
    }

    /// RFC 3339 or a plain `YYYY-MM-DD` date (midnight UTC).
    pub(super) fn datetime<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some(text) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
            return Ok(Some(parsed.with_timezone(&Utc)));
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Some(naive.and_utc()))
            .ok_or_else(|| D::Error::custom(format!("'{text}' is not a date")))
    }
}
