use crate::error::ShipmentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Lifecycle of a shipment. `delivered` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ShipmentStatus {
    #[default]
    Pending,
    Processing,
    InTransit,
    OutForDelivery,
    OnHold,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Processing,
        Self::InTransit,
        Self::OutForDelivery,
        Self::OnHold,
        Self::Delivered,
        Self::Cancelled,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::InTransit => "in-transit",
            Self::OutForDelivery => "out-for-delivery",
            Self::OnHold => "on-hold",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Any status may follow a non-terminal one; a terminal status may only be restated.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        !self.is_terminal() || self == next
    }

    /// # Errors
    /// [`ShipmentError::Conflict`] when leaving a terminal status.
    pub fn transition_to(self, next: Self) -> Result<Self, ShipmentError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ShipmentError::Conflict {
                message: format!("Cannot change status from {self} to {next}").into(),
                context: None,
            })
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; spaces and underscores stand in for hyphens (`"In Transit"`).
impl FromStr for ShipmentStatus {
    type Err = ShipmentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let canonical = value
            .trim()
            .chars()
            .map(|c| if c == ' ' || c == '_' { '-' } else { c.to_ascii_lowercase() })
            .collect::<String>();

        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == canonical)
            .ok_or_else(|| ShipmentError::validation(format!("Invalid status: {}", value.trim())))
    }
}
