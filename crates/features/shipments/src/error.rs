use std::borrow::Cow;
use tport_kernel::server::ApiError;

#[tport_derive::tport_error]
pub enum ShipmentError {
    #[error("Shipment not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid shipment data{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Status transition not allowed from the stored status.
    #[error("Shipment conflict{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Shipment storage error{}: {source}", format_context(.context))]
    Database { source: surrealdb::Error, context: Option<Cow<'static, str>> },

    #[error("Shipment serialization error{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Internal shipment error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ShipmentError {
    pub(crate) fn not_found() -> Self {
        Self::NotFound { message: "Shipment not found".into(), context: None }
    }

    pub(crate) fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }
}

impl From<ShipmentError> for ApiError {
    fn from(err: ShipmentError) -> Self {
        match err {
            ShipmentError::NotFound { message, context } => Self::NotFound { message, context },
            ShipmentError::Validation { message, context } => Self::BadRequest { message, context },
            ShipmentError::Conflict { message, context } => Self::Conflict { message, context },
            other => Self::Internal { message: other.to_string().into(), context: None },
        }
    }
}
