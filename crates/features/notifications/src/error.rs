use std::borrow::Cow;
use tport_event_bus::EventBusError;
use tport_kernel::server::ApiError;
use tport_mailer::MailError;

#[tport_derive::tport_error]
pub enum NotificationError {
    #[error("Invalid notification request{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Mail delivery failed{}: {source}", format_context(.context))]
    Mail { source: MailError, context: Option<Cow<'static, str>> },

    #[error("Event subscription failed{}: {source}", format_context(.context))]
    Events { source: EventBusError, context: Option<Cow<'static, str>> },

    #[error("Internal notification error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<NotificationError> for ApiError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::Validation { message, context }
            | NotificationError::Mail { source: MailError::Validation { message, context }, .. } => {
                Self::BadRequest { message, context }
            }
            other => Self::Internal { message: other.to_string().into(), context: None },
        }
    }
}
