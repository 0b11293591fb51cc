mod mailersend;
mod preview;
mod smtp;

pub use mailersend::MailerSendTransport;
pub use preview::PreviewTransport;
pub use smtp::SmtpTransport;

use crate::error::MailError;
use crate::message::MailMessage;
use std::fmt::Debug;

/// A delivery backend in the dispatcher chain.
#[async_trait::async_trait]
pub trait MailTransport: Debug + Send + Sync {
    /// Short provider name reported back to callers (`smtp`, `mailersend`, `preview`).
    fn name(&self) -> &'static str;

    /// Hands `message` to the provider. The message has already been validated.
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}
