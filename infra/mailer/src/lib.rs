//! # Mailer
//!
//! Outbound email behind a fallback chain:
//!
//! 1. [`SmtpTransport`] when host, username and password are configured.
//! 2. [`MailerSendTransport`] when an API key is configured.
//! 3. [`PreviewTransport`], which only logs and keeps recent messages in memory.
//!
//! ```rust
//! use tport_mailer::{MailDispatcher, MailMessage};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), tport_mailer::MailError> {
//! let mailer = MailDispatcher::builder().preview(10).build();
//! let delivery = mailer
//!     .send(&MailMessage::new("Hello").to("someone@example.com").text("Hi"))
//!     .await?;
//! assert_eq!(delivery.provider, "preview");
//! # Ok(())
//! # }
//! ```

mod dispatcher;
mod error;
mod message;
mod transport;

pub use dispatcher::{Delivery, MailDispatcher, MailDispatcherBuilder};
pub use error::{MailError, MailErrorExt};
pub use message::MailMessage;
pub use transport::{MailTransport, MailerSendTransport, PreviewTransport, SmtpTransport};
