use super::MailTransport;
use crate::error::{MailError, MailErrorExt};
use crate::message::MailMessage;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tport_domain::config::SmtpConfig;
use tracing::debug;

const TIMEOUT: Duration = Duration::from_secs(15);

/// Authenticated SMTP relay; implicit TLS when `secure`, STARTTLS otherwise.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    relay: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpTransport {
    /// # Errors
    /// Fails on an unusable host name or sender address.
    pub fn new(config: &SmtpConfig, from: &str) -> Result<Self, MailError> {
        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .context("Configuring SMTP relay")?;

        let relay = builder
            .port(config.port)
            .credentials(Credentials::new(config.username.clone(), config.password.clone()))
            .timeout(Some(TIMEOUT))
            .build();

        Ok(Self { relay, from: from.parse().context("SMTP sender")? })
    }

    fn build(&self, message: &MailMessage) -> Result<Message, MailError> {
        let mut builder = Message::builder().from(self.from.clone()).subject(&message.subject);
        for to in message.recipients() {
            builder = builder.to(to.parse::<Mailbox>().context(to.to_owned())?);
        }

        let body = match (&message.text, &message.html) {
            (Some(text), Some(html)) => {
                builder.multipart(MultiPart::alternative_plain_html(text.clone(), html.clone()))
            }
            (None, Some(html)) => builder.singlepart(SinglePart::html(html.clone())),
            (Some(text), None) => builder.singlepart(SinglePart::plain(text.clone())),
            (None, None) => return Err("message has no body".into()),
        };
        body.context("Building SMTP message")
    }
}

#[async_trait::async_trait]
impl MailTransport for SmtpTransport {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let email = self.build(message)?;
        let response = self.relay.send(email).await.context("Sending via SMTP")?;
        debug!(code = %response.code(), "SMTP relay accepted message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> SmtpTransport {
        let config = SmtpConfig {
            host: "smtp.example.com".to_owned(),
            username: "user".to_owned(),
            password: "pass".to_owned(),
            ..SmtpConfig::default()
        };
        SmtpTransport::new(&config, "Transportify <no-reply@transportify.com>").unwrap()
    }

    #[test]
    fn builds_alternative_body() {
        let message = MailMessage::new("Shipment Created: TRANS1").to("a@example.com").text("t").html("<b>h</b>");
        let raw = String::from_utf8(transport().build(&message).unwrap().formatted()).unwrap();

        assert!(raw.contains("Subject: Shipment Created: TRANS1"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("To: a@example.com"));
    }

    #[test]
    fn rejects_malformed_recipient() {
        let message = MailMessage::new("s").to("not an address").text("t");
        assert!(matches!(transport().build(&message), Err(MailError::Address { .. })));
    }

    #[test]
    fn rejects_malformed_sender() {
        let err = SmtpTransport::new(&SmtpConfig { host: "smtp.example.com".to_owned(), ..SmtpConfig::default() }, "nope");
        assert!(err.is_err());
    }
}
