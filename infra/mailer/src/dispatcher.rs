use crate::error::MailError;
use crate::message::MailMessage;
use crate::transport::{MailTransport, MailerSendTransport, PreviewTransport, SmtpTransport};
use serde::Serialize;
use std::sync::Arc;
use tport_domain::config::MailConfig;
use tracing::{info, instrument, warn};

/// Which provider accepted a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub provider: &'static str,
}

/// Ordered fallback chain of transports.
#[derive(Debug, Clone)]
pub struct MailDispatcher {
    transports: Arc<[Arc<dyn MailTransport>]>,
    preview: Option<Arc<PreviewTransport>>,
}

impl MailDispatcher {
    pub fn builder() -> MailDispatcherBuilder {
        MailDispatcherBuilder::default()
    }

    /// SMTP when fully configured, `MailerSend` when it has an API key, preview always last.
    ///
    /// A provider whose settings cannot be turned into a transport is skipped with a warning.
    #[must_use]
    pub fn from_config(config: &MailConfig) -> Self {
        let mut builder = Self::builder();

        if let Some(smtp) = config.smtp.as_ref().filter(|smtp| smtp.is_complete()) {
            match SmtpTransport::new(smtp, &config.default_from) {
                Ok(transport) => builder = builder.transport(transport),
                Err(err) => warn!(error = %err, "SMTP transport disabled"),
            }
        }
        if let Some(mailersend) = config.mailersend.as_ref().filter(|m| !m.api_key.is_empty()) {
            match MailerSendTransport::new(mailersend) {
                Ok(transport) => builder = builder.transport(transport),
                Err(err) => warn!(error = %err, "MailerSend transport disabled"),
            }
        }

        builder.preview(config.preview_capacity).build()
    }

    /// Provider names in the order they are tried.
    #[must_use]
    pub fn providers(&self) -> Vec<&'static str> {
        self.transports.iter().map(|t| t.name()).collect()
    }

    /// The preview sink, when the chain has one.
    #[must_use]
    pub fn preview(&self) -> Option<&PreviewTransport> {
        self.preview.as_deref()
    }

    /// Tries each transport in order and reports the first that accepts `message`.
    ///
    /// # Errors
    /// [`MailError::Validation`] for an incomplete message, otherwise the last transport's error
    /// when none accepted it.
    #[instrument(skip_all, fields(subject = %message.subject))]
    pub async fn send(&self, message: &MailMessage) -> Result<Delivery, MailError> {
        message.validate()?;

        let mut last_error = None;
        for transport in self.transports.iter() {
            match transport.send(message).await {
                Ok(()) => {
                    info!(provider = transport.name(), "Email sent");
                    return Ok(Delivery { provider: transport.name() });
                }
                Err(err) => {
                    warn!(provider = transport.name(), error = %err, "Email provider failed");
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| "no mail transport configured".into()))
    }
}

#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct MailDispatcherBuilder {
    transports: Vec<Arc<dyn MailTransport>>,
    preview_capacity: Option<usize>,
}

impl MailDispatcherBuilder {
    pub fn transport(mut self, transport: impl MailTransport + 'static) -> Self {
        self.transports.push(Arc::new(transport));
        self
    }

    /// Appends the preview sink after every other transport.
    pub const fn preview(mut self, capacity: usize) -> Self {
        self.preview_capacity = Some(capacity);
        self
    }

    pub fn build(self) -> MailDispatcher {
        let mut transports = self.transports;
        let preview = self.preview_capacity.map(|capacity| Arc::new(PreviewTransport::new(capacity)));
        if let Some(preview) = &preview {
            transports.push(Arc::clone(preview) as Arc<dyn MailTransport>);
        }
        MailDispatcher { transports: transports.into(), preview }
    }
}
