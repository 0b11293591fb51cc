use super::MailTransport;
use crate::error::{MailError, MailErrorExt};
use crate::message::MailMessage;
use serde::Serialize;
use std::time::Duration;
use tport_domain::config::MailerSendConfig;
use tracing::debug;

/// `MailerSend` email API over HTTPS.
#[derive(Debug, Clone)]
pub struct MailerSendTransport {
    client: reqwest::Client,
    config: MailerSendConfig,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: Address<'a>,
    to: Vec<Address<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<Address<'a>>,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
}

impl MailerSendTransport {
    /// # Errors
    /// Fails when the HTTP client cannot be constructed.
    pub fn new(config: &MailerSendConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()
            .context("Building MailerSend client")?;
        Ok(Self { client, config: config.clone() })
    }

    fn request<'a>(&'a self, message: &'a MailMessage) -> SendRequest<'a> {
        let non_empty = |value: &'a str| (!value.is_empty()).then_some(value);
        SendRequest {
            from: Address {
                email: &self.config.from_email,
                name: non_empty(&self.config.from_name),
            },
            to: message.recipients().map(|email| Address { email, name: None }).collect(),
            reply_to: non_empty(&self.config.reply_to).map(|email| Address { email, name: None }),
            subject: &message.subject,
            text: message.text.as_deref(),
            html: message.html.as_deref(),
        }
    }
}

#[async_trait::async_trait]
impl MailTransport for MailerSendTransport {
    fn name(&self) -> &'static str {
        "mailersend"
    }

    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&self.request(message))
            .send()
            .await
            .context("Calling MailerSend")?;

        let status = response.status();
        if status.is_success() {
            debug!(%status, "MailerSend accepted message");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(MailError::Provider {
            message: format!("MailerSend answered {status}: {body}").into(),
            context: None,
        })
    }
}
