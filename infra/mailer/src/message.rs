use crate::error::MailError;
use serde::Serialize;

/// One outgoing email. The sender is chosen by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
}

impl MailMessage {
    pub fn new(subject: impl Into<String>) -> Self {
        Self { subject: subject.into(), ..Self::default() }
    }

    #[must_use]
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    #[must_use]
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text = Some(body.into());
        self
    }

    #[must_use]
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html = Some(body.into());
        self
    }

    /// Requires a recipient, a subject and at least one body.
    ///
    /// # Errors
    /// [`MailError::Validation`] naming the first missing part.
    pub fn validate(&self) -> Result<(), MailError> {
        let missing = if self.to.iter().all(|to| to.trim().is_empty()) {
            Some("recipient")
        } else if self.subject.trim().is_empty() {
            Some("subject")
        } else if self.text.as_deref().is_none_or(str::is_empty)
            && self.html.as_deref().is_none_or(str::is_empty)
        {
            Some("text or html body")
        } else {
            None
        };

        missing.map_or(Ok(()), |part| {
            Err(MailError::Validation { message: format!("missing {part}").into(), context: None })
        })
    }

    /// Non-empty recipients, trimmed.
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        self.to.iter().map(|to| to.trim()).filter(|to| !to.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_message_is_valid() {
        let message = MailMessage::new("Hello").to("a@example.com").text("body");
        assert!(message.validate().is_ok());

        let html_only = MailMessage::new("Hello").to("a@example.com").html("<p>body</p>");
        assert!(html_only.validate().is_ok());
    }

    #[test]
    fn reports_first_missing_part() {
        let cases = [
            (MailMessage::new("s").text("b"), "recipient"),
            (MailMessage::new("s").to("  ").text("b"), "recipient"),
            (MailMessage::new(" ").to("a@example.com").text("b"), "subject"),
            (MailMessage::new("s").to("a@example.com").text(""), "text or html body"),
        ];
        for (message, part) in cases {
            let err = message.validate().unwrap_err();
            assert!(err.to_string().contains(part), "{err} should mention {part}");
        }
    }
}
