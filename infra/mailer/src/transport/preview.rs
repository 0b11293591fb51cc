use super::MailTransport;
use crate::error::MailError;
use crate::message::MailMessage;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::info;

/// Last-resort sink: logs the message and keeps the most recent ones in memory.
#[derive(Debug)]
pub struct PreviewTransport {
    capacity: usize,
    outbox: Mutex<VecDeque<MailMessage>>,
}

impl PreviewTransport {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { capacity, outbox: Mutex::new(VecDeque::with_capacity(capacity)) }
    }

    /// Captured messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<MailMessage> {
        self.outbox.lock().iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outbox.lock().len()
    }

    pub fn clear(&self) {
        self.outbox.lock().clear();
    }
}

#[async_trait::async_trait]
impl MailTransport for PreviewTransport {
    fn name(&self) -> &'static str {
        "preview"
    }

    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        info!(
            to = ?message.to,
            subject = %message.subject,
            text = message.text.as_deref().unwrap_or_default(),
            "Email preview (not delivered)"
        );

        let mut outbox = self.outbox.lock();
        if outbox.len() == self.capacity {
            outbox.pop_front();
        }
        outbox.push_back(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keeps_most_recent_messages() {
        let preview = PreviewTransport::new(2);
        for subject in ["one", "two", "three"] {
            preview.send(&MailMessage::new(subject).to("a@example.com").text("x")).await.unwrap();
        }

        let subjects: Vec<_> = preview.messages().into_iter().map(|m| m.subject).collect();
        assert_eq!(subjects, ["two", "three"]);

        preview.clear();
        assert_eq!(preview.len(), 0);
    }
}
