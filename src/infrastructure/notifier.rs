use crate::domain::notification::NotificationEvent;
use crate::domain::ports::NotificationDispatcher;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Writes every event to the log. Used by the CLI, which has no delivery channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDispatcher;

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn send(&self, event: NotificationEvent) -> Result<()> {
        let payload = serde_json::to_string(&event)?;
        tracing::info!(recipient = %event.recipient, payment = %event.payment_id, %payload,
            "notification queued");
        Ok(())
    }
}

/// Forwards events to an in-process channel.
#[derive(Debug, Clone)]
pub struct ChannelDispatcher {
    sender: UnboundedSender<NotificationEvent>,
}

impl ChannelDispatcher {
    pub fn new() -> (Self, UnboundedReceiver<NotificationEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl NotificationDispatcher for ChannelDispatcher {
    async fn send(&self, event: NotificationEvent) -> Result<()> {
        self.sender.send(event).map_err(|e| {
            PaymentError::InternalError(Box::new(std::io::Error::other(format!(
                "notification channel closed: {e}"
            ))))
        })
    }
}
