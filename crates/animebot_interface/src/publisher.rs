//! Message bus contract.

use animebot_core::OutboundNotification;
use animebot_error::PublishError;
use async_trait::async_trait;

/// Hands notifications to the delivery worker.
///
/// Each call submits the notification exactly once. There is no retry,
/// buffering or ordering guarantee; failures go back to the caller.
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// Encode and submit one notification.
    async fn publish(&self, notification: &OutboundNotification) -> Result<(), PublishError>;
}
