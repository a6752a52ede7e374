//! NATS-backed notification publisher.

use animebot_core::OutboundNotification;
use animebot_error::{PublishError, PublishErrorKind};
use animebot_interface::NotificationPublisher;
use async_trait::async_trait;
use tracing::{debug, error, info, instrument};

/// Encode a notification into its bus payload.
///
/// # Examples
///
/// ```
/// use animebot_bot::encode_notification;
/// use animebot_core::OutboundNotification;
///
/// let payload = encode_notification(&OutboundNotification::error(None, "not found")).unwrap();
/// let json: serde_json::Value = serde_json::from_slice(&payload).unwrap();
/// assert_eq!(json["type"], "error");
/// ```
pub fn encode_notification(notification: &OutboundNotification) -> Result<Vec<u8>, PublishError> {
    serde_json::to_vec(notification)
        .map_err(|e| PublishError::new(PublishErrorKind::Encoding(e.to_string())))
}

/// Publishes notifications as JSON on one NATS subject.
///
/// Each call publishes once and flushes; nothing is buffered or retried.
#[derive(Debug, Clone)]
pub struct NatsPublisher {
    client: async_nats::Client,
    subject: String,
}

impl NatsPublisher {
    /// Connect to the NATS server at `url`.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn connect(url: &str, subject: impl Into<String>) -> Result<Self, PublishError> {
        let client = async_nats::connect(url).await.map_err(|e| {
            error!(error = %e, "Failed to connect to NATS");
            PublishError::new(PublishErrorKind::Connection(e.to_string()))
        })?;
        let publisher = Self::with_client(client, subject);
        info!(subject = %publisher.subject, "Connected to NATS");
        Ok(publisher)
    }

    /// Wrap an existing client.
    pub fn with_client(client: async_nats::Client, subject: impl Into<String>) -> Self {
        Self {
            client,
            subject: subject.into(),
        }
    }

    /// Subject notifications are published to.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[async_trait]
impl NotificationPublisher for NatsPublisher {
    #[instrument(skip(self, notification), fields(subject = %self.subject, kind = notification.kind()))]
    async fn publish(&self, notification: &OutboundNotification) -> Result<(), PublishError> {
        let payload = encode_notification(notification)?;
        let rejected = |reason: String| {
            PublishError::new(PublishErrorKind::Rejected {
                subject: self.subject.clone(),
                reason,
            })
        };

        self.client
            .publish(self.subject.clone(), payload.into())
            .await
            .map_err(|e| rejected(e.to_string()))?;
        self.client
            .flush()
            .await
            .map_err(|e| rejected(e.to_string()))?;

        debug!("Notification published");
        Ok(())
    }
}
