//! Subscription toggler: the check-then-act core of the service.

use crate::locks::PairLocks;
use animebot_core::{Direction, OutboundNotification, ToggleOutcome};
use animebot_error::AnimebotResult;
use animebot_interface::SubscriptionStore;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Where the toggle result should be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget {
    chat_id: i64,
    message_id: Option<i64>,
    callback_id: Option<String>,
}

impl ReplyTarget {
    /// Reply to a chat message.
    pub fn chat(chat_id: i64) -> Self {
        Self {
            chat_id,
            message_id: None,
            callback_id: None,
        }
    }

    /// Reply to a button press on `message_id`.
    pub fn callback(chat_id: i64, message_id: i64, callback_id: impl Into<String>) -> Self {
        Self {
            chat_id,
            message_id: Some(message_id),
            callback_id: Some(callback_id.into()),
        }
    }
}

/// Flips `(user, item)` membership and builds the matching notification.
///
/// Calls for the same pair are serialized in-process; the store applies the
/// existence check and mutation in one transaction. The notification is only
/// built after the store reports success.
#[derive(Clone)]
pub struct SubscriptionToggler {
    subscriptions: Arc<dyn SubscriptionStore>,
    locks: PairLocks,
}

impl SubscriptionToggler {
    /// Create a toggler over a subscription store.
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>) -> Self {
        Self {
            subscriptions,
            locks: PairLocks::new(),
        }
    }

    /// Toggle membership.
    ///
    /// With `requested` set, a pair already in the requested state is left
    /// alone and an error notification is returned instead.
    ///
    /// # Errors
    ///
    /// Returns the store's database error if the transaction failed.
    #[instrument(skip(self, reply), fields(chat_id = reply.chat_id))]
    pub async fn toggle(
        &self,
        user_id: i64,
        item_id: i64,
        requested: Option<Direction>,
        reply: ReplyTarget,
    ) -> AnimebotResult<OutboundNotification> {
        let _pair = self.locks.lock(user_id, item_id).await;

        let outcome = self
            .subscriptions
            .toggle(user_id, item_id, requested)
            .await
            .inspect_err(|e| error!(error = %e, "Toggle rolled back"))?;

        let notification = match outcome {
            ToggleOutcome::Applied(action) => {
                info!(%action, "Subscription toggled");
                OutboundNotification::ToggleResult {
                    action,
                    chat_id: reply.chat_id,
                    message_id: reply.message_id,
                    callback_id: reply.callback_id,
                    item_id,
                }
            }
            ToggleOutcome::Unchanged { subscribed } => {
                info!(subscribed, "Requested state already holds");
                let reason = if subscribed {
                    "already subscribed"
                } else {
                    "not subscribed"
                };
                OutboundNotification::error(Some(reply.chat_id), reason)
            }
        };
        Ok(notification)
    }
}
