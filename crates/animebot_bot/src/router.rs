//! Command router: turns an [`Interaction`] into an [`OutboundNotification`].
//!
//! # Supported commands
//!
//! Text messages are matched in this order, first match wins:
//!
//! - `/start` - greet the user (new or returning)
//! - `/start <externalId>` - show a subscribe/unsubscribe prompt for one item
//! - `/animes` - list catalog items the user does not follow
//! - `/subscriptions` - list items the user follows
//! - anything else - toggle the item whose name equals the text
//!
//! Inline searches return annotated substring matches. Button presses carry
//! `"sub <itemId>"` or `"unsub <itemId>"` and run a directional toggle.
//!
//! # Example
//!
//! ```rust,ignore
//! let router = CommandRouter::new(users, catalog, subscriptions, publisher);
//! let interaction = parse_update(&body)?;
//! router.handle(interaction).await?;
//! ```

use crate::{ReplyTarget, SubscriptionToggler, UserResolver};
use animebot_core::{CallbackToken, Interaction, OutboundNotification, Sender};
use animebot_error::{AnimebotErrorKind, AnimebotResult, NotFoundError, NotFoundErrorKind};
use animebot_interface::{CatalogStore, NotificationPublisher, SubscriptionStore, UserStore};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Default cap on inline search results.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

const NOT_FOUND: &str = "not found";

/// A text message after command classification.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TextCommand<'a> {
    Start,
    StartWith(&'a str),
    Animes,
    Subscriptions,
    Lookup(&'a str),
}

impl<'a> TextCommand<'a> {
    fn classify(text: &'a str) -> Self {
        let text = text.trim();
        let (head, rest) = match text.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (text, ""),
        };
        // `/start@my_bot` is how group chats address a command.
        let command = head.split_once('@').map_or(head, |(command, _)| command);

        match (command, rest.is_empty()) {
            ("/start", true) => Self::Start,
            ("/start", false) => Self::StartWith(rest),
            ("/animes", true) => Self::Animes,
            ("/subscriptions", true) => Self::Subscriptions,
            _ => Self::Lookup(text),
        }
    }
}

/// Dispatches interactions to their handlers and publishes the result.
///
/// Built once at startup from its collaborators; holds no per-request state
/// apart from the toggler's pair locks.
#[derive(Clone)]
pub struct CommandRouter {
    resolver: UserResolver,
    catalog: Arc<dyn CatalogStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
    toggler: SubscriptionToggler,
    publisher: Arc<dyn NotificationPublisher>,
    search_limit: usize,
}

impl CommandRouter {
    /// Wire a router from its stores and publisher.
    pub fn new(
        users: Arc<dyn UserStore>,
        catalog: Arc<dyn CatalogStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        publisher: Arc<dyn NotificationPublisher>,
    ) -> Self {
        Self {
            resolver: UserResolver::new(users),
            catalog,
            toggler: SubscriptionToggler::new(Arc::clone(&subscriptions)),
            subscriptions,
            publisher,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Override the inline search cap.
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Dispatch one interaction and publish the resulting notification.
    ///
    /// Returns the published notification.
    ///
    /// # Errors
    ///
    /// - Parse errors for malformed callback data (nothing was written)
    /// - Database errors from any store (nothing is published)
    /// - Publish errors after dispatch; a committed toggle stays committed
    #[instrument(skip(self, interaction), fields(kind = interaction.kind()))]
    pub async fn handle(&self, interaction: Interaction) -> AnimebotResult<OutboundNotification> {
        let notification = self.dispatch(interaction).await?;
        self.publisher
            .publish(&notification)
            .await
            .inspect_err(|e| {
                warn!(
                    error = %e,
                    notification = notification.kind(),
                    "Publish failed after dispatch; state changes are kept"
                )
            })?;
        debug!(notification = notification.kind(), "Published");
        Ok(notification)
    }

    /// Dispatch one interaction without publishing.
    ///
    /// A missing item becomes an `Error{"not found"}` notification rather
    /// than an error.
    pub async fn dispatch(&self, interaction: Interaction) -> AnimebotResult<OutboundNotification> {
        let chat_id = match &interaction {
            Interaction::TextMessage { chat_id, .. }
            | Interaction::CallbackAction { chat_id, .. } => Some(*chat_id),
            Interaction::InlineSearch { .. } => None,
        };
        match self.route(interaction).await {
            Err(e) if matches!(e.kind(), AnimebotErrorKind::NotFound(_)) => {
                info!(error = %e, "Lookup missed");
                Ok(OutboundNotification::error(chat_id, NOT_FOUND))
            }
            other => other,
        }
    }

    async fn route(&self, interaction: Interaction) -> AnimebotResult<OutboundNotification> {
        match interaction {
            Interaction::TextMessage {
                sender,
                chat_id,
                text,
            } => self.on_text(&sender, chat_id, &text).await,
            Interaction::InlineSearch { id, sender, query } => {
                self.on_inline(&sender, id, &query).await
            }
            Interaction::CallbackAction {
                id,
                sender,
                data,
                chat_id,
                message_id,
            } => {
                self.on_callback(&sender, id, &data, chat_id, message_id)
                    .await
            }
        }
    }

    #[instrument(skip(self, sender, text), fields(external_id = %sender.external_id))]
    async fn on_text(
        &self,
        sender: &Sender,
        chat_id: i64,
        text: &str,
    ) -> AnimebotResult<OutboundNotification> {
        let resolved = self.resolver.resolve(sender).await?;
        let user_id = resolved.user.id;

        match TextCommand::classify(text) {
            TextCommand::Start => {
                info!(user_id, existed_before = resolved.existed_before, "Welcome");
                Ok(OutboundNotification::welcome(
                    chat_id,
                    resolved.existed_before,
                ))
            }
            TextCommand::StartWith(external_id) => {
                match self.catalog.find_by_external_id(external_id).await? {
                    Some(item) => {
                        let subscribed = self.subscriptions.exists(user_id, item.id).await?;
                        debug!(user_id, item_id = item.id, subscribed, "Toggle prompt");
                        Ok(OutboundNotification::TogglePrompt {
                            chat_id,
                            item,
                            subscribed,
                        })
                    }
                    None => {
                        debug!(external_id, "Unknown start argument, treating as a name");
                        self.toggle_by_name(user_id, chat_id, text.trim()).await
                    }
                }
            }
            TextCommand::Animes => {
                let items = self.catalog.list_unsubscribed(user_id).await?;
                debug!(user_id, count = items.len(), "Catalog list");
                Ok(OutboundNotification::CatalogList { chat_id, items })
            }
            TextCommand::Subscriptions => {
                let items = self.catalog.list_subscribed(user_id).await?;
                debug!(user_id, count = items.len(), "Subscription list");
                Ok(OutboundNotification::SubscriptionList { chat_id, items })
            }
            TextCommand::Lookup(name) => self.toggle_by_name(user_id, chat_id, name).await,
        }
    }

    async fn toggle_by_name(
        &self,
        user_id: i64,
        chat_id: i64,
        name: &str,
    ) -> AnimebotResult<OutboundNotification> {
        let missing = || NotFoundError::new(NotFoundErrorKind::ItemByName(name.to_string()));
        if name.is_empty() {
            return Err(missing().into());
        }
        let item = self.catalog.find_by_name(name).await?.ok_or_else(missing)?;
        self.toggler
            .toggle(user_id, item.id, None, ReplyTarget::chat(chat_id))
            .await
    }

    #[instrument(skip(self, sender, query), fields(external_id = %sender.external_id))]
    async fn on_inline(
        &self,
        sender: &Sender,
        query_id: String,
        query: &str,
    ) -> AnimebotResult<OutboundNotification> {
        let resolved = self.resolver.resolve(sender).await?;
        let items = self
            .catalog
            .search_by_substring(resolved.user.id, query.trim(), self.search_limit)
            .await?;
        debug!(count = items.len(), "Inline results");
        Ok(OutboundNotification::InlineResults { query_id, items })
    }

    #[instrument(skip(self, sender, callback_id), fields(external_id = %sender.external_id))]
    async fn on_callback(
        &self,
        sender: &Sender,
        callback_id: String,
        data: &str,
        chat_id: i64,
        message_id: i64,
    ) -> AnimebotResult<OutboundNotification> {
        // Reject bad tokens before touching any store.
        let token: CallbackToken = data.parse()?;

        let resolved = self.resolver.resolve(sender).await?;
        if self.catalog.find_by_id(token.item_id).await?.is_none() {
            return Err(NotFoundError::new(NotFoundErrorKind::ItemById(token.item_id)).into());
        }

        self.toggler
            .toggle(
                resolved.user.id,
                token.item_id,
                Some(token.direction),
                ReplyTarget::callback(chat_id, message_id, callback_id),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_start() {
        assert_eq!(TextCommand::classify("/start"), TextCommand::Start);
        assert_eq!(TextCommand::classify("  /start  "), TextCommand::Start);
        assert_eq!(TextCommand::classify("/start@anime_bot"), TextCommand::Start);
    }

    #[test]
    fn test_classify_start_with_argument() {
        assert_eq!(
            TextCommand::classify("/start 1535"),
            TextCommand::StartWith("1535")
        );
    }

    #[test]
    fn test_classify_lists() {
        assert_eq!(TextCommand::classify("/animes"), TextCommand::Animes);
        assert_eq!(
            TextCommand::classify("/subscriptions"),
            TextCommand::Subscriptions
        );
    }

    #[test]
    fn test_commands_with_trailing_words_are_names() {
        assert_eq!(
            TextCommand::classify("/animes please"),
            TextCommand::Lookup("/animes please")
        );
    }

    #[test]
    fn test_classify_name() {
        assert_eq!(
            TextCommand::classify(" Cowboy Bebop "),
            TextCommand::Lookup("Cowboy Bebop")
        );
    }
}
