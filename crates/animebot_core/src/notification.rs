//! Outbound notifications handed to the delivery worker.

use crate::{AnnotatedItem, CatalogItem, ToggleAction};
use serde::{Deserialize, Serialize};

/// Onboarding text for a first-time user.
pub const WELCOME_TEXT: &str = "This bot notifies you as soon as new episodes of your favourite \
    series air. Send a series name to subscribe, or use /animes to browse the catalog.";

/// Greeting for a user who has talked to the bot before.
pub const RETURNING_TEXT: &str =
    "Welcome back! Use /subscriptions to see what you follow, or /animes to find something new.";

/// The structured result of one request, tagged by `type` on the wire.
///
/// Constructed fresh per request and never persisted. Rendering into
/// end-user text is the delivery worker's job.
///
/// # Examples
///
/// ```
/// use animebot_core::OutboundNotification;
///
/// let note = OutboundNotification::welcome(10, false);
/// let json = serde_json::to_value(&note).unwrap();
/// assert_eq!(json["type"], "welcome");
/// assert_eq!(json["returning"], false);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundNotification {
    /// Greeting in reply to `/start`.
    Welcome {
        /// Destination chat
        chat_id: i64,
        /// Whether the user existed before this request
        returning: bool,
        /// Greeting text
        text: String,
    },
    /// Catalog items the user does not follow yet.
    CatalogList {
        /// Destination chat
        chat_id: i64,
        /// Items
        items: Vec<CatalogItem>,
    },
    /// Items the user follows.
    SubscriptionList {
        /// Destination chat
        chat_id: i64,
        /// Items
        items: Vec<CatalogItem>,
    },
    /// Answer to an inline search.
    InlineResults {
        /// Inline query being answered
        query_id: String,
        /// Matches annotated with membership
        items: Vec<AnnotatedItem>,
    },
    /// Item card with a subscribe or unsubscribe button.
    TogglePrompt {
        /// Destination chat
        chat_id: i64,
        /// The item
        item: CatalogItem,
        /// Current membership; the button offers the opposite
        subscribed: bool,
    },
    /// A committed toggle.
    ToggleResult {
        /// Transition applied
        action: ToggleAction,
        /// Destination chat
        chat_id: i64,
        /// Message to edit, when the toggle came from a button
        message_id: Option<i64>,
        /// Callback to acknowledge, when the toggle came from a button
        callback_id: Option<String>,
        /// Item toggled
        item_id: i64,
    },
    /// Request could not be served.
    Error {
        /// Destination chat, when one is known
        chat_id: Option<i64>,
        /// Short machine-readable reason
        reason: String,
    },
}

impl OutboundNotification {
    /// Greeting for a new or returning user.
    pub fn welcome(chat_id: i64, existed_before: bool) -> Self {
        let text = if existed_before {
            RETURNING_TEXT
        } else {
            WELCOME_TEXT
        };
        Self::Welcome {
            chat_id,
            returning: existed_before,
            text: text.to_string(),
        }
    }

    /// Error addressed to a chat.
    pub fn error(chat_id: Option<i64>, reason: impl Into<String>) -> Self {
        Self::Error {
            chat_id,
            reason: reason.into(),
        }
    }

    /// Wire name of the notification kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::CatalogList { .. } => "catalog_list",
            Self::SubscriptionList { .. } => "subscription_list",
            Self::InlineResults { .. } => "inline_results",
            Self::TogglePrompt { .. } => "toggle_prompt",
            Self::ToggleResult { .. } => "toggle_result",
            Self::Error { .. } => "error",
        }
    }
}
