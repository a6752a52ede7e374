//! Inbound interactions decoded from a webhook update.

use serde::{Deserialize, Serialize};

/// The chat user who triggered an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Platform identifier of the user, stringified
    pub external_id: String,
    /// Username or best available display name
    pub display_name: String,
}

/// One inbound webhook event. Exactly one variant per payload.
///
/// # Examples
///
/// ```
/// use animebot_core::{Interaction, Sender};
///
/// let interaction = Interaction::TextMessage {
///     sender: Sender { external_id: "7".into(), display_name: "mika".into() },
///     chat_id: 7,
///     text: "/start".into(),
/// };
/// assert_eq!(interaction.sender().external_id, "7");
/// assert_eq!(interaction.kind(), "text_message");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interaction {
    /// Plain chat message; the text drives command matching.
    TextMessage {
        /// Author of the message
        sender: Sender,
        /// Chat the message was posted in
        chat_id: i64,
        /// Message text
        text: String,
    },
    /// Inline search typed in the chat input box.
    InlineSearch {
        /// Inline query identifier, echoed back with the results
        id: String,
        /// User typing the query
        sender: Sender,
        /// Text typed so far
        query: String,
    },
    /// Button press on a message previously sent by the bot.
    CallbackAction {
        /// Callback query identifier
        id: String,
        /// User pressing the button
        sender: Sender,
        /// Raw callback data, `"<action> <itemId>"`
        data: String,
        /// Chat holding the message with the button
        chat_id: i64,
        /// Message carrying the button
        message_id: i64,
    },
}

impl Interaction {
    /// The user behind this interaction.
    pub fn sender(&self) -> &Sender {
        match self {
            Self::TextMessage { sender, .. }
            | Self::InlineSearch { sender, .. }
            | Self::CallbackAction { sender, .. } => sender,
        }
    }

    /// Short variant name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TextMessage { .. } => "text_message",
            Self::InlineSearch { .. } => "inline_search",
            Self::CallbackAction { .. } => "callback_action",
        }
    }
}
