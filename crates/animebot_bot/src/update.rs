//! Update parser: decodes a webhook body into an [`Interaction`].
//!
//! The payload must carry exactly one of `message`, `inline_query` and
//! `callback_query`. Anything else is rejected before any state is touched.

use animebot_core::{Interaction, Sender};
use animebot_error::{ParseError, ParseErrorKind};
use serde::Deserialize;

/// Top-level webhook payload.
#[derive(Debug, Deserialize)]
struct Update {
    #[serde(default)]
    message: Option<Message>,
    #[serde(default)]
    inline_query: Option<InlineQuery>,
    #[serde(default)]
    callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
struct Message {
    message_id: Option<i64>,
    from: Option<ChatUser>,
    chat: Option<Chat>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUser {
    id: i64,
    first_name: Option<String>,
    last_name: Option<String>,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct InlineQuery {
    id: Option<String>,
    from: Option<ChatUser>,
    query: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    id: Option<String>,
    from: Option<ChatUser>,
    message: Option<Message>,
    data: Option<String>,
}

impl ChatUser {
    fn into_sender(self) -> Sender {
        let display_name = match (self.username, self.first_name, self.last_name) {
            (Some(username), _, _) => username,
            (None, Some(first), Some(last)) => format!("{} {}", first, last),
            (None, Some(first), None) => first,
            (None, None, _) => self.id.to_string(),
        };
        Sender {
            external_id: self.id.to_string(),
            display_name,
        }
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ParseError> {
    value.ok_or_else(|| ParseError::new(ParseErrorKind::MissingField(field)))
}

/// Decode a raw webhook body.
///
/// # Errors
///
/// Returns a [`ParseError`] if the body is not JSON, carries zero or
/// several interactions, or lacks a field the interaction needs.
///
/// # Examples
///
/// ```
/// use animebot_bot::parse_update;
/// use animebot_core::Interaction;
///
/// let body = br#"{"update_id":1,"message":{"message_id":3,
///     "from":{"id":10,"first_name":"Mika","username":"mika"},
///     "chat":{"id":10},"text":"/start"}}"#;
///
/// let interaction = parse_update(body).unwrap();
/// assert!(matches!(interaction, Interaction::TextMessage { ref text, .. } if text == "/start"));
/// ```
pub fn parse_update(body: &[u8]) -> Result<Interaction, ParseError> {
    let update: Update = serde_json::from_slice(body)
        .map_err(|e| ParseError::new(ParseErrorKind::Malformed(e.to_string())))?;

    let present = [
        update.message.is_some(),
        update.inline_query.is_some(),
        update.callback_query.is_some(),
    ]
    .into_iter()
    .filter(|present| *present)
    .count();

    match present {
        0 => return Err(ParseError::new(ParseErrorKind::NoInteraction)),
        1 => {}
        n => return Err(ParseError::new(ParseErrorKind::AmbiguousInteraction(n))),
    }

    if let Some(message) = update.message {
        let sender = required(message.from, "message.from")?.into_sender();
        let chat = required(message.chat, "message.chat")?;
        let text = required(message.text, "message.text")?;
        return Ok(Interaction::TextMessage {
            sender,
            chat_id: chat.id,
            text,
        });
    }

    if let Some(query) = update.inline_query {
        return Ok(Interaction::InlineSearch {
            id: required(query.id, "inline_query.id")?,
            sender: required(query.from, "inline_query.from")?.into_sender(),
            query: required(query.query, "inline_query.query")?,
        });
    }

    let callback = required(update.callback_query, "callback_query")?;
    let source = required(callback.message, "callback_query.message")?;
    Ok(Interaction::CallbackAction {
        id: required(callback.id, "callback_query.id")?,
        sender: required(callback.from, "callback_query.from")?.into_sender(),
        data: required(callback.data, "callback_query.data")?,
        chat_id: required(source.chat, "callback_query.message.chat")?.id,
        message_id: required(source.message_id, "callback_query.message.message_id")?,
    })
}
