//! Subscription toggle state machine.
//!
//! A `(user, item)` pair is either `NotSubscribed` (initial) or `Subscribed`.
//! [`decide_toggle`] maps the observed state and an optional requested
//! direction to the transition a store must apply. Stores call it between
//! their existence check and mutation, inside one transaction.

use animebot_error::{ParseError, ParseErrorKind};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Direction requested by a callback button.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumString, strum::Display,
)]
pub enum Direction {
    /// `sub`
    #[strum(serialize = "sub")]
    #[serde(rename = "sub")]
    Subscribe,
    /// `unsub`
    #[strum(serialize = "unsub")]
    #[serde(rename = "unsub")]
    Unsubscribe,
}

/// Transition that was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAction {
    /// `NotSubscribed -> Subscribed`
    #[display("subscribed")]
    Subscribed,
    /// `Subscribed -> NotSubscribed`
    #[display("unsubscribed")]
    Unsubscribed,
}

/// What a toggle did to the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The relation was mutated.
    Applied(ToggleAction),
    /// The requested direction already held; nothing was written.
    Unchanged {
        /// Membership observed by the check
        subscribed: bool,
    },
}

/// Decide the transition for a pair.
///
/// Without a direction the state is simply flipped. With a direction the
/// flip only happens when it moves toward the requested state.
///
/// # Examples
///
/// ```
/// use animebot_core::{decide_toggle, Direction, ToggleAction, ToggleOutcome};
///
/// assert_eq!(decide_toggle(false, None), ToggleOutcome::Applied(ToggleAction::Subscribed));
/// assert_eq!(
///     decide_toggle(true, Some(Direction::Subscribe)),
///     ToggleOutcome::Unchanged { subscribed: true },
/// );
/// ```
pub fn decide_toggle(subscribed: bool, requested: Option<Direction>) -> ToggleOutcome {
    match (subscribed, requested) {
        (false, None | Some(Direction::Subscribe)) => ToggleOutcome::Applied(ToggleAction::Subscribed),
        (true, None | Some(Direction::Unsubscribe)) => {
            ToggleOutcome::Applied(ToggleAction::Unsubscribed)
        }
        (subscribed, Some(_)) => ToggleOutcome::Unchanged { subscribed },
    }
}

/// Parsed callback data, `"<action> <itemId>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackToken {
    /// Requested direction
    pub direction: Direction,
    /// Internal item id
    pub item_id: i64,
}

impl CallbackToken {
    /// Render the callback data for a button.
    pub fn encode(direction: Direction, item_id: i64) -> String {
        format!("{} {}", direction, item_id)
    }
}

impl FromStr for CallbackToken {
    type Err = ParseError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = data.split(' ').collect();
        let [action, id] = parts.as_slice() else {
            return Err(ParseError::new(ParseErrorKind::MalformedCallback(
                data.to_string(),
            )));
        };
        let direction = action
            .parse::<Direction>()
            .map_err(|_| ParseError::new(ParseErrorKind::UnknownAction(action.to_string())))?;
        let item_id = id
            .parse::<i64>()
            .map_err(|_| ParseError::new(ParseErrorKind::InvalidItemId(id.to_string())))?;
        Ok(Self { direction, item_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subscribe_token() {
        let token: CallbackToken = "sub 42".parse().unwrap();
        assert_eq!(token.direction, Direction::Subscribe);
        assert_eq!(token.item_id, 42);
    }

    #[test]
    fn test_parse_unsubscribe_token() {
        let token: CallbackToken = "unsub 7".parse().unwrap();
        assert_eq!(token.direction, Direction::Unsubscribe);
        assert_eq!(token.item_id, 7);
    }

    #[test]
    fn test_single_token_is_malformed() {
        let err = "sub".parse::<CallbackToken>().unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::MalformedCallback(_)));
    }

    #[test]
    fn test_three_tokens_is_malformed() {
        let err = "sub 1 2".parse::<CallbackToken>().unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::MalformedCallback(_)));
    }

    #[test]
    fn test_non_numeric_id() {
        let err = "sub x".parse::<CallbackToken>().unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidItemId(_)));
    }

    #[test]
    fn test_unknown_action() {
        let err = "follow 3".parse::<CallbackToken>().unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnknownAction(_)));
    }

    #[test]
    fn test_encode_matches_parse() {
        let data = CallbackToken::encode(Direction::Unsubscribe, 9);
        assert_eq!(data, "unsub 9");
    }

    #[test]
    fn test_undirected_toggle_flips() {
        assert_eq!(
            decide_toggle(false, None),
            ToggleOutcome::Applied(ToggleAction::Subscribed)
        );
        assert_eq!(
            decide_toggle(true, None),
            ToggleOutcome::Applied(ToggleAction::Unsubscribed)
        );
    }

    #[test]
    fn test_directed_toggle_is_advisory() {
        assert_eq!(
            decide_toggle(false, Some(Direction::Subscribe)),
            ToggleOutcome::Applied(ToggleAction::Subscribed)
        );
        assert_eq!(
            decide_toggle(false, Some(Direction::Unsubscribe)),
            ToggleOutcome::Unchanged { subscribed: false }
        );
        assert_eq!(
            decide_toggle(true, Some(Direction::Unsubscribe)),
            ToggleOutcome::Applied(ToggleAction::Unsubscribed)
        );
        assert_eq!(
            decide_toggle(true, Some(Direction::Subscribe)),
            ToggleOutcome::Unchanged { subscribed: true }
        );
    }

    #[test]
    fn test_direction_wire_names_agree() {
        for direction in [Direction::Subscribe, Direction::Unsubscribe] {
            let json = serde_json::to_value(direction).unwrap();
            assert_eq!(json, serde_json::Value::String(direction.to_string()));
            let back: Direction = serde_json::from_value(json).unwrap();
            assert_eq!(back, direction);
        }
    }
}
