//! Core data types for the animebot subscription service.
//!
//! This crate holds the storage-agnostic model shared by every other crate:
//! inbound [`Interaction`]s, [`User`]s, [`CatalogItem`]s, the outbound
//! [`OutboundNotification`] contract, and the subscription toggle decision.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod interaction;
mod notification;
mod toggle;
mod user;

pub use catalog::{AnnotatedItem, CatalogItem, CatalogItemBuilder};
pub use interaction::{Interaction, Sender};
pub use notification::{OutboundNotification, RETURNING_TEXT, WELCOME_TEXT};
pub use toggle::{CallbackToken, Direction, ToggleAction, ToggleOutcome, decide_toggle};
pub use user::{NewUser, ResolvedUser, User};
