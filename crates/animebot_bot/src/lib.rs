//! Webhook dispatch and subscription toggle engine.
//!
//! Incoming updates flow through:
//! - **parse_update**: raw body to [`animebot_core::Interaction`]
//! - **UserResolver**: find-or-create the acting user
//! - **CommandRouter**: pick the handler for the interaction
//! - **SubscriptionToggler**: check-then-act membership flip
//! - **NatsPublisher**: hand the notification to the delivery worker

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod locks;
pub mod observability;
mod publisher;
mod resolver;
mod router;
pub mod settings;
mod toggler;
mod update;

pub use api::{ApiState, create_router};
pub use locks::{PairGuard, PairLocks};
pub use observability::{Telemetry, init_observability};
pub use publisher::{NatsPublisher, encode_notification};
pub use resolver::UserResolver;
pub use router::{CommandRouter, DEFAULT_SEARCH_LIMIT};
pub use settings::Settings;
pub use toggler::{ReplyTarget, SubscriptionToggler};
pub use update::parse_update;
