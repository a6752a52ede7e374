//! Trait definitions for the collaborators of the animebot dispatch engine.
//!
//! The router is constructed once at startup from implementations of these
//! traits; nothing here holds global state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod publisher;
mod stores;

pub use publisher::NotificationPublisher;
pub use stores::{CatalogStore, SubscriptionStore, UserStore};
