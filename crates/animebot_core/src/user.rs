//! Bot users.

use serde::{Deserialize, Serialize};

/// A stored user, created on first contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Internal identifier
    pub id: i64,
    /// Platform identifier, unique across users
    pub external_id: String,
    /// Display name captured at creation
    pub display_name: String,
}

/// Values for inserting a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Platform identifier
    pub external_id: String,
    /// Display name
    pub display_name: String,
}

impl NewUser {
    /// Create insert values.
    pub fn new(external_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Result of find-or-create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUser {
    /// The stored record
    pub user: User,
    /// Whether the record existed before this call
    pub existed_before: bool,
}
