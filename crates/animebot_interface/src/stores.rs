//! Storage contracts.

use animebot_core::{AnnotatedItem, CatalogItem, Direction, NewUser, ResolvedUser, ToggleOutcome, User};
use animebot_error::AnimebotResult;
use async_trait::async_trait;

/// Users keyed by their platform identifier.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by platform identifier.
    async fn find_by_external_id(&self, external_id: &str) -> AnimebotResult<Option<User>>;

    /// Insert a new user.
    async fn insert(&self, user: &NewUser) -> AnimebotResult<User>;

    /// Return the stored user for `user.external_id`, inserting it if absent.
    ///
    /// Implementations must perform lookup and insert as one atomic step so
    /// that concurrent first contacts yield exactly one row.
    async fn find_or_insert(&self, user: &NewUser) -> AnimebotResult<ResolvedUser>;
}

/// Read-only access to the catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Look up an item by internal id.
    async fn find_by_id(&self, id: i64) -> AnimebotResult<Option<CatalogItem>>;

    /// Look up an item by upstream catalog id.
    async fn find_by_external_id(&self, external_id: &str) -> AnimebotResult<Option<CatalogItem>>;

    /// Look up an item whose primary or alternate name equals `name`.
    async fn find_by_name(&self, name: &str) -> AnimebotResult<Option<CatalogItem>>;

    /// Items whose primary or alternate name contains `text`, ignoring case,
    /// annotated with `user_id`'s membership at query time.
    async fn search_by_substring(
        &self,
        user_id: i64,
        text: &str,
        limit: usize,
    ) -> AnimebotResult<Vec<AnnotatedItem>>;

    /// Items `user_id` is subscribed to.
    async fn list_subscribed(&self, user_id: i64) -> AnimebotResult<Vec<CatalogItem>>;

    /// Items `user_id` is not subscribed to.
    async fn list_unsubscribed(&self, user_id: i64) -> AnimebotResult<Vec<CatalogItem>>;
}

/// The `(user, item)` subscription relation. Set semantics.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Whether the pair exists.
    async fn exists(&self, user_id: i64, item_id: i64) -> AnimebotResult<bool>;

    /// Add the pair. Adding an existing pair is a no-op.
    async fn insert(&self, user_id: i64, item_id: i64) -> AnimebotResult<()>;

    /// Remove the pair. Removing a missing pair is a no-op.
    async fn delete(&self, user_id: i64, item_id: i64) -> AnimebotResult<()>;

    /// Check membership, decide with [`animebot_core::decide_toggle`] and
    /// apply the decision, all inside one transaction.
    ///
    /// On failure nothing is written and a database error is returned.
    async fn toggle(
        &self,
        user_id: i64,
        item_id: i64,
        requested: Option<Direction>,
    ) -> AnimebotResult<ToggleOutcome>;
}
