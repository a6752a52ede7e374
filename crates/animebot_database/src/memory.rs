//! In-memory implementation of all three stores.
//!
//! Useful for tests and for running the service without PostgreSQL. Every
//! operation takes the single state lock, so find-or-insert and toggle are
//! atomic with respect to each other.

use animebot_core::{
    AnnotatedItem, CatalogItem, Direction, NewUser, ResolvedUser, ToggleAction, ToggleOutcome,
    User, decide_toggle,
};
use animebot_error::{AnimebotResult, DatabaseError, DatabaseErrorKind};
use animebot_interface::{CatalogStore, SubscriptionStore, UserStore};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<i64, User>,
    items: BTreeMap<i64, CatalogItem>,
    subscriptions: HashSet<(i64, i64)>,
    next_user_id: i64,
}

/// Map-backed users, catalog and subscriptions.
///
/// Cloning shares the underlying state.
///
/// # Example
/// ```
/// use animebot_database::InMemoryStore;
///
/// #[tokio::main]
/// async fn main() {
///     let store = InMemoryStore::new();
///     assert_eq!(store.user_count().await, 0);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a catalog item (stands in for the ingestion process).
    pub async fn put_item(&self, item: CatalogItem) {
        self.state.write().await.items.insert(item.id, item);
    }

    /// Number of stored users (for testing).
    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    /// Number of stored subscriptions (for testing).
    pub async fn subscription_count(&self) -> usize {
        self.state.read().await.subscriptions.len()
    }

    /// Make every subsequent write fail with a database error (for testing).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), DatabaseError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DatabaseError::new(DatabaseErrorKind::Query(
                "writes disabled".to_string(),
            )));
        }
        Ok(())
    }
}

fn insert_user(state: &mut State, user: &NewUser) -> User {
    state.next_user_id += 1;
    let stored = User {
        id: state.next_user_id,
        external_id: user.external_id.clone(),
        display_name: user.display_name.clone(),
    };
    state.users.insert(stored.id, stored.clone());
    stored
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_external_id(&self, external_id: &str) -> AnimebotResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|user| user.external_id == external_id)
            .cloned())
    }

    async fn insert(&self, user: &NewUser) -> AnimebotResult<User> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        Ok(insert_user(&mut state, user))
    }

    async fn find_or_insert(&self, user: &NewUser) -> AnimebotResult<ResolvedUser> {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .users
            .values()
            .find(|stored| stored.external_id == user.external_id)
        {
            return Ok(ResolvedUser {
                user: existing.clone(),
                existed_before: true,
            });
        }
        self.check_writable()?;
        Ok(ResolvedUser {
            user: insert_user(&mut state, user),
            existed_before: false,
        })
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> AnimebotResult<Option<CatalogItem>> {
        Ok(self.state.read().await.items.get(&id).cloned())
    }

    async fn find_by_external_id(&self, external_id: &str) -> AnimebotResult<Option<CatalogItem>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .values()
            .find(|item| item.external_id == external_id)
            .cloned())
    }

    async fn find_by_name(&self, name: &str) -> AnimebotResult<Option<CatalogItem>> {
        let state = self.state.read().await;
        Ok(state.items.values().find(|item| item.matches_name(name)).cloned())
    }

    async fn search_by_substring(
        &self,
        user_id: i64,
        text: &str,
        limit: usize,
    ) -> AnimebotResult<Vec<AnnotatedItem>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .values()
            .filter(|item| item.contains_text(text))
            .take(limit)
            .map(|item| AnnotatedItem {
                item: item.clone(),
                subscribed: state.subscriptions.contains(&(user_id, item.id)),
            })
            .collect())
    }

    async fn list_subscribed(&self, user_id: i64) -> AnimebotResult<Vec<CatalogItem>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .values()
            .filter(|item| state.subscriptions.contains(&(user_id, item.id)))
            .cloned()
            .collect())
    }

    async fn list_unsubscribed(&self, user_id: i64) -> AnimebotResult<Vec<CatalogItem>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .values()
            .filter(|item| !state.subscriptions.contains(&(user_id, item.id)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SubscriptionStore for InMemoryStore {
    async fn exists(&self, user_id: i64, item_id: i64) -> AnimebotResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .subscriptions
            .contains(&(user_id, item_id)))
    }

    async fn insert(&self, user_id: i64, item_id: i64) -> AnimebotResult<()> {
        self.check_writable()?;
        self.state
            .write()
            .await
            .subscriptions
            .insert((user_id, item_id));
        Ok(())
    }

    async fn delete(&self, user_id: i64, item_id: i64) -> AnimebotResult<()> {
        self.check_writable()?;
        self.state
            .write()
            .await
            .subscriptions
            .remove(&(user_id, item_id));
        Ok(())
    }

    async fn toggle(
        &self,
        user_id: i64,
        item_id: i64,
        requested: Option<Direction>,
    ) -> AnimebotResult<ToggleOutcome> {
        let mut state = self.state.write().await;
        let subscribed = state.subscriptions.contains(&(user_id, item_id));
        let outcome = decide_toggle(subscribed, requested);
        if let ToggleOutcome::Applied(action) = outcome {
            self.check_writable().map_err(|e| {
                DatabaseError::new(DatabaseErrorKind::Transaction(e.kind.to_string()))
            })?;
            match action {
                ToggleAction::Subscribed => state.subscriptions.insert((user_id, item_id)),
                ToggleAction::Unsubscribed => state.subscriptions.remove(&(user_id, item_id)),
            };
        }
        Ok(outcome)
    }
}
