//! PostgreSQL implementation of SubscriptionStore.

use crate::connection::{PgPool, with_connection};
use crate::models::NewSubscriptionRow;
use crate::schema::subscriptions;

use animebot_core::{Direction, ToggleAction, ToggleOutcome, decide_toggle};
use animebot_error::{AnimebotResult, DatabaseError, DatabaseErrorKind};
use animebot_interface::SubscriptionStore;

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use tracing::{debug, instrument};

/// The `subscriptions` relation accessed through a connection pool.
#[derive(Clone)]
pub struct PostgresSubscriptionStore {
    pool: PgPool,
}

impl PostgresSubscriptionStore {
    /// Create a store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn pair_exists(conn: &mut PgConnection, user_id: i64, item_id: i64) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(
        subscriptions::table.find((user_id, item_id)),
    ))
    .get_result(conn)
}

fn insert_pair(conn: &mut PgConnection, user_id: i64, item_id: i64) -> QueryResult<usize> {
    diesel::insert_into(subscriptions::table)
        .values(&NewSubscriptionRow {
            user_id,
            anime_id: item_id,
        })
        .on_conflict_do_nothing()
        .execute(conn)
}

fn delete_pair(conn: &mut PgConnection, user_id: i64, item_id: i64) -> QueryResult<usize> {
    diesel::delete(subscriptions::table.find((user_id, item_id))).execute(conn)
}

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    #[instrument(skip(self))]
    async fn exists(&self, user_id: i64, item_id: i64) -> AnimebotResult<bool> {
        with_connection(&self.pool, move |conn| {
            pair_exists(conn, user_id, item_id).map_err(DatabaseError::from)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn insert(&self, user_id: i64, item_id: i64) -> AnimebotResult<()> {
        with_connection(&self.pool, move |conn| {
            insert_pair(conn, user_id, item_id)
                .map(|_| ())
                .map_err(DatabaseError::from)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: i64, item_id: i64) -> AnimebotResult<()> {
        with_connection(&self.pool, move |conn| {
            delete_pair(conn, user_id, item_id)
                .map(|_| ())
                .map_err(DatabaseError::from)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn toggle(
        &self,
        user_id: i64,
        item_id: i64,
        requested: Option<Direction>,
    ) -> AnimebotResult<ToggleOutcome> {
        with_connection(&self.pool, move |conn| {
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                let subscribed = pair_exists(conn, user_id, item_id)?;
                let outcome = decide_toggle(subscribed, requested);
                match outcome {
                    ToggleOutcome::Applied(ToggleAction::Subscribed) => {
                        insert_pair(conn, user_id, item_id)?;
                    }
                    ToggleOutcome::Applied(ToggleAction::Unsubscribed) => {
                        delete_pair(conn, user_id, item_id)?;
                    }
                    ToggleOutcome::Unchanged { .. } => {}
                }
                debug!(subscribed, ?outcome, "Toggle decided");
                Ok(outcome)
            })
            .map_err(|e| DatabaseError::new(DatabaseErrorKind::Transaction(e.to_string())))
        })
        .await
    }
}
