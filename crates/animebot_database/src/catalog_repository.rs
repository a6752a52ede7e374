//! PostgreSQL implementation of CatalogStore.

use crate::connection::{PgPool, with_connection};
use crate::models::AnimeRow;
use crate::schema::{animes, subscriptions};

use animebot_core::{AnnotatedItem, CatalogItem};
use animebot_error::{AnimebotResult, DatabaseError};
use animebot_interface::CatalogStore;

use async_trait::async_trait;
use diesel::prelude::*;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Read-only catalog queries over the `animes` table.
#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    /// Create a store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape `LIKE` metacharacters so user text matches literally.
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> AnimebotResult<Option<CatalogItem>> {
        with_connection(&self.pool, move |conn| {
            animes::table
                .find(id)
                .select(AnimeRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(CatalogItem::from))
                .map_err(DatabaseError::from)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find_by_external_id(&self, external_id: &str) -> AnimebotResult<Option<CatalogItem>> {
        let external_id = external_id.to_string();
        with_connection(&self.pool, move |conn| {
            animes::table
                .filter(animes::external_id.eq(&external_id))
                .select(AnimeRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(CatalogItem::from))
                .map_err(DatabaseError::from)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> AnimebotResult<Option<CatalogItem>> {
        // Untranslated titles are stored with an empty name.
        if name.is_empty() {
            return Ok(None);
        }
        let name = name.to_string();
        with_connection(&self.pool, move |conn| {
            animes::table
                .filter(animes::rus_name.eq(&name).or(animes::eng_name.eq(&name)))
                .order(animes::id.asc())
                .select(AnimeRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(CatalogItem::from))
                .map_err(DatabaseError::from)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn search_by_substring(
        &self,
        user_id: i64,
        text: &str,
        limit: usize,
    ) -> AnimebotResult<Vec<AnnotatedItem>> {
        let pattern = like_pattern(text);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        with_connection(&self.pool, move |conn| {
            let rows: Vec<AnimeRow> = animes::table
                .filter(
                    animes::rus_name
                        .ilike(&pattern)
                        .or(animes::eng_name.ilike(&pattern)),
                )
                .order(animes::id.asc())
                .limit(limit)
                .select(AnimeRow::as_select())
                .load(conn)?;

            let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
            let subscribed: HashSet<i64> = subscriptions::table
                .filter(subscriptions::user_id.eq(user_id))
                .filter(subscriptions::anime_id.eq_any(&ids))
                .select(subscriptions::anime_id)
                .load::<i64>(conn)?
                .into_iter()
                .collect();

            debug!(matches = rows.len(), subscribed = subscribed.len(), "Search complete");
            Ok(rows
                .into_iter()
                .map(|row| AnnotatedItem {
                    subscribed: subscribed.contains(&row.id),
                    item: row.into(),
                })
                .collect())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_subscribed(&self, user_id: i64) -> AnimebotResult<Vec<CatalogItem>> {
        with_connection(&self.pool, move |conn| {
            animes::table
                .inner_join(subscriptions::table)
                .filter(subscriptions::user_id.eq(user_id))
                .order(animes::id.asc())
                .select(AnimeRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(CatalogItem::from).collect())
                .map_err(DatabaseError::from)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_unsubscribed(&self, user_id: i64) -> AnimebotResult<Vec<CatalogItem>> {
        with_connection(&self.pool, move |conn| {
            let followed = subscriptions::table
                .filter(subscriptions::user_id.eq(user_id))
                .select(subscriptions::anime_id);
            animes::table
                .filter(animes::id.ne_all(followed))
                .order(animes::id.asc())
                .select(AnimeRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(CatalogItem::from).collect())
                .map_err(DatabaseError::from)
        })
        .await
    }
}
