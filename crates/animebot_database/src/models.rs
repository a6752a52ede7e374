//! Diesel row types and their conversions to core types.

use crate::schema::{animes, subscriptions, users};
use animebot_core::{CatalogItem, User};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Database row for the `users` table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i64,
    pub external_id: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for the `users` table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub external_id: &'a str,
    pub display_name: &'a str,
}

/// Database row for the `animes` table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = animes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AnimeRow {
    pub id: i64,
    pub external_id: String,
    pub rus_name: String,
    pub eng_name: String,
    pub image_url: Option<String>,
    pub next_episode_at: Option<DateTime<Utc>>,
    pub notified: bool,
}

/// Insertable struct for the `subscriptions` table.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = subscriptions)]
pub struct NewSubscriptionRow {
    pub user_id: i64,
    pub anime_id: i64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            external_id: row.external_id,
            display_name: row.display_name,
        }
    }
}

impl From<AnimeRow> for CatalogItem {
    fn from(row: AnimeRow) -> Self {
        Self {
            id: row.id,
            external_id: row.external_id,
            primary_name: row.rus_name,
            alternate_name: row.eng_name,
            image_ref: row.image_url,
            next_release_at: row.next_episode_at,
            notified: row.notified,
        }
    }
}
