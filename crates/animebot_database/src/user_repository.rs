//! PostgreSQL implementation of UserStore.

use crate::connection::{PgPool, with_connection};
use crate::models::{NewUserRow, UserRow};
use crate::schema::users;

use animebot_core::{NewUser, ResolvedUser, User};
use animebot_error::{AnimebotResult, DatabaseError, DatabaseErrorKind};
use animebot_interface::UserStore;

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use tracing::{debug, instrument};

fn find_row(conn: &mut PgConnection, external_id: &str) -> QueryResult<Option<UserRow>> {
    users::table
        .filter(users::external_id.eq(external_id))
        .select(UserRow::as_select())
        .first(conn)
        .optional()
}

/// Users table accessed through a connection pool.
#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Create a store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self))]
    async fn find_by_external_id(&self, external_id: &str) -> AnimebotResult<Option<User>> {
        let external_id = external_id.to_string();
        with_connection(&self.pool, move |conn| {
            find_row(conn, &external_id)
                .map(|row| row.map(User::from))
                .map_err(DatabaseError::from)
        })
        .await
    }

    #[instrument(skip(self), fields(external_id = %user.external_id))]
    async fn insert(&self, user: &NewUser) -> AnimebotResult<User> {
        let user = user.clone();
        with_connection(&self.pool, move |conn| {
            diesel::insert_into(users::table)
                .values(&NewUserRow {
                    external_id: &user.external_id,
                    display_name: &user.display_name,
                })
                .returning(UserRow::as_returning())
                .get_result(conn)
                .map(User::from)
                .map_err(DatabaseError::from)
        })
        .await
    }

    /// Reads first; only a missing row costs an insert. The insert uses
    /// `ON CONFLICT DO NOTHING` so that concurrent first contacts converge
    /// on one row.
    #[instrument(skip(self), fields(external_id = %user.external_id))]
    async fn find_or_insert(&self, user: &NewUser) -> AnimebotResult<ResolvedUser> {
        let user = user.clone();
        with_connection(&self.pool, move |conn| {
            if let Some(row) = find_row(conn, &user.external_id)? {
                return Ok(ResolvedUser {
                    user: row.into(),
                    existed_before: true,
                });
            }

            conn.transaction::<_, DatabaseError, _>(|conn| {
                let inserted: Option<UserRow> = diesel::insert_into(users::table)
                    .values(&NewUserRow {
                        external_id: &user.external_id,
                        display_name: &user.display_name,
                    })
                    .on_conflict(users::external_id)
                    .do_nothing()
                    .returning(UserRow::as_returning())
                    .get_result(conn)
                    .optional()?;

                if let Some(row) = inserted {
                    debug!(user_id = row.id, "Inserted new user");
                    return Ok(ResolvedUser {
                        user: row.into(),
                        existed_before: false,
                    });
                }

                // Lost the race to a concurrent first contact.
                let row = find_row(conn, &user.external_id)?.ok_or_else(|| {
                    DatabaseError::new(DatabaseErrorKind::Query(format!(
                        "user {} vanished after conflicting insert",
                        user.external_id
                    )))
                })?;
                Ok(ResolvedUser {
                    user: row.into(),
                    existed_before: true,
                })
            })
        })
        .await
    }
}
