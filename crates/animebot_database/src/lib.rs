//! Storage implementations for animebot.
//!
//! # Features
//!
//! - Diesel-based PostgreSQL stores over an r2d2 pool
//! - Embedded migrations for `users`, `animes` and `subscriptions`
//! - An in-memory store implementing every store trait
//!
//! # Example
//!
//! ```rust,ignore
//! use animebot_database::{create_pool, run_migrations, PoolSettings, PostgresUserStore};
//!
//! let pool = create_pool(&settings)?;
//! run_migrations(&pool)?;
//! let users = PostgresUserStore::new(pool.clone());
//! ```

mod catalog_repository;
mod connection;
mod memory;
mod models;
mod subscription_repository;
mod user_repository;

// Public modules for external access
pub mod schema;

pub use catalog_repository::PostgresCatalogStore;
pub use connection::{PgPool, PoolSettings, create_pool, run_migrations};
pub use memory::InMemoryStore;
pub use models::{AnimeRow, NewSubscriptionRow, NewUserRow, UserRow};
pub use subscription_repository::PostgresSubscriptionStore;
pub use user_repository::PostgresUserStore;
