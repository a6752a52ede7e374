//! Error types for the animebot service.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! The four request-level categories are:
//! - [`ParseError`]: malformed or ambiguous input, rejected before any mutation
//! - [`NotFoundError`]: a catalog item is absent
//! - [`DatabaseError`]: a store operation failed and its transaction rolled back
//! - [`PublishError`]: the message bus refused the notification
//!
//! # Examples
//!
//! ```
//! use animebot_error::{AnimebotResult, ParseError, ParseErrorKind};
//!
//! fn parse_token(raw: &str) -> AnimebotResult<i64> {
//!     raw.parse::<i64>()
//!         .map_err(|_| ParseError::new(ParseErrorKind::InvalidItemId(raw.to_string())).into())
//! }
//!
//! assert!(parse_token("x").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod not_found;
mod parse;
mod publish;

pub use config::ConfigError;
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{AnimebotError, AnimebotErrorKind, AnimebotResult};
pub use not_found::{NotFoundError, NotFoundErrorKind};
pub use parse::{ParseError, ParseErrorKind};
pub use publish::{PublishError, PublishErrorKind};
