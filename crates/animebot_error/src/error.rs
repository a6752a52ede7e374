//! Top-level error wrapper types.

use crate::{ConfigError, DatabaseError, NotFoundError, ParseError, PublishError};

/// Every error a request or the service bootstrap can surface.
///
/// # Examples
///
/// ```
/// use animebot_error::{AnimebotError, ParseError, ParseErrorKind};
///
/// let err: AnimebotError = ParseError::new(ParseErrorKind::NoInteraction).into();
/// assert!(err.kind().is_client_error());
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum AnimebotErrorKind {
    /// Malformed or ambiguous input
    #[from(ParseError)]
    Parse(ParseError),
    /// Catalog item absent
    #[from(NotFoundError)]
    NotFound(NotFoundError),
    /// Store operation failed (persistence error)
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Message bus unavailable
    #[from(PublishError)]
    Publish(PublishError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

impl AnimebotErrorKind {
    /// Whether the error was caused by the caller's input rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

/// Animebot error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Animebot Error: {}", _0)]
pub struct AnimebotError(Box<AnimebotErrorKind>);

impl AnimebotError {
    /// Create a new error from a kind.
    pub fn new(kind: AnimebotErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &AnimebotErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to AnimebotErrorKind
impl<T> From<T> for AnimebotError
where
    T: Into<AnimebotErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for animebot operations.
pub type AnimebotResult<T> = std::result::Result<T, AnimebotError>;
