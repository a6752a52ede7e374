//! Inbound payload parse errors.

/// Ways an inbound payload can fail to decode into an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ParseErrorKind {
    /// Payload body is not valid JSON for an update.
    #[display("Malformed payload: {}", _0)]
    Malformed(String),
    /// None of `message`, `inline_query`, `callback_query` is present.
    #[display("Payload carries no interaction")]
    NoInteraction,
    /// More than one interaction field is present.
    #[display("Payload carries {} interactions, expected exactly one", _0)]
    AmbiguousInteraction(usize),
    /// A field required by the interaction variant is absent.
    #[display("Missing required field: {}", _0)]
    MissingField(&'static str),
    /// Callback data is not exactly two space-separated tokens.
    #[display("Malformed callback data: '{}'", _0)]
    MalformedCallback(String),
    /// Callback action token is neither `sub` nor `unsub`.
    #[display("Unknown callback action: '{}'", _0)]
    UnknownAction(String),
    /// Item identifier is not numeric.
    #[display("Invalid item id: '{}'", _0)]
    InvalidItemId(String),
}

/// Parse error with source location tracking.
///
/// # Examples
///
/// ```
/// use animebot_error::{ParseError, ParseErrorKind};
///
/// let err = ParseError::new(ParseErrorKind::NoInteraction);
/// assert!(format!("{}", err).contains("no interaction"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Parse Error: {} at line {} in {}", kind, line, file)]
pub struct ParseError {
    /// The kind of error that occurred
    pub kind: ParseErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ParseError {
    /// Create a new ParseError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ParseErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
