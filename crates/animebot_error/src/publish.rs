//! Message bus publish errors.

/// Publish failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PublishErrorKind {
    /// Could not connect to the bus.
    #[display("Bus connection failed: {}", _0)]
    Connection(String),
    /// Notification could not be encoded.
    #[display("Notification encoding failed: {}", _0)]
    Encoding(String),
    /// Bus rejected or dropped the message.
    #[display("Publish to '{}' failed: {}", subject, reason)]
    Rejected {
        /// Destination subject
        subject: String,
        /// Reason reported by the client
        reason: String,
    },
}

/// Publish error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Publish Error: {} at line {} in {}", kind, line, file)]
pub struct PublishError {
    /// The kind of error that occurred
    pub kind: PublishErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PublishError {
    /// Create a new PublishError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PublishErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
