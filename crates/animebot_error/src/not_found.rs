//! Missing-entity errors.

/// Which entity could not be found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum NotFoundErrorKind {
    /// No catalog item with this internal id.
    #[display("Catalog item {} not found", _0)]
    ItemById(i64),
    /// No catalog item with this display name.
    #[display("Catalog item named '{}' not found", _0)]
    ItemByName(String),
}

/// Not-found error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Not Found: {} at line {} in {}", kind, line, file)]
pub struct NotFoundError {
    /// The kind of error that occurred
    pub kind: NotFoundErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl NotFoundError {
    /// Create a new NotFoundError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: NotFoundErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
