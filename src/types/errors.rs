use thiserror::Error;

// === StorageError ===

/// Errors raised by a `LocalStorage` backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing database rejected the operation.
    #[error("Storage database error: {0}")]
    DatabaseError(String),
    /// The storage lock was poisoned by a panicking writer.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::DatabaseError(e.to_string())
    }
}

// === SessionError ===

/// Errors related to signing in and out.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Email or password was left blank.
    #[error("Please enter both email and password")]
    MissingCredentials,
    /// The pair did not match the demo account.
    #[error("Invalid credentials. Try {email} / {password}")]
    InvalidCredentials {
        email: &'static str,
        password: &'static str,
    },
    /// Reading or writing the token failed.
    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),
}

// === BookmarkError ===

/// Errors related to the bookmark collection.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// The persisted collection could not be decoded.
    #[error("Bookmark collection is corrupt: {0}")]
    CorruptCollection(String),
    /// The collection could not be encoded for writing.
    #[error("Bookmark serialization error: {0}")]
    SerializationError(String),
    /// The newest stored id is already the largest representable id.
    #[error("No bookmark ids left after {0}")]
    IdsExhausted(i64),
    /// Reading or writing the collection failed.
    #[error("Bookmark storage error: {0}")]
    Storage(#[from] StorageError),
}

// === UrlError ===

/// Errors surfaced by the add-link form.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Please enter a URL")]
    Empty,
    #[error("Please enter a valid URL")]
    Invalid(String),
    /// A submission is already in flight.
    #[error("A link is already being saved")]
    Busy,
    #[error("Failed to add bookmark. Please try again.")]
    SaveFailed(#[from] BookmarkError),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
