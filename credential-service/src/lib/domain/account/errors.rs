use auth::JwtError;
use auth::PasswordError;
use thiserror::Error;

/// Error reported by a credential store backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("No record in `{0}` matches the filter")]
    NotFound(String),

    /// The backend refused a write because a unique field already holds the value.
    #[error("Unique constraint violated on field: {0}")]
    Conflict(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Top-level error for signup and login.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Input errors
    #[error("Missing required fields: {0}")]
    Validation(String),

    // Domain-level errors
    #[error("A user with this phone number already exists: {0}")]
    DuplicatePhone(String),

    #[error("A user with this email already exists: {0}")]
    DuplicateEmail(String),

    #[error("User not found with email: {0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Cryptographic primitive failures
    #[error("Unable to hash password: {0}")]
    Hashing(PasswordError),

    #[error("Unable to verify password: {0}")]
    Verification(PasswordError),

    #[error("Could not generate auth tokens: {0}")]
    Token(#[from] JwtError),

    // Infrastructure errors
    #[error("Unable to persist user: {0}")]
    Persistence(StoreError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::Unknown(format!("Blocking task failed: {}", err))
    }
}
