use async_trait::async_trait;

use crate::account::errors::AuthError;
use crate::account::errors::StoreError;
use crate::account::models::AuthResponse;
use crate::account::models::Document;
use crate::account::models::Filter;
use crate::account::models::LoginInput;
use crate::account::models::SignUpInput;

/// Port for credential issuance operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new user and issue its first token pair.
    ///
    /// # Arguments
    /// * `input` - Names, phone, email and plaintext password
    ///
    /// # Returns
    /// Identity of the created user with access and refresh tokens
    ///
    /// # Errors
    /// * `Validation` - Phone, email or password missing
    /// * `DuplicatePhone` - Phone number is already registered
    /// * `DuplicateEmail` - Email is already registered
    /// * `Hashing` - Password hashing failed
    /// * `Token` - Token generation failed
    /// * `Persistence` - Store rejected the new record
    async fn sign_up(&self, input: SignUpInput) -> Result<AuthResponse, AuthError>;

    /// Authenticate an existing user and rotate its tokens.
    ///
    /// # Arguments
    /// * `input` - Email and plaintext password
    ///
    /// # Returns
    /// Identity of the user with a freshly minted token pair
    ///
    /// # Errors
    /// * `Validation` - Email or password missing
    /// * `NotFound` - No user with this email
    /// * `InvalidCredentials` - Password does not match
    /// * `Verification` - Stored hash is unusable
    /// * `Persistence` - Rotated tokens could not be stored
    async fn login(&self, input: LoginInput) -> Result<AuthResponse, AuthError>;
}

/// Document store holding user records.
///
/// Records live in named collections and are addressed by field-equality
/// filters. Implementations decide how much consistency they guarantee; the
/// service does not assume any unique constraint exists.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Insert a record.
    ///
    /// # Returns
    /// Identifier of the stored record (its `_id` field)
    ///
    /// # Errors
    /// * `Conflict` - A unique field enforced by the backend already holds the value
    /// * `Backend` - Store operation failed
    async fn create(&self, collection: &str, record: Document) -> Result<String, StoreError>;

    /// Fetch every record matching `filter`. An empty result means not found.
    async fn read(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    /// Fetch a single record matching `filter`.
    ///
    /// # Errors
    /// * `NotFound` - No record matches
    /// * `Backend` - Store operation failed
    async fn read_one(&self, collection: &str, filter: &Filter) -> Result<Document, StoreError>;

    /// Merge `changes` into every record matching `filter`.
    ///
    /// # Returns
    /// Number of records updated
    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Document,
    ) -> Result<u64, StoreError>;

    /// Remove every record matching `filter`.
    ///
    /// # Returns
    /// Number of records removed
    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;
}
