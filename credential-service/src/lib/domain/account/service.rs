use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::TokenPair;
use chrono::Utc;
use uuid::Uuid;

use crate::account::errors::AuthError;
use crate::account::errors::StoreError;
use crate::account::models::AuthResponse;
use crate::account::models::Filter;
use crate::account::models::LoginInput;
use crate::account::models::SignUpInput;
use crate::account::models::User;
use crate::account::ports::AuthServicePort;
use crate::account::ports::CredentialStore;

/// Domain service implementation for signup and login.
///
/// Holds no per-request state, so one instance serves concurrent requests.
/// Email and phone uniqueness is checked before insert; the check and the
/// insert are separate store calls, so two concurrent signups with the same
/// email can both pass the check unless the store itself enforces the
/// constraint (see [`StoreError::Conflict`]).
pub struct AuthService<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    authenticator: Arc<Authenticator>,
    collection: String,
}

impl<S> AuthService<S>
where
    S: CredentialStore,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Credential store implementation
    /// * `authenticator` - Password hashing and token issuance
    /// * `collection` - Name of the collection holding user records
    pub fn new(
        store: Arc<S>,
        authenticator: Arc<Authenticator>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            authenticator,
            collection: collection.into(),
        }
    }

    async fn exists(&self, field: &str, value: &str) -> Result<bool, AuthError> {
        let matches = self
            .store
            .read(&self.collection, &Filter::by(field, value))
            .await?;

        Ok(!matches.is_empty())
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await?
            .map_err(AuthError::Hashing)
    }

    async fn verify_and_issue(&self, password: String, user: &User) -> Result<TokenPair, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);
        let stored_hash = user.password_hash.clone();
        let identity = user.identity();

        tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&password, &stored_hash, &identity)
        })
        .await?
        .map_err(|e| match e {
            AuthenticationError::InvalidCredentials => AuthError::InvalidCredentials,
            AuthenticationError::PasswordError(err) => AuthError::Verification(err),
            AuthenticationError::JwtError(err) => AuthError::Token(err),
        })
    }

    /// Persist a rotated token pair for the user with `uid`.
    async fn update_all_tokens(&self, uid: &str, tokens: &TokenPair) -> Result<(), AuthError> {
        let changes = User::token_update(tokens, Utc::now().timestamp());

        let updated = self
            .store
            .update(&self.collection, &Filter::by(User::ID_FIELD, uid), changes)
            .await
            .map_err(AuthError::Persistence)?;

        if updated == 0 {
            return Err(AuthError::Persistence(StoreError::NotFound(
                self.collection.clone(),
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl<S> AuthServicePort for AuthService<S>
where
    S: CredentialStore,
{
    async fn sign_up(&self, input: SignUpInput) -> Result<AuthResponse, AuthError> {
        input.validate()?;

        if self.exists(User::PHONE_FIELD, &input.phone).await? {
            tracing::info!("Signup rejected: phone number already registered");
            return Err(AuthError::DuplicatePhone(input.phone));
        }

        if self.exists(User::EMAIL_FIELD, &input.email).await? {
            tracing::info!("Signup rejected: email already registered");
            return Err(AuthError::DuplicateEmail(input.email));
        }

        let SignUpInput {
            first_name,
            last_name,
            phone,
            email,
            password,
        } = input;

        let password_hash = self.hash_password(password).await?;

        let now = Utc::now().timestamp();
        let mut user = User {
            uid: Uuid::new_v4().to_string(),
            first_name,
            last_name,
            phone,
            email,
            password_hash,
            token: String::new(),
            refresh_token: String::new(),
            created_at: now,
            updated_at: now,
        };

        // Minting failures abort here, before anything is written.
        let tokens = self.authenticator.issue_tokens(&user.identity())?;
        user.token = tokens.access_token.clone();
        user.refresh_token = tokens.refresh_token.clone();

        let document = user.to_document().map_err(AuthError::Persistence)?;

        self.store
            .create(&self.collection, document)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(field) if field == User::PHONE_FIELD => {
                    AuthError::DuplicatePhone(user.phone.clone())
                }
                StoreError::Conflict(field) if field == User::EMAIL_FIELD => {
                    AuthError::DuplicateEmail(user.email.clone())
                }
                other => AuthError::Persistence(other),
            })?;

        tracing::info!(uid = %user.uid, "User signed up");

        Ok(AuthResponse::new(&user, tokens))
    }

    async fn login(&self, input: LoginInput) -> Result<AuthResponse, AuthError> {
        input.validate()?;

        let LoginInput { email, password } = input;

        let document = self
            .store
            .read_one(&self.collection, &Filter::by(User::EMAIL_FIELD, email.as_str()))
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => AuthError::NotFound(email.clone()),
                other => AuthError::Store(other),
            })?;

        let user = User::from_document(document)?;

        let tokens = self.verify_and_issue(password, &user).await?;

        self.update_all_tokens(&user.uid, &tokens).await?;

        tracing::info!(uid = %user.uid, "User logged in");

        Ok(AuthResponse::new(&user, tokens))
    }
}
