use chrono::Duration;

use crate::jwt::Identity;
use crate::jwt::JwtError;
use crate::jwt::RefreshClaims;
use crate::jwt::SignedClaims;
use crate::jwt::TokenCodec;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Access tokens live for one day.
pub const ACCESS_TOKEN_TTL_HOURS: i64 = 24;
/// Refresh tokens live for one week.
pub const REFRESH_TOKEN_TTL_HOURS: i64 = 168;
/// Longest accepted token lifetime (ten years).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

/// Authentication coordinator combining password verification and token issuance.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
    policy: TokenPolicy,
}

/// Lifetimes of the two tokens minted per authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenPolicy {
    /// Build a policy from lifetimes in hours.
    ///
    /// # Errors
    /// * `TtlOutOfRange` - A lifetime is not in `1..=MAX_TOKEN_TTL_HOURS`
    pub fn from_hours(access_hours: i64, refresh_hours: i64) -> Result<Self, TokenPolicyError> {
        Ok(Self {
            access_ttl: ttl_from_hours(access_hours)?,
            refresh_ttl: ttl_from_hours(refresh_hours)?,
        })
    }
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            access_ttl: Duration::hours(ACCESS_TOKEN_TTL_HOURS),
            refresh_ttl: Duration::hours(REFRESH_TOKEN_TTL_HOURS),
        }
    }
}

fn ttl_from_hours(hours: i64) -> Result<Duration, TokenPolicyError> {
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        return Err(TokenPolicyError::TtlOutOfRange(hours));
    }

    Duration::try_hours(hours).ok_or(TokenPolicyError::TtlOutOfRange(hours))
}

/// Rejected token lifetime.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenPolicyError {
    #[error("Token lifetime must be between 1 and {max} hours, got {0}", max = MAX_TOKEN_TTL_HOURS)]
    TtlOutOfRange(i64),
}

/// Access and refresh token minted together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator with the default token lifetimes.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_codec: TokenCodec::new(jwt_secret),
            policy: TokenPolicy::default(),
        }
    }

    /// Replace the token lifetimes.
    pub fn with_policy(mut self, policy: TokenPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> TokenPolicy {
        self.policy
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and mint a fresh token pair.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `identity` - Identity to embed in the access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is malformed or verification failed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        identity: &Identity,
    ) -> Result<TokenPair, AuthenticationError> {
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_tokens(identity)?)
    }

    /// Mint an access token for `identity` and an identity-free refresh token.
    ///
    /// Useful when authentication has already been established by other means,
    /// such as right after registration.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn issue_tokens(&self, identity: &Identity) -> Result<TokenPair, JwtError> {
        let access_token = self
            .token_codec
            .mint_access(identity, self.policy.access_ttl)?;
        let refresh_token = self.token_codec.mint_refresh(self.policy.refresh_ttl)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Validate an access token and decode its identity claims.
    ///
    /// # Errors
    /// * `JwtError` - Signature, structure or expiry check failed
    pub fn validate_token(&self, token: &str) -> Result<SignedClaims, JwtError> {
        self.token_codec.validate_access(token)
    }

    /// Validate a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        self.token_codec.validate_refresh(token)
    }
}
