//! Credential primitives library
//!
//! Provides the building blocks of a stateless authentication layer:
//! - Password hashing (Argon2id, fixed work factor, fresh salt per hash)
//! - Signed, expiring tokens (HS256): an identity-bearing access token and an
//!   identity-free refresh token
//! - Authentication coordination
//!
//! Tokens are self-contained. Validity depends only on the signature and the
//! `exp` claim, so no session table is consulted and revocation happens only
//! through expiry or by rotating the secret.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{Identity, TokenCodec};
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let identity = Identity::new("user123", "alice@example.com", "Alice", "Liddell");
//! let token = codec.mint_access(&identity, Duration::hours(24)).unwrap();
//! let claims = codec.validate_access(&token).unwrap();
//! assert_eq!(claims.uid, "user123");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, Identity};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and mint a token pair
//! let identity = Identity::new("user123", "alice@example.com", "Alice", "Liddell");
//! let tokens = auth.authenticate("password123", &hash, &identity).unwrap();
//!
//! // Validate the access token
//! let claims = auth.validate_token(&tokens.access_token).unwrap();
//! assert_eq!(claims.email, "alice@example.com");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::TokenPair;
pub use authenticator::TokenPolicy;
pub use authenticator::TokenPolicyError;
pub use jwt::Identity;
pub use jwt::JwtError;
pub use jwt::RefreshClaims;
pub use jwt::SignedClaims;
pub use jwt::TokenCodec;
pub use password::PasswordError;
pub use password::PasswordHasher;
