use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::claims::Expiring;
use super::claims::Identity;
use super::claims::RefreshClaims;
use super::claims::SignedClaims;
use super::errors::JwtError;

/// Signs and validates expiring tokens with a symmetric secret.
///
/// Uses HS256 (HMAC with SHA-256). The keys are derived once from the secret
/// and never change afterwards, so a codec can be shared across tasks without
/// locking.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenCodec {
    /// Create a new token codec with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Rotating the secret invalidates every token issued under the old one
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Mint an access token for `identity`, valid for `ttl` from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed, or `now + ttl` is not a
    ///   representable instant
    pub fn mint_access(&self, identity: &Identity, ttl: Duration) -> Result<String, JwtError> {
        let claims = SignedClaims::new(identity, expiry_from_now(ttl)?);
        self.encode(&claims)
    }

    /// Mint a refresh token valid for `ttl` from now. Its body holds only `exp`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed, or `now + ttl` is not a
    ///   representable instant
    pub fn mint_refresh(&self, ttl: Duration) -> Result<String, JwtError> {
        let claims = RefreshClaims {
            exp: expiry_from_now(ttl)?,
        };
        self.encode(&claims)
    }

    /// Encode claims into a signed token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Validate an access token and return its identity claims.
    pub fn validate_access(&self, token: &str) -> Result<SignedClaims, JwtError> {
        self.validate(token)
    }

    /// Validate a refresh token.
    pub fn validate_refresh(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        self.validate(token)
    }

    /// Verify signature and expiry of a token and decode its claims.
    ///
    /// The signature is checked before the body is interpreted. A token whose
    /// `exp` is at or before the current instant is rejected even when its
    /// signature is intact.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not match the secret
    /// * `Malformed` - Token structure or claims cannot be decoded
    /// * `TokenExpired` - Expiration instant has passed
    pub fn validate<T>(&self, token: &str) -> Result<T, JwtError>
    where
        T: DeserializeOwned + Expiring,
    {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let claims = decode::<T>(token, &self.decoding_key, &validation)?.claims;

        // jsonwebtoken accepts exp == now; the boundary instant counts as expired here.
        if claims.is_expired(Utc::now().timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }
}

fn expiry_from_now(ttl: Duration) -> Result<i64, JwtError> {
    Utc::now()
        .checked_add_signed(ttl)
        .map(|expires_at| expires_at.timestamp())
        .ok_or_else(|| JwtError::EncodingFailed(format!("token lifetime {} out of range", ttl)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    fn identity() -> Identity {
        Identity::new("0b7c7f52", "test23@mail.com", "Rick", "")
    }

    /// Replace the character at `index` with a different base64url character.
    fn tamper(token: &str, index: usize) -> String {
        let mut bytes = token.as_bytes().to_vec();
        bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_mint_and_validate_access() {
        let codec = TokenCodec::new(SECRET);

        let token = codec
            .mint_access(&identity(), Duration::hours(24))
            .expect("Failed to mint token");
        assert_eq!(token.split('.').count(), 3);

        let claims = codec.validate_access(&token).expect("Failed to validate");
        assert_eq!(claims.identity(), identity());

        let expected_exp = (Utc::now() + Duration::hours(24)).timestamp();
        assert!((claims.exp - expected_exp).abs() <= 2);
    }

    #[test]
    fn test_mint_and_validate_refresh() {
        let codec = TokenCodec::new(SECRET);

        let token = codec
            .mint_refresh(Duration::hours(168))
            .expect("Failed to mint token");
        let claims = codec.validate_refresh(&token).expect("Failed to validate");

        let expected_exp = (Utc::now() + Duration::hours(168)).timestamp();
        assert!((claims.exp - expected_exp).abs() <= 2);
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_encoding_error() {
        let codec = TokenCodec::new(SECRET);
        let ttl = Duration::days(365 * 300_000);

        assert!(matches!(
            codec.mint_access(&identity(), ttl),
            Err(JwtError::EncodingFailed(_))
        ));
        assert!(matches!(
            codec.mint_refresh(ttl),
            Err(JwtError::EncodingFailed(_))
        ));
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.mint_refresh(Duration::hours(168)).unwrap();

        let result = codec.validate_access(&token);
        assert!(matches!(result, Err(JwtError::Malformed(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = TokenCodec::new(SECRET);
        let token = codec
            .mint_access(&identity(), Duration::seconds(-10))
            .unwrap();

        assert_eq!(codec.validate_access(&token), Err(JwtError::TokenExpired));
    }

    #[test]
    fn test_zero_ttl_is_already_expired() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.mint_refresh(Duration::zero()).unwrap();

        assert_eq!(codec.validate_refresh(&token), Err(JwtError::TokenExpired));
    }

    #[test]
    fn test_expired_token_with_wrong_secret_reports_signature() {
        let codec = TokenCodec::new(SECRET);
        let other = TokenCodec::new(b"secret2_at_least_32_bytes_long_key!");
        let token = other.mint_refresh(Duration::seconds(-10)).unwrap();

        assert_eq!(
            codec.validate_refresh(&token),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.mint_access(&identity(), Duration::hours(1)).unwrap();

        let payload_start = token.find('.').unwrap() + 1;
        let tampered = tamper(&token, payload_start + 5);

        assert_eq!(
            codec.validate_access(&tampered),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.mint_access(&identity(), Duration::hours(1)).unwrap();

        let signature_start = token.rfind('.').unwrap() + 1;
        let tampered = tamper(&token, signature_start);

        assert_eq!(
            codec.validate_access(&tampered),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let codec1 = TokenCodec::new(b"secret1_at_least_32_bytes_long_key!");
        let codec2 = TokenCodec::new(b"secret2_at_least_32_bytes_long_key!");

        let token = codec1.mint_access(&identity(), Duration::hours(1)).unwrap();

        assert_eq!(
            codec2.validate_access(&token),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn test_validate_garbage() {
        let codec = TokenCodec::new(SECRET);

        for token in ["invalid.token.here", "", "no-dots-at-all"] {
            assert!(
                matches!(codec.validate_access(token), Err(JwtError::Malformed(_))),
                "{token}"
            );
        }
    }
}
