use serde::Deserialize;
use serde::Serialize;

/// Claims that carry an absolute expiration instant.
pub trait Expiring {
    /// Expiration time (Unix timestamp, seconds).
    fn expires_at(&self) -> i64;

    /// A token is expired once the current instant reaches its expiration.
    fn is_expired(&self, current_timestamp: i64) -> bool {
        self.expires_at() <= current_timestamp
    }
}

/// Identity of an authenticated user, as embedded in an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Identity {
    pub fn new(
        uid: impl Into<String>,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

/// Access token body.
///
/// Every identity field is required on decode, so a refresh token (which
/// carries only `exp`) can never be read as an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignedClaims {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub uid: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SignedClaims {
    pub fn new(identity: &Identity, exp: i64) -> Self {
        Self {
            email: identity.email.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            uid: identity.uid.clone(),
            exp,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::new(
            self.uid.clone(),
            self.email.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
        )
    }
}

impl Expiring for SignedClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// Refresh token body. Proves only that the holder authenticated recently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    pub exp: i64,
}

impl Expiring for RefreshClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity::new("uid-1", "a@b.com", "Rick", "Sanchez")
    }

    #[test]
    fn test_signed_claims_wire_names() {
        let claims = SignedClaims::new(&identity(), 1234567890);
        let value = serde_json::to_value(&claims).unwrap();

        assert_eq!(value["email"], "a@b.com");
        assert_eq!(value["firstName"], "Rick");
        assert_eq!(value["lastName"], "Sanchez");
        assert_eq!(value["uid"], "uid-1");
        assert_eq!(value["exp"], 1234567890);
    }

    #[test]
    fn test_identity_round_trip() {
        let claims = SignedClaims::new(&identity(), 1);
        assert_eq!(claims.identity(), identity());
    }

    #[test]
    fn test_refresh_body_does_not_decode_as_access() {
        let body = serde_json::to_string(&RefreshClaims { exp: 1000 }).unwrap();
        assert_eq!(body, r#"{"exp":1000}"#);
        assert!(serde_json::from_str::<SignedClaims>(&body).is_err());
    }

    #[test]
    fn test_is_expired() {
        let claims = RefreshClaims { exp: 1000 };

        assert!(!claims.is_expired(999));
        assert!(claims.is_expired(1000)); // Exactly at expiration
        assert!(claims.is_expired(1001));
    }
}
