use auth::Identity;
use auth::TokenPair;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::account::errors::AuthError;
use crate::account::errors::StoreError;

/// A stored record: a JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// Field-equality filter over documents, e.g. `{"email": "x@y.com"}`.
///
/// An empty filter matches every document in a collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Document);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on a single field.
    pub fn by(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().and(field, value)
    }

    /// Add another equality constraint.
    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn fields(&self) -> &Document {
        &self.0
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// True when every filter field is present in `document` with an equal value.
    pub fn matches(&self, document: &Document) -> bool {
        self.0
            .iter()
            .all(|(field, value)| document.get(field) == Some(value))
    }
}

/// Registered user as persisted in the credential store.
///
/// The uid is assigned once at signup and never reassigned. Only the hash of
/// the password is ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub uid: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Unix seconds
    pub created_at: i64,
    /// Unix seconds
    pub updated_at: i64,
}

impl User {
    pub const ID_FIELD: &'static str = "_id";
    pub const EMAIL_FIELD: &'static str = "email";
    pub const PHONE_FIELD: &'static str = "phone";

    pub fn identity(&self) -> Identity {
        Identity::new(
            self.uid.clone(),
            self.email.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
        )
    }

    pub fn to_document(&self) -> Result<Document, StoreError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(document)) => Ok(document),
            Ok(other) => Err(StoreError::InvalidRecord(format!(
                "user serialized to non-object: {}",
                other
            ))),
            Err(e) => Err(StoreError::InvalidRecord(e.to_string())),
        }
    }

    pub fn from_document(document: Document) -> Result<Self, StoreError> {
        serde_json::from_value(Value::Object(document))
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))
    }

    /// Partial update that rotates the stored tokens.
    pub fn token_update(tokens: &TokenPair, updated_at: i64) -> Document {
        let mut changes = Document::new();
        changes.insert("token".to_string(), tokens.access_token.clone().into());
        changes.insert(
            "refreshToken".to_string(),
            tokens.refresh_token.clone().into(),
        );
        changes.insert("updatedAt".to_string(), updated_at.into());
        changes
    }
}

/// Registration request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpInput {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
}

impl SignUpInput {
    /// Check that phone, email and password are present.
    ///
    /// # Errors
    /// * `Validation` - Lists every missing field
    pub fn validate(&self) -> Result<(), AuthError> {
        require(&[
            ("phone", &self.phone),
            ("email", &self.email),
            ("password", &self.password),
        ])
    }
}

/// Login request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl LoginInput {
    /// Check that email and password are present.
    ///
    /// # Errors
    /// * `Validation` - Lists every missing field
    pub fn validate(&self) -> Result<(), AuthError> {
        require(&[("email", &self.email), ("password", &self.password)])
    }
}

fn require(fields: &[(&str, &String)]) -> Result<(), AuthError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AuthError::Validation(missing.join(", ")))
    }
}

/// Result of a successful signup or login. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub uid: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub token: String,
    pub refresh_token: String,
}

impl AuthResponse {
    pub fn new(user: &User, tokens: TokenPair) -> Self {
        Self {
            uid: user.uid.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}
