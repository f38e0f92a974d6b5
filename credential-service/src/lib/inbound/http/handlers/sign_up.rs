use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::models::AuthResponse;
use crate::domain::account::models::SignUpInput;
use crate::inbound::http::router::AppState;

pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignUpRequestBody>,
) -> Result<ApiSuccess<AuthResponse>, ApiError> {
    state
        .auth_service
        .sign_up(body.into_input())
        .await
        .map_err(ApiError::from)
        .map(|response| ApiSuccess::new(StatusCode::CREATED, response))
}

/// HTTP request body for registering an account (raw JSON)
///
/// Absent fields deserialize as empty strings and are reported by validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignUpRequestBody {
    first_name: String,
    last_name: String,
    phone: String,
    email: String,
    password: String,
}

impl SignUpRequestBody {
    fn into_input(self) -> SignUpInput {
        SignUpInput {
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            email: self.email,
            password: self.password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_wire_names() {
        let body: SignUpRequestBody = serde_json::from_str(
            r#"{"firstName":"Rick","phone":"000","email":"a@b.com","password":"pw"}"#,
        )
        .unwrap();

        let input = body.into_input();
        assert_eq!(input.first_name, "Rick");
        assert_eq!(input.last_name, "");
        assert!(input.validate().is_ok());
    }
}
