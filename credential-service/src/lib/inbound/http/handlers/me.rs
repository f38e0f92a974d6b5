use axum::http::StatusCode;
use axum::Extension;

use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedUser;

/// Echo the identity carried by the bearer token.
pub async fn me(
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiSuccess<AuthenticatedUser> {
    ApiSuccess::new(StatusCode::OK, user)
}
