use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Duration;
use serde::Deserialize;
use serde_json::json;

use crate::app::AppState;
use crate::error::ApiError;
use crate::store::SCOPE_AUTH;

/// Auth tokens minted at login live this long; expiry is enforced at lookup.
const TOKEN_TTL_HOURS: i64 = 24;

/// Unknown email and wrong password produce the same outward failure.
const INVALID_CREDENTIALS: &str = "invalid email or password";

#[derive(Debug, Deserialize)]
pub struct CreateTokenRequest {
    pub email: String,
    pub password: String,
}

/// POST /login - verify credentials and mint a bearer token. The plaintext
/// appears only in this response and is never retrievable again.
pub async fn create_token(
    State(state): State<AppState>,
    Json(req): Json<CreateTokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Rejected before any lookup so the response never depends on whether
    // the email exists.
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("email and password are required"));
    }

    let user = state
        .users
        .get_user_by_email(&req.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    if !user.password.check(&req.password)? {
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = state
        .tokens
        .issue(user.id, Duration::hours(TOKEN_TTL_HOURS), SCOPE_AUTH)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "token": token }))))
}
