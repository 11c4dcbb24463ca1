use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::store::{User, SCOPE_AUTH};

/// The identity resolved for a request. Attached to request extensions by
/// [`authenticate`] exactly once; immutable afterwards.
#[derive(Debug, Clone)]
pub enum Identity {
    Anonymous,
    Authenticated(User),
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(user) => Some(user),
        }
    }
}

/// Deliberately undifferentiated: absent, expired, wrong-scope, and malformed
/// credentials all produce the same message.
const INVALID_TOKEN: &str = "invalid or expired token";

/// Resolves the bearer credential (if any) to an [`Identity`] and attaches it
/// to the request. Requests without a credential proceed as anonymous;
/// malformed or unresolvable credentials are rejected with 401 before the
/// downstream handler runs. Every response, rejections included, carries
/// `Vary: Authorization` so intermediary caches never cross callers.
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    // The request body is !Sync, so holding &Request across the resolution
    // await would make this future !Send; only the headers are needed.
    let headers = request.headers().clone();
    let mut response = match resolve_identity(&state, &headers).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    };

    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    response
}

async fn resolve_identity(state: &AppState, headers: &HeaderMap) -> Result<Identity, ApiError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(Identity::Anonymous);
    };

    let value = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized(INVALID_TOKEN))?;

    // Exactly "Bearer <token>"; anything else is rejected without a lookup.
    let parts: Vec<&str> = value.split(' ').collect();
    if parts.len() != 2 || parts[0] != "Bearer" {
        return Err(ApiError::unauthorized(INVALID_TOKEN));
    }

    match state.tokens.resolve(SCOPE_AUTH, parts[1]).await {
        Ok(Some(user)) => Ok(Identity::Authenticated(user)),
        Ok(None) => Err(ApiError::unauthorized(INVALID_TOKEN)),
        Err(err) => {
            // Fail closed: a backend failure during resolution is a 401, not
            // a 500, so the auth decision never leaks backend state.
            tracing::error!("token resolution failed: {err}");
            Err(ApiError::unauthorized(INVALID_TOKEN))
        }
    }
}

/// Access gate: rejects anonymous requests with 401; the wrapped handler is
/// never invoked for them.
pub async fn require_user(request: Request, next: Next) -> Response {
    match request.extensions().get::<Identity>() {
        Some(Identity::Authenticated(_)) => next.run(request).await,
        _ => ApiError::unauthorized("you must be logged in to access this resource")
            .into_response(),
    }
}
