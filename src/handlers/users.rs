use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::app::AppState;
use crate::error::ApiError;
use crate::store::{NewUser, Password, UpdateUser};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex")
});

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: String,
}

fn validate_register(req: &RegisterUserRequest) -> Result<(), ApiError> {
    if req.name.is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    if req.email.is_empty() {
        return Err(ApiError::bad_request("email is required"));
    }
    if !EMAIL_RE.is_match(&req.email) {
        return Err(ApiError::bad_request("invalid email format"));
    }
    if req.password.is_empty() {
        return Err(ApiError::bad_request("password is required"));
    }
    if req.password.len() < 6 {
        return Err(ApiError::bad_request(
            "password must be at least 6 characters long",
        ));
    }
    Ok(())
}

/// POST /users - register a new user
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_register(&req)?;

    let mut password = Password::default();
    password.set(&req.password)?;

    let user = state
        .users
        .create_user(NewUser {
            name: req.name,
            email: req.email,
            bio: req.bio,
            password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("user with id {id} not found")))?;

    Ok(Json(json!({ "user": user })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub bio: String,
}

/// PATCH /users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !EMAIL_RE.is_match(&req.email) {
        return Err(ApiError::bad_request("invalid email format"));
    }

    let user = state
        .users
        .update_user(
            id,
            UpdateUser {
                name: req.name,
                email: req.email,
                bio: req.bio,
            },
        )
        .await?;

    Ok(Json(json!({ "user": user })))
}

/// DELETE /users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.users.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
