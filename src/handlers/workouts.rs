use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::app::AppState;
use crate::error::ApiError;
use crate::store::{Workout, WorkoutEntry};

/// POST /workouts
pub async fn create_workout(
    State(state): State<AppState>,
    Json(workout): Json<Workout>,
) -> Result<impl IntoResponse, ApiError> {
    let workout = state.workouts.create_workout(workout).await?;
    Ok((StatusCode::CREATED, Json(json!({ "workout": workout }))))
}

/// GET /workouts/:id
pub async fn get_workout(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let workout = state
        .workouts
        .get_workout_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("workout with id {id} not found")))?;

    Ok(Json(json!({ "workout": workout })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkoutRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub calories_burned: Option<i32>,
    #[serde(default)]
    pub entries: Option<Vec<WorkoutEntry>>,
}

/// PATCH /workouts/:id - partial header fields merge over the existing
/// workout; a provided entry list replaces the stored one wholesale.
pub async fn update_workout(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateWorkoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut workout = state
        .workouts
        .get_workout_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("workout with id {id} not found")))?;

    if let Some(title) = req.title {
        workout.title = title;
    }
    if let Some(description) = req.description {
        workout.description = description;
    }
    if let Some(duration_minutes) = req.duration_minutes {
        workout.duration_minutes = duration_minutes;
    }
    if let Some(calories_burned) = req.calories_burned {
        workout.calories_burned = calories_burned;
    }
    if let Some(entries) = req.entries {
        workout.entries = entries;
    }

    let workout = state.workouts.update_workout(id, workout).await?;
    Ok(Json(json!({ "workout": workout })))
}

/// DELETE /workouts/:id
pub async fn delete_workout(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.workouts.delete_workout(id).await?;
    Ok(Json(json!({
        "message": format!("workout with id {id} deleted")
    })))
}

/// GET /workouts
pub async fn list_workouts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let workouts = state.workouts.get_workouts().await?;
    Ok(Json(json!({ "workouts": workouts })))
}
