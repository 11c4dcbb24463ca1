use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{tokens, users, workouts};
use crate::middleware::{authenticate, require_user};
use crate::store::memory::MemoryStore;
use crate::store::token::PostgresTokenStore;
use crate::store::user::PostgresUserStore;
use crate::store::workout::PostgresWorkoutStore;
use crate::store::{TokenStore, UserStore, WorkoutStore};

/// Shared handler state: the three store capabilities behind trait objects,
/// so the Postgres backend can be swapped for the in-memory one in tests.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<dyn TokenStore>,
    pub workouts: Arc<dyn WorkoutStore>,
}

impl AppState {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserStore::new(pool.clone())),
            tokens: Arc::new(PostgresTokenStore::new(pool.clone())),
            workouts: Arc::new(PostgresWorkoutStore::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            tokens: store.clone(),
            workouts: store,
        }
    }
}

pub fn router(state: AppState) -> Router {
    // Workout CRUD requires an authenticated identity.
    let workout_routes = Router::new()
        .route(
            "/workouts",
            get(workouts::list_workouts).post(workouts::create_workout),
        )
        .route(
            "/workouts/:id",
            get(workouts::get_workout)
                .patch(workouts::update_workout)
                .delete(workouts::delete_workout),
        )
        .route_layer(from_fn(require_user));

    Router::new()
        .route("/health", get(health))
        .route("/users", post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/login", post(tokens::create_token))
        .merge(workout_routes)
        .layer(from_fn_with_state(state.clone(), authenticate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
