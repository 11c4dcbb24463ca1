mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{app, authed_request, register_and_login, send};

#[tokio::test]
async fn workout_crud_round_trip() -> Result<()> {
    let app = app();
    let token = register_and_login(&app, "crud@example.com", "hunter22").await?;

    // Create.
    let (status, _, body) = send(
        &app,
        authed_request(
            "POST",
            "/workouts",
            &token,
            Some(json!({
                "title": "Morning Run",
                "description": "A refreshing morning run",
                "duration_minutes": 30,
                "calories_burned": 300,
                "entries": [
                    { "exercise_name": "Running", "sets": 1, "reps": 300, "weight": 210.0 }
                ]
            })),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["workout"]["id"].as_i64().expect("workout id");
    assert!(id > 0);

    // Read back.
    let (status, _, body) = send(
        &app,
        authed_request("GET", &format!("/workouts/{id}"), &token, None),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let workout = &body["workout"];
    assert_eq!(workout["title"], "Morning Run");
    assert_eq!(workout["description"], "A refreshing morning run");
    assert_eq!(workout["duration_minutes"], 30);
    assert_eq!(workout["calories_burned"], 300);
    let entries = workout["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["exercise_name"], "Running");
    assert_eq!(entries[0]["sets"], 1);
    assert_eq!(entries[0]["reps"], 300);
    assert_eq!(entries[0]["weight"], 210.0);

    // Delete, then reading back is a 404.
    let (status, _, _) = send(
        &app,
        authed_request("DELETE", &format!("/workouts/{id}"), &token, None),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(
        &app,
        authed_request("GET", &format!("/workouts/{id}"), &token, None),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn create_with_empty_title_is_a_validation_error() -> Result<()> {
    let app = app();
    let token = register_and_login(&app, "validation@example.com", "hunter22").await?;

    let (status, _, body) = send(
        &app,
        authed_request(
            "POST",
            "/workouts",
            &token,
            Some(json!({
                "title": "",
                "duration_minutes": 30,
                "entries": [{ "exercise_name": "Running", "sets": 1 }]
            })),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "workout title is required");

    // Nothing was written.
    let (_, _, body) = send(&app, authed_request("GET", "/workouts", &token, None)).await?;
    assert_eq!(body["workouts"].as_array().expect("workouts").len(), 0);
    Ok(())
}

#[tokio::test]
async fn create_with_negative_duration_is_a_validation_error() -> Result<()> {
    let app = app();
    let token = register_and_login(&app, "negative@example.com", "hunter22").await?;

    let (status, _, body) = send(
        &app,
        authed_request(
            "POST",
            "/workouts",
            &token,
            Some(json!({ "title": "Evening Walk", "duration_minutes": -20 })),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "workout duration cannot be negative");
    Ok(())
}

#[tokio::test]
async fn patch_with_shorter_entry_list_replaces_all_entries() -> Result<()> {
    let app = app();
    let token = register_and_login(&app, "replace@example.com", "hunter22").await?;

    let (status, _, body) = send(
        &app,
        authed_request(
            "POST",
            "/workouts",
            &token,
            Some(json!({
                "title": "Leg Day",
                "duration_minutes": 45,
                "entries": [
                    { "exercise_name": "Squats", "sets": 5, "reps": 5, "order_index": 0 },
                    { "exercise_name": "Lunges", "sets": 3, "reps": 12, "order_index": 1 },
                    { "exercise_name": "Calf Raises", "sets": 3, "reps": 20, "order_index": 2 }
                ]
            })),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["workout"]["id"].as_i64().expect("workout id");

    let (status, _, _) = send(
        &app,
        authed_request(
            "PATCH",
            &format!("/workouts/{id}"),
            &token,
            Some(json!({
                "entries": [
                    { "exercise_name": "Squats", "sets": 5, "reps": 5, "order_index": 0 }
                ]
            })),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, _, body) = send(
        &app,
        authed_request("GET", &format!("/workouts/{id}"), &token, None),
    )
    .await?;
    let entries = body["workout"]["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["exercise_name"], "Squats");
    // Untouched header fields survived the patch.
    assert_eq!(body["workout"]["title"], "Leg Day");
    assert_eq!(body["workout"]["duration_minutes"], 45);
    Ok(())
}

#[tokio::test]
async fn patch_cannot_blank_the_title() -> Result<()> {
    let app = app();
    let token = register_and_login(&app, "blank@example.com", "hunter22").await?;

    let (status, _, body) = send(
        &app,
        authed_request(
            "POST",
            "/workouts",
            &token,
            Some(json!({ "title": "Leg Day", "duration_minutes": 45 })),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["workout"]["id"].as_i64().expect("workout id");

    let (status, _, body) = send(
        &app,
        authed_request(
            "PATCH",
            &format!("/workouts/{id}"),
            &token,
            Some(json!({ "title": "" })),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "workout title is required");

    let (_, _, body) = send(
        &app,
        authed_request("GET", &format!("/workouts/{id}"), &token, None),
    )
    .await?;
    assert_eq!(body["workout"]["title"], "Leg Day");
    Ok(())
}

#[tokio::test]
async fn delete_missing_workout_is_not_found() -> Result<()> {
    let app = app();
    let token = register_and_login(&app, "missing@example.com", "hunter22").await?;

    let (status, _, _) = send(
        &app,
        authed_request("DELETE", "/workouts/9999", &token, None),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn list_returns_all_workouts_with_entries() -> Result<()> {
    let app = app();
    let token = register_and_login(&app, "list@example.com", "hunter22").await?;

    for title in ["First", "Second"] {
        let (status, _, _) = send(
            &app,
            authed_request(
                "POST",
                "/workouts",
                &token,
                Some(json!({
                    "title": title,
                    "entries": [{ "exercise_name": "Rowing", "sets": 1 }]
                })),
            ),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _, body) = send(&app, authed_request("GET", "/workouts", &token, None)).await?;
    assert_eq!(status, StatusCode::OK);
    let workouts = body["workouts"].as_array().expect("workouts");
    assert_eq!(workouts.len(), 2);
    assert!(workouts
        .iter()
        .all(|w| w["entries"].as_array().is_some_and(|e| e.len() == 1)));
    Ok(())
}
