use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::StoreError;

/// Aggregate root: a workout header plus its exclusively-owned entries.
/// Entries are totally ordered by `order_index`, not by storage order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration_minutes: i32,
    #[serde(default)]
    pub calories_burned: i32,
    #[serde(default)]
    pub entries: Vec<WorkoutEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WorkoutEntry {
    #[serde(default)]
    pub id: i64,
    pub exercise_name: String,
    pub sets: i32,
    #[serde(default)]
    pub reps: Option<i32>,
    #[serde(default)]
    pub duration_seconds: Option<i32>,
    #[serde(default, rename = "weight")]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub order_index: i32,
}

impl Workout {
    /// Reject malformed aggregates before any storage is touched.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.title.is_empty() {
            return Err(StoreError::validation("workout title is required"));
        }
        if self.duration_minutes < 0 {
            return Err(StoreError::validation("workout duration cannot be negative"));
        }
        Ok(())
    }
}

#[async_trait]
pub trait WorkoutStore: Send + Sync {
    /// Persist the aggregate atomically; on any failure nothing is written.
    async fn create_workout(&self, workout: Workout) -> Result<Workout, StoreError>;

    /// Load the aggregate with entries ordered by their order index.
    async fn get_workout_by_id(&self, id: i64) -> Result<Option<Workout>, StoreError>;

    /// Overwrite the header and replace all entries with the provided list,
    /// atomically. Entries missing from the new list are deleted.
    async fn update_workout(&self, id: i64, workout: Workout) -> Result<Workout, StoreError>;

    /// Delete entries then header atomically; not-found if the header was absent.
    async fn delete_workout(&self, id: i64) -> Result<(), StoreError>;

    /// All workouts with entries eagerly attached. No pagination.
    async fn get_workouts(&self) -> Result<Vec<Workout>, StoreError>;
}

#[derive(FromRow)]
struct WorkoutRow {
    id: i64,
    title: String,
    description: String,
    duration_minutes: i32,
    calories_burned: i32,
}

impl WorkoutRow {
    fn into_workout(self, entries: Vec<WorkoutEntry>) -> Workout {
        Workout {
            id: self.id,
            title: self.title,
            description: self.description,
            duration_minutes: self.duration_minutes,
            calories_burned: self.calories_burned,
            entries,
        }
    }
}

pub struct PostgresWorkoutStore {
    pool: PgPool,
}

impl PostgresWorkoutStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_entries(
        tx: &mut Transaction<'_, Postgres>,
        workout_id: i64,
        entries: &mut [WorkoutEntry],
    ) -> Result<(), StoreError> {
        for entry in entries.iter_mut() {
            let (id,): (i64,) = sqlx::query_as(
                r#"
                INSERT INTO workout_entries
                    (workout_id, exercise_name, sets, reps, duration_seconds, weight_kg, notes, order_index)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id
                "#,
            )
            .bind(workout_id)
            .bind(&entry.exercise_name)
            .bind(entry.sets)
            .bind(entry.reps)
            .bind(entry.duration_seconds)
            .bind(entry.weight_kg)
            .bind(entry.notes.as_deref())
            .bind(entry.order_index)
            .fetch_one(&mut **tx)
            .await?;
            entry.id = id;
        }
        Ok(())
    }

    async fn entries_for(&self, workout_id: i64) -> Result<Vec<WorkoutEntry>, StoreError> {
        let entries: Vec<WorkoutEntry> = sqlx::query_as(
            r#"
            SELECT id, exercise_name, sets, reps, duration_seconds, weight_kg, notes, order_index
            FROM workout_entries
            WHERE workout_id = $1
            ORDER BY order_index
            "#,
        )
        .bind(workout_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}

#[async_trait]
impl WorkoutStore for PostgresWorkoutStore {
    async fn create_workout(&self, mut workout: Workout) -> Result<Workout, StoreError> {
        workout.validate()?;

        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO workouts (title, description, duration_minutes, calories_burned)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&workout.title)
        .bind(&workout.description)
        .bind(workout.duration_minutes)
        .bind(workout.calories_burned)
        .fetch_one(&mut *tx)
        .await?;
        workout.id = id;

        Self::insert_entries(&mut tx, id, &mut workout.entries).await?;

        tx.commit().await?;
        Ok(workout)
    }

    async fn get_workout_by_id(&self, id: i64) -> Result<Option<Workout>, StoreError> {
        let row: Option<WorkoutRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, duration_minutes, calories_burned
            FROM workouts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let entries = self.entries_for(id).await?;
        Ok(Some(row.into_workout(entries)))
    }

    async fn update_workout(&self, id: i64, mut workout: Workout) -> Result<Workout, StoreError> {
        workout.validate()?;

        let mut tx = self.pool.begin().await?;

        // Existence check without a row lock; concurrent update/delete on the
        // same id is last-writer-wins.
        let result = sqlx::query(
            r#"
            UPDATE workouts
            SET title = $1, description = $2, duration_minutes = $3, calories_burned = $4
            WHERE id = $5
            "#,
        )
        .bind(&workout.title)
        .bind(&workout.description)
        .bind(workout.duration_minutes)
        .bind(workout.calories_burned)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!(
                "workout with id {id} not found"
            )));
        }

        sqlx::query("DELETE FROM workout_entries WHERE workout_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        Self::insert_entries(&mut tx, id, &mut workout.entries).await?;

        tx.commit().await?;
        workout.id = id;
        Ok(workout)
    }

    async fn delete_workout(&self, id: i64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM workout_entries WHERE workout_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!(
                "workout with id {id} not found"
            )));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_workouts(&self) -> Result<Vec<Workout>, StoreError> {
        let rows: Vec<WorkoutRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, duration_minutes, calories_burned
            FROM workouts
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut workouts = Vec::with_capacity(rows.len());
        for row in rows {
            let entries = self.entries_for(row.id).await?;
            workouts.push(row.into_workout(entries));
        }
        Ok(workouts)
    }
}
