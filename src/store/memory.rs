//! In-memory store backend. Backs the integration tests and mirrors the
//! Postgres backend's semantics, including email uniqueness and replace-all
//! entry updates.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use super::token::{Token, TokenStore};
use super::user::{NewUser, UpdateUser, User, UserStore};
use super::workout::{Workout, WorkoutStore};
use super::StoreError;

#[derive(Debug, Clone)]
struct StoredToken {
    hash: Vec<u8>,
    user_id: i64,
    scope: String,
    expiry: chrono::DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<i64, User>,
    tokens: Vec<StoredToken>,
    workouts: HashMap<i64, Workout>,
    next_user_id: i64,
    next_workout_id: i64,
    next_entry_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Lock poisoning only happens if a holder panicked; propagate it.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut inner = self.lock();
        if inner.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::Conflict(format!(
                "email {} already registered",
                new.email
            )));
        }
        inner.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: inner.next_user_id,
            name: new.name,
            email: new.email,
            bio: new.bio,
            password: new.password,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_user(&self, id: i64, update: UpdateUser) -> Result<User, StoreError> {
        let mut inner = self.lock();
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(format!("user with id {id} not found")))?;
        user.name = update.name;
        user.email = update.email;
        user.bio = update.bio;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.users.remove(&id).is_none() {
            return Err(StoreError::not_found(format!("user with id {id} not found")));
        }
        inner.tokens.retain(|t| t.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn issue(&self, user_id: i64, ttl: Duration, scope: &str) -> Result<Token, StoreError> {
        let token = Token::generate(user_id, ttl, scope);
        self.lock().tokens.push(StoredToken {
            hash: token.hash.clone(),
            user_id: token.user_id,
            scope: token.scope.clone(),
            expiry: token.expiry,
        });
        Ok(token)
    }

    async fn resolve(&self, scope: &str, plaintext: &str) -> Result<Option<User>, StoreError> {
        let hash = Token::hash_plaintext(plaintext);
        let now = Utc::now();
        let inner = self.lock();
        let user_id = inner
            .tokens
            .iter()
            .find(|t| t.hash == hash && t.scope == scope && t.expiry > now)
            .map(|t| t.user_id);
        Ok(user_id.and_then(|id| inner.users.get(&id).cloned()))
    }
}

impl MemoryStore {
    /// Force a stored token to be already expired. Test hook for expiry
    /// behavior, which Postgres enforces purely at lookup time.
    pub fn expire_token(&self, plaintext: &str) {
        let hash = Token::hash_plaintext(plaintext);
        let mut inner = self.lock();
        for token in inner.tokens.iter_mut().filter(|t| t.hash == hash) {
            token.expiry = Utc::now() - Duration::seconds(1);
        }
    }
}

#[async_trait]
impl WorkoutStore for MemoryStore {
    async fn create_workout(&self, mut workout: Workout) -> Result<Workout, StoreError> {
        workout.validate()?;
        let mut inner = self.lock();
        inner.next_workout_id += 1;
        workout.id = inner.next_workout_id;
        for entry in workout.entries.iter_mut() {
            inner.next_entry_id += 1;
            entry.id = inner.next_entry_id;
        }
        inner.workouts.insert(workout.id, workout.clone());
        Ok(workout)
    }

    async fn get_workout_by_id(&self, id: i64) -> Result<Option<Workout>, StoreError> {
        Ok(self.lock().workouts.get(&id).cloned().map(|mut w| {
            w.entries.sort_by_key(|e| e.order_index);
            w
        }))
    }

    async fn update_workout(&self, id: i64, mut workout: Workout) -> Result<Workout, StoreError> {
        workout.validate()?;
        let mut inner = self.lock();
        if !inner.workouts.contains_key(&id) {
            return Err(StoreError::not_found(format!(
                "workout with id {id} not found"
            )));
        }
        workout.id = id;
        for entry in workout.entries.iter_mut() {
            inner.next_entry_id += 1;
            entry.id = inner.next_entry_id;
        }
        inner.workouts.insert(id, workout.clone());
        Ok(workout)
    }

    async fn delete_workout(&self, id: i64) -> Result<(), StoreError> {
        if self.lock().workouts.remove(&id).is_none() {
            return Err(StoreError::not_found(format!(
                "workout with id {id} not found"
            )));
        }
        Ok(())
    }

    async fn get_workouts(&self) -> Result<Vec<Workout>, StoreError> {
        let mut workouts: Vec<Workout> = self.lock().workouts.values().cloned().collect();
        workouts.sort_by_key(|w| w.id);
        for workout in workouts.iter_mut() {
            workout.entries.sort_by_key(|e| e.order_index);
        }
        Ok(workouts)
    }
}
