use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use super::{Password, StoreError, User};

/// Scope for tokens minted at login. Tokens minted under one scope never
/// authenticate under another.
pub const SCOPE_AUTH: &str = "auth";

const TOKEN_BYTES: usize = 32;

/// An opaque bearer token. Only the SHA-256 hash is persisted; the plaintext
/// is returned to the caller exactly once, in the issuance response.
#[derive(Debug, Clone, Serialize)]
pub struct Token {
    pub plaintext: String,
    #[serde(skip_serializing)]
    pub hash: Vec<u8>,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub expiry: DateTime<Utc>,
    pub scope: String,
}

impl Token {
    /// Generate a fresh token for `user_id`, valid for `ttl`.
    pub fn generate(user_id: i64, ttl: Duration, scope: &str) -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let plaintext = URL_SAFE_NO_PAD.encode(bytes);
        let hash = Self::hash_plaintext(&plaintext);

        Self {
            plaintext,
            hash,
            user_id,
            expiry: Utc::now() + ttl,
            scope: scope.to_string(),
        }
    }

    pub fn hash_plaintext(plaintext: &str) -> Vec<u8> {
        Sha256::digest(plaintext.as_bytes()).to_vec()
    }
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Mint and persist a token bound to (user, scope, now + ttl).
    async fn issue(&self, user_id: i64, ttl: Duration, scope: &str) -> Result<Token, StoreError>;

    /// Resolve a presented plaintext back to its user. Absent, expired, and
    /// wrong-scope tokens are all `None`; callers cannot tell them apart.
    async fn resolve(&self, scope: &str, plaintext: &str) -> Result<Option<User>, StoreError>;
}

pub struct PostgresTokenStore {
    pool: PgPool,
}

impl PostgresTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PostgresTokenStore {
    async fn issue(&self, user_id: i64, ttl: Duration, scope: &str) -> Result<Token, StoreError> {
        let token = Token::generate(user_id, ttl, scope);

        sqlx::query(
            r#"
            INSERT INTO tokens (hash, user_id, scope, expiry)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&token.hash)
        .bind(token.user_id)
        .bind(&token.scope)
        .bind(token.expiry)
        .execute(&self.pool)
        .await?;

        Ok(token)
    }

    async fn resolve(&self, scope: &str, plaintext: &str) -> Result<Option<User>, StoreError> {
        let hash = Token::hash_plaintext(plaintext);

        #[derive(sqlx::FromRow)]
        struct SubjectRow {
            id: i64,
            name: String,
            email: String,
            password_hash: String,
            bio: String,
            created_at: DateTime<Utc>,
            updated_at: DateTime<Utc>,
        }

        let row: Option<SubjectRow> = sqlx::query_as(
            r#"
            SELECT u.id, u.name, u.email, u.password_hash, u.bio, u.created_at, u.updated_at
            FROM users u
            INNER JOIN tokens t ON u.id = t.user_id
            WHERE t.hash = $1 AND t.scope = $2 AND t.expiry > $3
            "#,
        )
        .bind(&hash)
        .bind(scope)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| User {
            id: r.id,
            name: r.name,
            email: r.email,
            bio: r.bio,
            password: Password::from_hash(r.password_hash),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }))
    }
}
