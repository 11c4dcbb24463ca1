use super::StoreError;

/// bcrypt work factor used for all stored credentials.
const BCRYPT_COST: u32 = 12;

/// A salted one-way hash of a user's password. The plaintext is never retained
/// beyond the `set` call that hashed it, and the hash never serializes outward.
#[derive(Debug, Clone, Default)]
pub struct Password {
    hash: Option<String>,
}

impl Password {
    /// Rehydrate a credential from a hash loaded out of the database.
    pub fn from_hash(hash: String) -> Self {
        Self { hash: Some(hash) }
    }

    /// Replace the stored hash with a bcrypt hash of `plaintext`.
    pub fn set(&mut self, plaintext: &str) -> Result<(), StoreError> {
        let hash = bcrypt::hash(plaintext, BCRYPT_COST)
            .map_err(|e| StoreError::Credential(e.to_string()))?;
        self.hash = Some(hash);
        Ok(())
    }

    /// Compare a candidate password against the stored hash.
    pub fn check(&self, candidate: &str) -> Result<bool, StoreError> {
        if candidate.is_empty() {
            return Err(StoreError::validation("password must not be empty"));
        }
        let hash = self
            .hash
            .as_deref()
            .ok_or_else(|| StoreError::Credential("no password hash set".to_string()))?;
        bcrypt::verify(candidate, hash).map_err(|e| StoreError::Credential(e.to_string()))
    }

    /// The stored hash, for persistence only.
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }
}
