use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::ports::PasswordHasher;

/// Production `PasswordHasher` backed by bcrypt. Hashing is CPU-bound, so
/// both operations run on the blocking thread pool.
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

#[async_trait]
impl PasswordHasher for BcryptHasher {
    async fn hash(&self, plain: &str) -> Result<String, DomainError> {
        let cost = self.cost;
        let plain = plain.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
            .await
            .map_err(DomainError::storage)?
            .map_err(DomainError::storage)
    }

    async fn verify(&self, plain: &str, hashed: &str) -> Result<bool, DomainError> {
        let plain = plain.to_owned();
        let hashed = hashed.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hashed))
            .await
            .map_err(DomainError::storage)?
            .map_err(DomainError::storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // bcrypt's minimum cost keeps the test fast
    #[tokio::test]
    async fn hash_then_verify_roundtrip() {
        let hasher = BcryptHasher::new(4);

        let hash = hasher.hash("s3cret").await.unwrap();
        assert_ne!(hash, "s3cret");
        assert!(hash.starts_with("$2"));

        assert!(hasher.verify("s3cret", &hash).await.unwrap());
        assert!(!hasher.verify("wrong", &hash).await.unwrap());
    }
}
