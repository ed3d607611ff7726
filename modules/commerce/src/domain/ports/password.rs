use async_trait::async_trait;

use crate::domain::error::DomainError;

/// Transport-agnostic password hashing port. Implementations own the cost
/// parameters and where the work runs; the domain only sees hash/verify.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, plain: &str) -> Result<String, DomainError>;
    async fn verify(&self, plain: &str, hashed: &str) -> Result<bool, DomainError>;
}
