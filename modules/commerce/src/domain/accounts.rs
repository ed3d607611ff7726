use std::sync::Arc;

use sea_orm::{DatabaseConnection, SqlErr};
use tracing::{debug, info, instrument};

use crate::contract::model::{Credentials, NewUser, User};
use crate::domain::error::DomainError;
use crate::domain::ports::PasswordHasher;
use crate::infra::storage::entity::users;
use crate::infra::storage::mapper;

/// Account registration and login. Plaintext passwords exist only on the
/// way into the hasher; storage and responses only ever see the hash or
/// nothing at all.
#[derive(Clone)]
pub struct AccountsService {
    db: DatabaseConnection,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountsService {
    pub fn new(db: DatabaseConnection, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { db, hasher }
    }

    #[instrument(name = "commerce.accounts.register", skip(self, new_user), fields(email = %new_user.email))]
    pub async fn register(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Registering new account");

        self.validate_registration(&new_user)?;

        let NewUser {
            name,
            email,
            password,
        } = new_user;
        let password_hash = self.hasher.hash(&password).await?;

        let row = users::insert(&self.db, name, email.clone(), password_hash)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::email_taken(email),
                _ => DomainError::storage(e),
            })?;

        info!("Registered account id={}", row.id);
        Ok(mapper::user_to_contract(row))
    }

    #[instrument(name = "commerce.accounts.login", skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: Credentials) -> Result<User, DomainError> {
        debug!("Attempting login");

        let row = users::find_by_email(&self.db, &credentials.email)
            .await
            .map_err(DomainError::storage)?
            .ok_or_else(|| DomainError::user_not_found(credentials.email.clone()))?;

        let matches = self
            .hasher
            .verify(&credentials.password, &row.password_hash)
            .await?;
        if !matches {
            return Err(DomainError::invalid_credentials());
        }

        info!("Login succeeded for user id={}", row.id);
        Ok(mapper::user_to_contract(row))
    }

    // --- validation helpers ---

    fn validate_registration(&self, new_user: &NewUser) -> Result<(), DomainError> {
        if new_user.name.trim().is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }
        self.validate_email(&new_user.email)?;
        if new_user.password.is_empty() {
            return Err(DomainError::validation("password must not be empty"));
        }
        Ok(())
    }

    fn validate_email(&self, email: &str) -> Result<(), DomainError> {
        if email.is_empty() || !email.contains('@') || !email.contains('.') {
            return Err(DomainError::validation(format!(
                "invalid email format: '{email}'"
            )));
        }
        Ok(())
    }
}
