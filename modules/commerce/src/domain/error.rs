use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid cart: {message}")]
    InvalidCart { message: String },

    #[error("Product not found: {id}")]
    ProductNotFound { id: i64 },

    #[error("No account registered for '{email}'")]
    UserNotFound { email: String },

    #[error("Email '{email}' is already registered")]
    EmailTaken { email: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i32,
        available: i32,
    },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_cart(message: impl Into<String>) -> Self {
        Self::InvalidCart {
            message: message.into(),
        }
    }

    pub fn product_not_found(id: i64) -> Self {
        Self::ProductNotFound { id }
    }

    pub fn user_not_found(email: impl Into<String>) -> Self {
        Self::UserNotFound {
            email: email.into(),
        }
    }

    pub fn email_taken(email: impl Into<String>) -> Self {
        Self::EmailTaken {
            email: email.into(),
        }
    }

    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials
    }

    pub fn insufficient_stock(product_id: i64, requested: i32, available: i32) -> Self {
        Self::InsufficientStock {
            product_id,
            requested,
            available,
        }
    }

    pub fn storage(source: impl std::fmt::Display) -> Self {
        Self::Storage {
            message: source.to_string(),
        }
    }
}
