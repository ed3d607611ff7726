use axum::http::StatusCode;

use crate::api::problem::{Problem, ProblemResponse};
use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.storefront.dev/{}", code))
        .with_code(code)
        .with_instance(instance);

    // Add request ID from current tracing span if available
    let problem = if let Some(id) = tracing::Span::current().id() {
        problem.with_request_id(id.into_u64().to_string())
    } else {
        problem
    };

    ProblemResponse(problem)
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::Validation { message } => from_parts(
            StatusCode::BAD_REQUEST,
            "VALIDATION",
            "Validation error",
            message.clone(),
            instance,
        ),
        DomainError::InvalidCart { message } => from_parts(
            StatusCode::BAD_REQUEST,
            "INVALID_CART",
            "Invalid cart",
            message.clone(),
            instance,
        ),
        DomainError::ProductNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "PRODUCT_NOT_FOUND",
            "Product not found",
            format!("Product with id {} was not found", id),
            instance,
        ),
        DomainError::UserNotFound { email } => from_parts(
            StatusCode::NOT_FOUND,
            "USER_NOT_FOUND",
            "User not found",
            format!("No account registered for '{}'", email),
            instance,
        ),
        DomainError::EmailTaken { email } => from_parts(
            StatusCode::CONFLICT,
            "EMAIL_TAKEN",
            "Email already registered",
            format!("Email '{}' is already registered", email),
            instance,
        ),
        DomainError::InvalidCredentials => from_parts(
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            "Invalid credentials",
            "Email or password is incorrect",
            instance,
        ),
        DomainError::InsufficientStock { .. } => {
            // Business failure of the whole checkout; logged because it
            // aborts a transaction server-side.
            tracing::error!(error = ?e, "Checkout aborted");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INSUFFICIENT_STOCK",
                "Insufficient stock",
                format!("{}", e),
                instance,
            )
        }
        DomainError::Storage { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Storage error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE",
                "Internal error",
                "An internal storage error occurred",
                instance,
            )
        }
    }
}
