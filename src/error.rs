// Form Action Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::types::Operation;
use crate::validation::{FieldErrors, FormState};

/// Failure of an invoice action. Every variant is surfaced to the caller as a `FormState`.
#[derive(Debug, Error)]
pub enum ActionError {
    // 422 Unprocessable Entity
    #[error("{message}")]
    Validation { errors: FieldErrors, message: String },

    // Body the form extractor could not read; status follows the rejection
    #[error("{message}")]
    MalformedForm { status: StatusCode, message: String },

    // 404 Not Found
    #[error("Invoice not found.")]
    NotFound,

    // 403 Forbidden
    #[error("Failed to delete invoice.")]
    DeleteDisabled,

    // 500 Internal Server Error / 503 Service Unavailable
    #[error("Database error, Failed to {operation} invoice.")]
    Persistence {
        operation: Operation,
        #[source]
        source: DatabaseError,
    },
}

impl ActionError {
    pub fn validation(errors: FieldErrors, message: impl Into<String>) -> Self {
        ActionError::Validation {
            errors,
            message: message.into(),
        }
    }

    pub fn malformed_form(status: StatusCode, message: impl Into<String>) -> Self {
        ActionError::MalformedForm {
            status,
            message: message.into(),
        }
    }

    pub fn persistence(operation: Operation, source: DatabaseError) -> Self {
        ActionError::Persistence { operation, source }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ActionError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ActionError::MalformedForm { status, .. } => *status,
            ActionError::NotFound => StatusCode::NOT_FOUND,
            ActionError::DeleteDisabled => StatusCode::FORBIDDEN,
            ActionError::Persistence { source, .. } if source.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            ActionError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ActionError::Validation { .. } => "VALIDATION_ERROR",
            ActionError::MalformedForm { .. } => "MALFORMED_FORM",
            ActionError::NotFound => "NOT_FOUND",
            ActionError::DeleteDisabled => "DELETE_DISABLED",
            ActionError::Persistence { .. } => "DATABASE_ERROR",
        }
    }

    /// Client-safe state for the form. Database causes are never exposed.
    pub fn to_state(&self) -> FormState {
        match self {
            ActionError::Validation { errors, message } => FormState::invalid(errors.clone(), message.clone()),
            other => FormState::message(other.to_string()),
        }
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ActionError {
    fn into_response(self) -> axum::response::Response {
        tracing::debug!("Action failed ({}): {}", self.error_code(), self);
        (self.status_code(), Json(self.to_state())).into_response()
    }
}
