//! Typed error handling for billtrack
//!
//! Every fallible operation in the crate returns [`AppError`] (or a category
//! error that converts into it) so that callers can react to specific
//! failures instead of unwinding through opaque strings. The original system
//! this service replaces swallowed mutation and subscription failures
//! entirely; here every failure path carries an HTTP status and a stable
//! error code.
//!
//! # Error Categories
//!
//! - [`AuthError`]: sign-up, confirmation, sign-in and session failures
//! - [`RecordError`]: record operations (CRUD)
//! - [`RequestError`]: HTTP-level request problems
//! - [`StorageError`]: storage backend failures

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The main error type for billtrack
///
/// Each variant wraps a more specific error type for that category.
#[derive(Debug)]
pub enum AppError {
    /// Authentication and session errors
    Auth(AuthError),

    /// Record-related errors (CRUD operations)
    Record(RecordError),

    /// Input validation errors
    Validation(ValidationFailure),

    /// Storage backend errors
    Storage(StorageError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Record(e) => write!(f, "{}", e),
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Storage(e) => write!(f, "{}", e),
            AppError::Request(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Auth(e) => Some(e),
            AppError::Record(e) => Some(e),
            AppError::Validation(e) => Some(e),
            AppError::Storage(e) => Some(e),
            AppError::Request(e) => Some(e),
            AppError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(e) => e.status_code(),
            AppError::Record(e) => e.status_code(),
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Request(e) => e.status_code(),
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the stable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Auth(e) => e.error_code(),
            AppError::Record(e) => e.error_code(),
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Request(e) => e.error_code(),
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response body
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Record(RecordError::NotFound { record_type, id }) => {
                Some(serde_json::json!({
                    "record_type": record_type,
                    "id": id.to_string()
                }))
            }
            AppError::Validation(ValidationFailure::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Auth Errors
// =============================================================================

/// Errors related to accounts and sessions
#[derive(Debug)]
pub enum AuthError {
    /// An account with this email already exists
    EmailTaken { email: String },

    /// No account exists for this email
    UnknownAccount { email: String },

    /// Account exists but was never confirmed
    NotConfirmed { email: String },

    /// Verification code does not match
    InvalidCode { email: String },

    /// Email/password pair rejected
    InvalidCredentials,

    /// Session token is unknown or was revoked
    InvalidSession,

    /// Password hashing failed
    HashingFailed { message: String },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::EmailTaken { email } => {
                write!(f, "An account for '{}' already exists", email)
            }
            AuthError::UnknownAccount { email } => {
                write!(f, "No account found for '{}'", email)
            }
            AuthError::NotConfirmed { email } => {
                write!(f, "Account '{}' has not been confirmed", email)
            }
            AuthError::InvalidCode { email } => {
                write!(f, "Invalid verification code for '{}'", email)
            }
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::InvalidSession => write!(f, "Session is invalid or has been revoked"),
            AuthError::HashingFailed { message } => {
                write!(f, "Password hashing failed: {}", message)
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::EmailTaken { .. } => StatusCode::CONFLICT,
            AuthError::UnknownAccount { .. } => StatusCode::NOT_FOUND,
            AuthError::NotConfirmed { .. } => StatusCode::FORBIDDEN,
            AuthError::InvalidCode { .. } => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InvalidSession => StatusCode::UNAUTHORIZED,
            AuthError::HashingFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::EmailTaken { .. } => "EMAIL_TAKEN",
            AuthError::UnknownAccount { .. } => "UNKNOWN_ACCOUNT",
            AuthError::NotConfirmed { .. } => "ACCOUNT_NOT_CONFIRMED",
            AuthError::InvalidCode { .. } => "INVALID_CODE",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::InvalidSession => "INVALID_SESSION",
            AuthError::HashingFailed { .. } => "HASHING_FAILED",
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

// =============================================================================
// Record Errors
// =============================================================================

/// Errors related to record operations
///
/// Cross-owner access to an existing record is reported as `NotFound` so that
/// record existence never leaks to non-owners.
#[derive(Debug)]
pub enum RecordError {
    /// Record was not found (or is not visible to the caller)
    NotFound { record_type: String, id: Uuid },

    /// Record operation failed
    OperationFailed {
        record_type: String,
        operation: String,
        message: String,
    },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::NotFound { record_type, id } => {
                write!(f, "{} with id '{}' not found", record_type, id)
            }
            RecordError::OperationFailed {
                record_type,
                operation,
                message,
            } => {
                write!(f, "Failed to {} {}: {}", operation, record_type, message)
            }
        }
    }
}

impl std::error::Error for RecordError {}

impl RecordError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RecordError::NotFound { .. } => StatusCode::NOT_FOUND,
            RecordError::OperationFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RecordError::NotFound { .. } => "RECORD_NOT_FOUND",
            RecordError::OperationFailed { .. } => "RECORD_OPERATION_FAILED",
        }
    }
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        AppError::Record(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationFailure {
    /// Single field validation error
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// A numeric field could not be parsed or is not a finite number
    InvalidNumber { field: String, value: String },

    /// Invalid JSON payload
    InvalidJson { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationFailure::FieldError { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            ValidationFailure::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationFailure::InvalidNumber { field, value } => {
                write!(f, "Field '{}' is not a valid number: '{}'", field, value)
            }
            ValidationFailure::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationFailure {}

impl From<ValidationFailure> for AppError {
    fn from(err: ValidationFailure) -> Self {
        AppError::Validation(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let fields = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        AppError::Validation(ValidationFailure::FieldErrors(fields))
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to the storage backend
#[derive(Debug)]
pub enum StorageError {
    /// A lock on the backing map was poisoned
    LockPoisoned { message: String },

    /// Data integrity error
    IntegrityError { message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::LockPoisoned { message } => {
                write!(f, "Storage lock poisoned: {}", message)
            }
            StorageError::IntegrityError { message } => {
                write!(f, "Data integrity error: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug)]
pub enum RequestError {
    /// Bearer token missing from the request
    MissingToken,

    /// Invalid entity ID format
    InvalidRecordId { id: String },

    /// Invalid request body
    InvalidBody { message: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::MissingToken => write!(f, "Missing bearer token"),
            RequestError::InvalidRecordId { id } => {
                write!(f, "Invalid record ID format: '{}'", id)
            }
            RequestError::InvalidBody { message } => {
                write!(f, "Invalid request body: {}", message)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::MissingToken => StatusCode::UNAUTHORIZED,
            RequestError::InvalidRecordId { .. } => StatusCode::BAD_REQUEST,
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::MissingToken => "MISSING_TOKEN",
            RequestError::InvalidRecordId { .. } => "INVALID_RECORD_ID",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
        }
    }
}

impl From<RequestError> for AppError {
    fn from(err: RequestError) -> Self {
        AppError::Request(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(ValidationFailure::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Auth(AuthError::HashingFailed {
            message: err.to_string(),
        })
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for billtrack operations
pub type AppResult<T> = Result<T, AppError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_display() {
        let err = RecordError::NotFound {
            record_type: "invoice".to_string(),
            id: Uuid::nil(),
        };
        assert!(err.to_string().contains("invoice"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_record_error_status_code() {
        let err = RecordError::NotFound {
            record_type: "invoice".to_string(),
            id: Uuid::nil(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidSession.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::EmailTaken {
                email: "a@b.c".to_string()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuthError::NotConfirmed {
                email: "a@b.c".to_string()
            }
            .status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_validation_error_multiple_fields() {
        let err = ValidationFailure::FieldErrors(vec![
            FieldValidationError {
                field: "customer_name".to_string(),
                message: "required".to_string(),
            },
            FieldValidationError {
                field: "invoice_total".to_string(),
                message: "must be finite".to_string(),
            },
        ]);
        let display = err.to_string();
        assert!(display.contains("customer_name"));
        assert!(display.contains("invoice_total"));
    }

    #[test]
    fn test_app_error_conversion() {
        let record_err = RecordError::NotFound {
            record_type: "invoice".to_string(),
            id: Uuid::nil(),
        };
        let app_err: AppError = record_err.into();
        assert_eq!(app_err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(app_err.error_code(), "RECORD_NOT_FOUND");
    }

    #[test]
    fn test_error_response_serialization() {
        let err = AppError::Record(RecordError::NotFound {
            record_type: "invoice".to_string(),
            id: Uuid::nil(),
        });
        let response = err.to_response();
        assert_eq!(response.code, "RECORD_NOT_FOUND");
        assert!(response.details.is_some());
    }

    #[test]
    fn test_invalid_number_display() {
        let err = ValidationFailure::InvalidNumber {
            field: "invoice_total".to_string(),
            value: "abc".to_string(),
        };
        assert!(err.to_string().contains("invoice_total"));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_request_error_status_codes() {
        assert_eq!(
            RequestError::MissingToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RequestError::InvalidRecordId {
                id: "not-a-uuid".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_err: AppError = json_err.into();
        assert!(matches!(
            app_err,
            AppError::Validation(ValidationFailure::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_from_validator_errors() {
        use validator::Validate;

        #[derive(Validate)]
        struct Probe {
            #[validate(length(min = 1, message = "must not be empty"))]
            name: String,
        }

        let probe = Probe {
            name: String::new(),
        };
        let app_err: AppError = probe.validate().unwrap_err().into();
        assert_eq!(app_err.status_code(), StatusCode::BAD_REQUEST);
        match app_err {
            AppError::Validation(ValidationFailure::FieldErrors(fields)) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field, "name");
            }
            other => panic!("Expected FieldErrors, got {:?}", other),
        }
    }
}
