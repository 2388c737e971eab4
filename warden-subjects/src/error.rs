//! Error types for subject writes
//!
//! [`ValidationError`] is what record validators and persistence providers
//! report; [`WardenError`] is what the public operations return, wrapping both
//! validation failures and permission algebra failures.

use thiserror::Error;
use warden_rbac::RbacError;

/// Changeset and persistence failures.
///
/// Providers return this type from `update`; Warden hands it to the caller
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Attribute is not one of the writable fields
    #[error("Field not permitted: {0}")]
    FieldNotPermitted(String),

    /// Attribute value has the wrong shape
    #[error("Invalid value for {field}: expected {expected}")]
    InvalidType {
        /// Field name
        field: &'static str,
        /// Expected shape
        expected: &'static str,
    },

    /// Provider has no record for the subject
    #[error("Subject not found: {0}")]
    NotFound(String),

    /// Provider refused the write
    #[error("Update rejected: {0}")]
    Rejected(String),
}

/// Result type for validators and providers.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors returned by Warden operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WardenError {
    /// Permission algebra failure (unknown action, out of range, ...)
    #[error(transparent)]
    Rbac(#[from] RbacError),

    /// Changeset or persistence failure
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result type for Warden operations.
pub type WardenResult<T> = Result<T, WardenError>;

impl WardenError {
    /// Check if the caller sent something invalid, as opposed to the stored
    /// state or provider being at fault.
    pub fn is_client_error(&self) -> bool {
        match self {
            WardenError::Rbac(RbacError::NonRepresentableBitmask(_)) => false,
            WardenError::Rbac(_) => true,
            WardenError::Validation(ValidationError::Rejected(_)) => false,
            WardenError::Validation(_) => true,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            WardenError::Rbac(e) => e.error_code(),
            WardenError::Validation(ValidationError::FieldNotPermitted(_)) => "FIELD_NOT_PERMITTED",
            WardenError::Validation(ValidationError::InvalidType { .. }) => "INVALID_TYPE",
            WardenError::Validation(ValidationError::NotFound(_)) => "NOT_FOUND",
            WardenError::Validation(ValidationError::Rejected(_)) => "UPDATE_REJECTED",
        }
    }
}
