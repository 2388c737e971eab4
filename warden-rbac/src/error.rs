//! Error types for permission evaluation
//!
//! This module defines the failures that can occur while decoding symbolic
//! permissions, encoding bitmasks, validating writes, and loading the
//! process-wide configuration tables.

use thiserror::Error;

/// Permission algebra and evaluation errors.
///
/// None of these are fatal: every variant is returned to the immediate caller
/// as a typed result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RbacError {
    /// A symbolic character has no entry in the action flag table
    #[error("Unknown action code: '{0}'")]
    UnknownAction(char),

    /// A bitmask holds bits outside the configured flags
    #[error("Bitmask {0} cannot be represented by the configured actions")]
    NonRepresentableBitmask(i64),

    /// An absolute write falls outside `[0, max]`
    #[error("Permission value {value} is out of range (0..={max})")]
    PermissionOutOfRange {
        /// Rejected value
        value: i64,
        /// Sum of all configured flags
        max: i64,
    },

    /// The subject record lacks an attribute the operation requires
    #[error("Subject is missing required attribute: {0}")]
    MissingAttribute(&'static str),

    /// The subject may not perform the action on the element
    #[error("Forbidden: '{action}' on '{element}'")]
    Forbidden {
        /// Requested action code(s)
        action: String,
        /// Element the action was requested on
        element: String,
    },
}

/// Result type for permission operations.
pub type RbacResult<T> = Result<T, RbacError>;

impl RbacError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            RbacError::UnknownAction(_) => "UNKNOWN_ACTION",
            RbacError::NonRepresentableBitmask(_) => "NON_REPRESENTABLE_BITMASK",
            RbacError::PermissionOutOfRange { .. } => "PERMISSION_OUT_OF_RANGE",
            RbacError::MissingAttribute(_) => "MISSING_ATTRIBUTE",
            RbacError::Forbidden { .. } => "FORBIDDEN",
        }
    }

    /// Check if this error means "denied" rather than "could not evaluate".
    ///
    /// A non-representable stored bitmask is an integrity problem and must not
    /// be mistaken for an ordinary denial.
    pub fn is_denial(&self) -> bool {
        matches!(self, RbacError::Forbidden { .. })
    }
}

/// Configuration errors for the flag table and group table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Action codes must be exactly one character
    #[error("Invalid action code {0:?}: must be a single character")]
    InvalidActionCode(String),

    /// Flags must be positive powers of two
    #[error("Invalid flag {value} for action '{code}': must be a positive power of two")]
    InvalidFlag {
        /// Action code
        code: char,
        /// Offending flag value
        value: i64,
    },

    /// Two action codes share the same flag
    #[error("Actions '{first}' and '{second}' share flag {value}")]
    DuplicateFlag {
        /// First action code holding the flag
        first: char,
        /// Second action code holding the flag
        second: char,
        /// Shared flag value
        value: i64,
    },

    /// Group floors must be non-negative
    #[error("Invalid floor {value} for group '{group}' on element '{element}'")]
    InvalidFloor {
        /// Group name
        group: String,
        /// Element name
        element: String,
        /// Offending floor value
        value: i64,
    },

    /// Configuration source could not be parsed
    #[error("Failed to parse {key}: {message}")]
    Parse {
        /// Configuration key or source
        key: String,
        /// Parser message
        message: String,
    },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(RbacError::UnknownAction('x').error_code(), "UNKNOWN_ACTION");
        assert_eq!(
            RbacError::NonRepresentableBitmask(16).error_code(),
            "NON_REPRESENTABLE_BITMASK"
        );
        assert_eq!(
            RbacError::PermissionOutOfRange { value: 99, max: 15 }.error_code(),
            "PERMISSION_OUT_OF_RANGE"
        );
    }

    #[test]
    fn test_non_representable_is_not_a_denial() {
        assert!(!RbacError::NonRepresentableBitmask(16).is_denial());
        let forbidden = RbacError::Forbidden {
            action: "r".to_string(),
            element: "post".to_string(),
        };
        assert!(forbidden.is_denial());
        assert_eq!(forbidden.to_string(), "Forbidden: 'r' on 'post'");
    }
}
