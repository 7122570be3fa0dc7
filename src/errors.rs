//! Error types for schema declaration and record access
//!
//! Error codes:
//! - INVALID_DECLARATION (bad name shape, duplicate attribute)
//! - KEY_NOT_FOUND (undeclared key on read/write/merge/construction)
//! - NOT_PERMITTED (declaration against a frozen schema)
//! - NO_SUCH_OPERATION (predicate query on a non-predicate attribute)

use thiserror::Error;

/// Result type for schema and record operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors raised by schema declaration and record access.
///
/// Every failure propagates immediately to the caller; there is no internal
/// recovery. A failed declaration leaves the schema exactly as it was before
/// the failing call, and a failed construction never exposes a partial
/// instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    // ==================
    // Declaration Errors
    // ==================
    /// Attribute name does not have symbol shape
    #[error("invalid attribute name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name
        name: String,
        /// Why the name was rejected
        reason: &'static str,
    },

    /// Attribute name collides with an existing declaration
    #[error("attribute '{0}' is already declared")]
    DuplicateAttribute(String),

    /// Declaration attempted after the schema was frozen
    #[error("schema is frozen; attributes can only be declared while the type is being defined")]
    DeclarationClosed,

    // ==================
    // Access Errors
    // ==================
    /// Read, write, or merge referenced an undeclared key
    #[error("key not found: '{0}'")]
    UnknownKey(String),

    /// Construction overrides contained undeclared keys
    #[error("keys not found: {}", .0.join(", "))]
    UnknownKeys(Vec<String>),

    /// Predicate query on an attribute not declared as a predicate
    #[error("attribute '{0}' is not a predicate")]
    NotAPredicate(String),
}

impl RecordError {
    /// Returns the stable error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            RecordError::InvalidName { .. } | RecordError::DuplicateAttribute(_) => {
                "INVALID_DECLARATION"
            }
            RecordError::UnknownKey(_) | RecordError::UnknownKeys(_) => "KEY_NOT_FOUND",
            RecordError::DeclarationClosed => "NOT_PERMITTED",
            RecordError::NotAPredicate(_) => "NO_SUCH_OPERATION",
        }
    }
}
