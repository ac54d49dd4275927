//! Error types for port operations.

use itemflow_domain::DomainError;

/// Document store operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Document not found - includes document type and reference.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The host rejected the data (schema validation).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepoError {
    /// Create a NotFound error with entity type and ID context.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    /// Check if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<DomainError> for RepoError {
    fn from(err: DomainError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Errors reported by the macro execution service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MacroError {
    #[error("Macro not found: {0}")]
    NotFound(String),
    #[error("Macro {macro_ref} failed: {message}")]
    Failed { macro_ref: String, message: String },
}
