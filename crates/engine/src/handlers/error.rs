//! Handler build and execution errors.
//!
//! None of these abort a dispatch: the dispatcher records them against the
//! rule that produced them and moves on to the next rule.

use itemflow_domain::{DomainError, HandlerType};

use crate::infrastructure::ports::{MacroError, RepoError};

/// A rule's handler config does not satisfy the handler's schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {handler_type} config: field '{field}' {reason}")]
pub struct HandlerConfigValidationError {
    pub handler_type: HandlerType,
    pub field: String,
    pub reason: String,
}

impl HandlerConfigValidationError {
    pub fn new(
        handler_type: HandlerType,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            handler_type,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A rule names a handler type nobody registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unresolved handler type '{tag}'")]
pub struct UnresolvedHandlerTypeError {
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerBuildError {
    #[error(transparent)]
    Unresolved(#[from] UnresolvedHandlerTypeError),
    #[error(transparent)]
    InvalidConfig(#[from] HandlerConfigValidationError),
}

#[derive(Debug, thiserror::Error)]
pub enum HandlerExecutionError {
    /// The event has no actor for an actor-targeting handler.
    #[error("Event '{event_type}' on {item} has no actor")]
    MissingActor { event_type: String, item: String },

    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Macro(#[from] MacroError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl HandlerExecutionError {
    pub fn missing_actor(event_type: impl Into<String>, item: impl ToString) -> Self {
        Self::MissingActor {
            event_type: event_type.into(),
            item: item.to_string(),
        }
    }
}
