//! Ports for host services other than document storage.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use itemflow_domain::{ActorId, DocumentRef, Item, OperationContext, RuleId};

use super::error::{MacroError, RepoError};
use super::types::SessionUser;
use crate::events::{HookName, HookPayload};

// =============================================================================
// Item Use
// =============================================================================

/// The host's "use item" pathway (rolls, resource costs, chat cards).
///
/// Using an item fires the use-item hook again, so implementations must
/// forward `op` unchanged for cycle detection to work.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemUsePort: Send + Sync {
    async fn use_item(
        &self,
        item: &Item,
        options: &Value,
        op: &OperationContext,
    ) -> Result<(), RepoError>;
}

// =============================================================================
// Macros
// =============================================================================

/// What a macro gets to see about the event that invoked it.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroContext {
    pub event_type: String,
    pub item: DocumentRef,
    pub actor: Option<ActorId>,
    pub rule: RuleId,
    pub args: Value,
    pub op: OperationContext,
}

/// Resolves and runs user macros.
///
/// `Ok(Some(false))` means the macro asked to suppress the remaining rules.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MacroRunner: Send + Sync {
    async fn execute(&self, macro_ref: &str, ctx: &MacroContext)
        -> Result<Option<bool>, MacroError>;
}

// =============================================================================
// Session & Notifications
// =============================================================================

/// Local view of the multi-client session.
#[cfg_attr(test, mockall::automock)]
pub trait SessionPort: Send + Sync {
    /// The user this client runs as.
    fn local_user(&self) -> SessionUser;
    /// All known users, in session order.
    fn users(&self) -> Vec<SessionUser>;
}

/// Non-blocking user notifications.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

// =============================================================================
// Hooks
// =============================================================================

/// Receives host lifecycle hook firings.
#[async_trait]
pub trait HookListener: Send + Sync {
    async fn on_hook(&self, hook: &HookName, payload: &HookPayload);
}

/// The host's hook registration surface.
pub trait HookHost: Send + Sync {
    fn listen(&self, hook: HookName, listener: Arc<dyn HookListener>);
}
