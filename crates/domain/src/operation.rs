//! Operation context threaded through every mutation an event causes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document_ref::DocumentRef;
use crate::ids::{OperationId, UserId};

/// One `(document, event type)` step of a dispatch chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainLink {
    pub document: DocumentRef,
    pub event_type: String,
}

impl ChainLink {
    pub fn new(document: DocumentRef, event_type: impl Into<String>) -> Self {
        Self {
            document,
            event_type: event_type.into(),
        }
    }
}

/// Context of the host operation that caused an event.
///
/// Every document mutation performed while handling the event carries this
/// context so the host can attribute (and batch) it with the triggering
/// operation. `chain` records which `(document, event type)` pairs are already
/// being handled further up the stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationContext {
    pub id: OperationId,
    /// The user whose action triggered the operation
    pub user: UserId,
    pub issued_at: DateTime<Utc>,
    #[serde(default)]
    pub chain: Vec<ChainLink>,
    #[serde(default = "default_render")]
    pub render: bool,
}

fn default_render() -> bool {
    true
}

impl OperationContext {
    pub fn new(user: UserId, issued_at: DateTime<Utc>) -> Self {
        Self {
            id: OperationId::new(),
            user,
            issued_at,
            chain: Vec::new(),
            render: true,
        }
    }

    /// Whether `(document, event_type)` is already being handled upstream.
    pub fn has_visited(&self, document: &DocumentRef, event_type: &str) -> bool {
        self.chain
            .iter()
            .any(|link| &link.document == document && link.event_type == event_type)
    }

    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    /// Child context for a mutation caused while handling `link`.
    ///
    /// Keeps the operation id and source user so nested work stays attributable.
    pub fn derive(&self, link: ChainLink) -> Self {
        let mut child = self.clone();
        child.chain.push(link);
        child
    }
}
