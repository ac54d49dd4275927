//! The event value handed to handlers.

use serde_json::Value;

use itemflow_domain::{Actor, ActorId, ChainLink, DocumentRef, Item, OperationContext};

/// A document an event can be about.
#[derive(Debug, Clone, PartialEq)]
pub enum EventDocument {
    Item(Item),
    Actor(Actor),
}

impl EventDocument {
    pub fn uuid(&self) -> DocumentRef {
        match self {
            Self::Item(item) => item.uuid(),
            Self::Actor(actor) => actor.uuid(),
        }
    }

    pub fn actor_id(&self) -> Option<ActorId> {
        match self {
            Self::Item(item) => item.actor_id,
            Self::Actor(actor) => Some(actor.id),
        }
    }
}

/// Partial event data produced by a registration's transform.
///
/// Set fields replace the base event's; unset fields keep it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub document: Option<EventDocument>,
    pub options: Option<Value>,
}

impl EventPatch {
    pub fn document(document: EventDocument) -> Self {
        Self {
            document: Some(document),
            options: None,
        }
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }
}

/// "Something happened to an item."
///
/// Built fresh per dispatch and only ever lent to handlers, so handlers cannot
/// mutate it. `item` is always the rule-bearing item; `document` is set when
/// the true subject is another document (e.g. the owning actor).
#[derive(Debug, Clone, PartialEq)]
pub struct ItemEvent {
    pub event_type: String,
    pub item: Item,
    pub document: Option<EventDocument>,
    pub op: OperationContext,
    pub options: Value,
}

impl ItemEvent {
    pub fn new(
        event_type: impl Into<String>,
        item: Item,
        op: OperationContext,
        options: Value,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            item,
            document: None,
            op,
            options,
        }
    }

    /// Shallow-merge a transform's output over this event.
    pub fn apply(mut self, patch: EventPatch) -> Self {
        if let Some(document) = patch.document {
            self.document = Some(document);
        }
        if let Some(options) = patch.options {
            self.options = options;
        }
        self
    }

    /// The document the event is about.
    pub fn subject(&self) -> DocumentRef {
        self.document
            .as_ref()
            .map(EventDocument::uuid)
            .unwrap_or_else(|| self.item.uuid())
    }

    /// The actor-bearing document for handlers that mutate an actor.
    pub fn actor_id(&self) -> Option<ActorId> {
        self.document
            .as_ref()
            .and_then(EventDocument::actor_id)
            .or(self.item.actor_id)
    }

    pub fn chain_link(&self) -> ChainLink {
        ChainLink::new(self.item.uuid(), self.event_type.clone())
    }

    /// Operation context for mutations caused by handling this event.
    pub fn child_op(&self) -> OperationContext {
        self.op.derive(self.chain_link())
    }
}
