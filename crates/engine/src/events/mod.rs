//! Item events: host hooks, event type registrations and the registry.
//!
//! A hook firing becomes zero or more [`ItemEvent`]s: every registration on
//! the hook is checked against every rule-bearing item the firing concerns.

pub mod builtin;
mod event;
mod hooks;
mod registration;
mod registry;

pub use builtin::{event_types, BUILTIN_SOURCE};
pub use event::{EventDocument, EventPatch, ItemEvent};
pub use hooks::{HookName, HookPayload, HookSubject, RestKind};
pub use registration::{
    EventCondition, EventTransform, EventTypeDescriptor, EventTypeRegistration, ItemFilter,
};
pub use registry::{DuplicateEventTypeError, EventTypeRegistry};
