//! ItemFlow domain: documents, rules and the data model shared by the engine.
//!
//! Nothing here performs I/O. The engine crate owns the event registry, the
//! handlers and the ports that talk to the host.

pub mod data;
pub mod document_ref;
pub mod entities;
pub mod error;
pub mod expertise;
pub mod ids;
pub mod operation;
pub mod rules;
pub mod schema;

pub use data::Changes;
pub use document_ref::DocumentRef;
pub use entities::{
    Actor, ActorType, Grant, Item, ItemType, OwnershipLevel, GOAL_MAX_LEVEL,
};
pub use error::DomainError;
pub use expertise::{merge_expertises, remove_expertises, Expertise};
pub use ids::{ActorId, ItemId, OperationId, RuleId, UserId};
pub use operation::{ChainLink, OperationContext};
pub use rules::{HandlerConfig, HandlerType, Rule};
pub use schema::{
    ActorSchema, ValueRange, ATTRIBUTES, ATTRIBUTE_RANGE, EXPERTISES_PATH, SKILL_RANK_RANGE,
};
