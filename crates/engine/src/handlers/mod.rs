//! Rule handlers.
//!
//! A handler is built from a rule's raw config each time the rule runs and
//! performs one kind of action through the injected ports. Handlers never see
//! a mutable event and never mutate documents directly.

mod attribute;
mod error;
mod execute_macro;
mod expertises;
mod grant_items;
mod registry;
mod remove_items;
mod schema;
mod skill_rank;
mod support;
mod update_document;
mod use_item;

use std::sync::Arc;

use async_trait::async_trait;

use itemflow_domain::{HandlerConfig, HandlerType, Rule};

use crate::events::ItemEvent;
use crate::infrastructure::ports::{ClockPort, DocumentStore, ItemUsePort, MacroRunner};

pub use attribute::{ModifyAttributeHandler, SetAttributeHandler};
pub use error::{
    HandlerBuildError, HandlerConfigValidationError, HandlerExecutionError,
    UnresolvedHandlerTypeError,
};
pub use execute_macro::ExecuteMacroHandler;
pub use expertises::{GrantExpertisesHandler, RemoveExpertisesHandler};
pub use grant_items::{DedupPolicy, GrantItemsHandler};
pub use registry::{HandlerDescriptor, HandlerRegistry};
pub use remove_items::RemoveItemsHandler;
pub use schema::{ConfigSchema, FieldKind, FieldSpec};
pub use skill_rank::{ModifySkillRankHandler, SetSkillRankHandler};
pub use update_document::{UpdateActorHandler, UpdateItemHandler};
pub use use_item::UseItemHandler;

/// What the dispatcher should do after a handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandlerOutcome {
    #[default]
    Continue,
    /// Skip the remaining rules for this item and event.
    Suppress,
}

/// Host services available to handlers.
#[derive(Clone)]
pub struct HandlerPorts {
    pub documents: Arc<dyn DocumentStore>,
    pub item_use: Arc<dyn ItemUsePort>,
    pub macros: Arc<dyn MacroRunner>,
    pub clock: Arc<dyn ClockPort>,
}

/// Per-execution context: the ports plus the rule being run.
pub struct HandlerContext<'a> {
    pub ports: &'a HandlerPorts,
    pub rule: &'a Rule,
}

#[async_trait]
pub trait Handler: Send + Sync {
    fn handler_type(&self) -> HandlerType;

    async fn execute(
        &self,
        event: &ItemEvent,
        ctx: &HandlerContext<'_>,
    ) -> Result<HandlerOutcome, HandlerExecutionError>;
}

/// A handler that can be described to the rule editor and built from config.
pub trait ConfiguredHandler: Handler + Sized + 'static {
    const TYPE: HandlerType;
    const LABEL: &'static str;
    const SCHEMA: ConfigSchema;

    fn from_config(config: &HandlerConfig) -> Result<Self, HandlerConfigValidationError>;
}
