//! Handler type registry: resolves a rule's type tag to a constructor.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use itemflow_domain::{HandlerConfig, HandlerType};

use super::error::{HandlerBuildError, HandlerConfigValidationError, UnresolvedHandlerTypeError};
use super::schema::ConfigSchema;
use super::{
    ConfiguredHandler, ExecuteMacroHandler, GrantExpertisesHandler, GrantItemsHandler, Handler,
    ModifyAttributeHandler, ModifySkillRankHandler, RemoveExpertisesHandler, RemoveItemsHandler,
    SetAttributeHandler, SetSkillRankHandler, UpdateActorHandler, UpdateItemHandler,
    UseItemHandler,
};

type BuildFn = fn(&HandlerConfig) -> Result<Arc<dyn Handler>, HandlerConfigValidationError>;

/// A handler type as the rule editor sees it, plus its constructor.
#[derive(Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerDescriptor {
    pub handler_type: HandlerType,
    pub label: &'static str,
    pub schema: ConfigSchema,
    #[serde(skip)]
    build: BuildFn,
}

impl HandlerDescriptor {
    pub fn of<H: ConfiguredHandler>() -> Self {
        Self {
            handler_type: H::TYPE,
            label: H::LABEL,
            schema: H::SCHEMA,
            build: build_handler::<H>,
        }
    }

    pub fn build(
        &self,
        config: &HandlerConfig,
    ) -> Result<Arc<dyn Handler>, HandlerConfigValidationError> {
        (self.build)(config)
    }
}

impl std::fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("handler_type", &self.handler_type)
            .field("label", &self.label)
            .finish()
    }
}

fn build_handler<H: ConfiguredHandler>(
    config: &HandlerConfig,
) -> Result<Arc<dyn Handler>, HandlerConfigValidationError> {
    Ok(Arc::new(H::from_config(config)?))
}

#[derive(Debug, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<HandlerType, HandlerDescriptor>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in handler type.
    pub fn with_builtin_handlers() -> Self {
        let mut registry = Self::new();
        registry.register(HandlerDescriptor::of::<GrantItemsHandler>());
        registry.register(HandlerDescriptor::of::<RemoveItemsHandler>());
        registry.register(HandlerDescriptor::of::<ModifyAttributeHandler>());
        registry.register(HandlerDescriptor::of::<SetAttributeHandler>());
        registry.register(HandlerDescriptor::of::<ModifySkillRankHandler>());
        registry.register(HandlerDescriptor::of::<SetSkillRankHandler>());
        registry.register(HandlerDescriptor::of::<GrantExpertisesHandler>());
        registry.register(HandlerDescriptor::of::<RemoveExpertisesHandler>());
        registry.register(HandlerDescriptor::of::<UseItemHandler>());
        registry.register(HandlerDescriptor::of::<UpdateItemHandler>());
        registry.register(HandlerDescriptor::of::<UpdateActorHandler>());
        registry.register(HandlerDescriptor::of::<ExecuteMacroHandler>());
        registry
    }

    pub fn register(&mut self, descriptor: HandlerDescriptor) {
        self.handlers.insert(descriptor.handler_type, descriptor);
    }

    pub fn get(&self, handler_type: HandlerType) -> Option<&HandlerDescriptor> {
        self.handlers.get(&handler_type)
    }

    /// Build the handler a rule's config describes.
    pub fn build(&self, config: &HandlerConfig) -> Result<Arc<dyn Handler>, HandlerBuildError> {
        let unresolved = || UnresolvedHandlerTypeError {
            tag: config.handler_type.clone(),
        };
        let handler_type = config.parsed_type().map_err(|_| unresolved())?;
        let descriptor = self.get(handler_type).ok_or_else(unresolved)?;
        Ok(descriptor.build(config)?)
    }

    /// Every registered handler type with its schema, in declaration order.
    pub fn describe(&self) -> Vec<HandlerDescriptor> {
        self.handlers.values().copied().collect()
    }
}
