//! Application state and composition.

use std::sync::Arc;

use serde_json::Value;

use itemflow_domain::{
    Actor, ActorId, Changes, DocumentRef, Item, ItemId, OperationContext, UserId,
};

use crate::dispatch::Dispatcher;
use crate::events::{DuplicateEventTypeError, EventTypeRegistry, HookPayload, RestKind};
use crate::handlers::{HandlerPorts, HandlerRegistry};
use crate::infrastructure::{
    config::EngineConfig,
    hooks::LocalHooks,
    item_use::HookItemUse,
    memory::InMemoryDocumentStore,
    ports::{
        ClockPort, DocumentStore, ItemUsePort, MacroRunner, Notifier, RepoError, SessionPort,
    },
};

/// Services supplied by whoever embeds the engine.
pub struct AppServices {
    pub session: Arc<dyn SessionPort>,
    pub macros: Arc<dyn MacroRunner>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn ClockPort>,
}

/// Main application state.
///
/// One world (store + hook host) and the dispatcher of the local client.
/// Host actions start root operations and fire hooks the way the host does.
pub struct App {
    pub config: EngineConfig,
    pub registry: Arc<EventTypeRegistry>,
    pub handlers: Arc<HandlerRegistry>,
    pub hooks: Arc<LocalHooks>,
    pub store: Arc<InMemoryDocumentStore>,
    pub dispatcher: Arc<Dispatcher>,
    ports: HandlerPorts,
    notifier: Arc<dyn Notifier>,
}

impl App {
    /// Create an App with the built-in event types and handlers.
    pub fn new(
        config: EngineConfig,
        services: AppServices,
    ) -> Result<Self, DuplicateEventTypeError> {
        Ok(Self::with_registries(
            config,
            services,
            EventTypeRegistry::with_builtin_types()?,
            HandlerRegistry::with_builtin_handlers(),
        ))
    }

    /// Create an App with caller-extended registries.
    ///
    /// The registries are frozen here: hook listeners are bound once, for the
    /// hooks the registered event types need.
    pub fn with_registries(
        config: EngineConfig,
        services: AppServices,
        registry: EventTypeRegistry,
        handlers: HandlerRegistry,
    ) -> Self {
        let hooks = Arc::new(LocalHooks::new());
        let store = Arc::new(InMemoryDocumentStore::with_hooks(hooks.clone()));

        let ports = HandlerPorts {
            documents: store.clone() as Arc<dyn DocumentStore>,
            item_use: Arc::new(HookItemUse::new(hooks.clone())) as Arc<dyn ItemUsePort>,
            macros: services.macros,
            clock: services.clock,
        };

        let registry = Arc::new(registry);
        let handlers = Arc::new(handlers);
        let dispatcher = Arc::new(Dispatcher::new(
            registry.clone(),
            handlers.clone(),
            ports.clone(),
            services.session,
            services.notifier.clone(),
            config.dispatch,
        ));
        dispatcher.bind(hooks.as_ref());

        tracing::info!(
            event_types = registry.len(),
            handler_types = handlers.describe().len(),
            max_chain_depth = config.dispatch.max_chain_depth,
            "Engine ready"
        );

        Self {
            config,
            registry,
            handlers,
            hooks,
            store,
            dispatcher,
            ports,
            notifier: services.notifier,
        }
    }

    /// Connect another client to the same world.
    ///
    /// The client gets its own dispatcher, listening on the shared hooks and
    /// electing with its own session view.
    pub fn join(&self, session: Arc<dyn SessionPort>) -> Arc<Dispatcher> {
        let dispatcher = Arc::new(Dispatcher::new(
            self.registry.clone(),
            self.handlers.clone(),
            self.ports.clone(),
            session,
            self.notifier.clone(),
            self.config.dispatch,
        ));
        dispatcher.bind(self.hooks.as_ref());
        dispatcher
    }

    // =========================================================================
    // Host actions
    // =========================================================================

    fn root_op(&self, user: UserId) -> OperationContext {
        OperationContext::new(user, self.ports.clock.now())
    }

    async fn require_item(&self, uuid: DocumentRef) -> Result<Item, RepoError> {
        self.store
            .get_item(uuid)
            .await?
            .ok_or_else(|| RepoError::not_found("Item", uuid))
    }

    pub async fn update_item(
        &self,
        user: UserId,
        uuid: DocumentRef,
        changes: &Changes,
    ) -> Result<Item, RepoError> {
        self.store.update_item(uuid, changes, &self.root_op(user)).await
    }

    pub async fn update_actor(
        &self,
        user: UserId,
        actor: ActorId,
        changes: &Changes,
    ) -> Result<(), RepoError> {
        self.store
            .update_actor(actor, changes, &self.root_op(user))
            .await
            .map(|_| ())
    }

    pub async fn create_items(
        &self,
        user: UserId,
        actor: ActorId,
        items: Vec<Item>,
    ) -> Result<Vec<Item>, RepoError> {
        self.store
            .create_embedded_items(actor, items, &self.root_op(user))
            .await
    }

    pub async fn delete_items(
        &self,
        user: UserId,
        actor: ActorId,
        ids: Vec<ItemId>,
    ) -> Result<Vec<ItemId>, RepoError> {
        self.store
            .delete_embedded_items(actor, ids, &self.root_op(user))
            .await
    }

    pub async fn use_item(
        &self,
        user: UserId,
        uuid: DocumentRef,
        options: Value,
    ) -> Result<(), RepoError> {
        let item = self.require_item(uuid).await?;
        self.hooks
            .fire(&HookPayload::UseItem {
                item,
                options,
                op: self.root_op(user),
            })
            .await;
        Ok(())
    }

    pub async fn activate_mode(
        &self,
        user: UserId,
        uuid: DocumentRef,
        mode: String,
    ) -> Result<(), RepoError> {
        let item = self.require_item(uuid).await?;
        self.hooks
            .fire(&HookPayload::ModeActivate {
                item,
                mode,
                op: self.root_op(user),
            })
            .await;
        Ok(())
    }

    pub async fn deactivate_mode(
        &self,
        user: UserId,
        uuid: DocumentRef,
        mode: String,
    ) -> Result<(), RepoError> {
        let item = self.require_item(uuid).await?;
        self.hooks
            .fire(&HookPayload::ModeDeactivate {
                item,
                mode,
                op: self.root_op(user),
            })
            .await;
        Ok(())
    }

    async fn fire_for_actor(
        &self,
        actor: ActorId,
        payload: impl FnOnce(Actor) -> HookPayload,
    ) -> Result<(), RepoError> {
        let actor = self
            .store
            .get_actor(actor)
            .await?
            .ok_or_else(|| RepoError::not_found("Actor", actor))?;
        self.hooks.fire(&payload(actor)).await;
        Ok(())
    }

    pub async fn apply_damage(
        &self,
        user: UserId,
        actor: ActorId,
        amount: i64,
        damage_type: Option<String>,
    ) -> Result<(), RepoError> {
        let op = self.root_op(user);
        self.fire_for_actor(actor, |actor| HookPayload::ApplyDamage {
            actor,
            amount,
            damage_type,
            op,
        })
        .await
    }

    pub async fn apply_injury(
        &self,
        user: UserId,
        actor: ActorId,
        injury: String,
    ) -> Result<(), RepoError> {
        let op = self.root_op(user);
        self.fire_for_actor(actor, |actor| HookPayload::ApplyInjury { actor, injury, op })
            .await
    }

    pub async fn rest(
        &self,
        user: UserId,
        actor: ActorId,
        kind: RestKind,
    ) -> Result<(), RepoError> {
        let op = self.root_op(user);
        self.fire_for_actor(actor, |actor| HookPayload::Rest { actor, kind, op })
            .await
    }
}
