//! Test world construction.

use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use itemflow_domain::{
    Actor, ActorType, Changes, DocumentRef, HandlerConfig, HandlerType, Item, ItemType, Rule,
};

use crate::app::{App, AppServices};
use crate::events::EventTypeRegistry;
use crate::handlers::HandlerRegistry;
use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::macros::ScriptedMacroRunner;
use crate::infrastructure::memory::MutationKind;
use crate::infrastructure::ports::{Notifier, SessionUser};
use crate::infrastructure::session::StaticSession;

pub const SPEAR: &str = "Compendium.items.spear";

/// Notifier that keeps every message.
#[derive(Default)]
pub struct Notes {
    pub warnings: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl Notifier for Notes {
    fn warn(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

pub struct TestWorld {
    pub app: App,
    pub gm: SessionUser,
    pub macros: Arc<ScriptedMacroRunner>,
    pub notes: Arc<Notes>,
}

impl TestWorld {
    /// A world with a single GM client and the built-in registries.
    pub fn new() -> Self {
        Self::build(ScriptedMacroRunner::new(), None)
    }

    pub fn with_macros(macros: ScriptedMacroRunner) -> Self {
        Self::build(macros, None)
    }

    pub fn with_registry(registry: EventTypeRegistry) -> Self {
        Self::build(ScriptedMacroRunner::new(), Some(registry))
    }

    /// GM client plus a connected player, with the GM as the local client.
    pub fn with_users(users: Vec<SessionUser>) -> Self {
        let gm = users
            .iter()
            .find(|user| user.is_gm)
            .cloned()
            .expect("a GM");
        let session = StaticSession::new(users, gm.id).expect("GM is a member");
        Self::assemble(session, gm, ScriptedMacroRunner::new(), None)
    }

    fn build(macros: ScriptedMacroRunner, registry: Option<EventTypeRegistry>) -> Self {
        let gm = SessionUser::gm("Gamemaster");
        let session = StaticSession::new(vec![gm.clone()], gm.id).expect("GM is a member");
        Self::assemble(session, gm, macros, registry)
    }

    fn assemble(
        session: StaticSession,
        gm: SessionUser,
        macros: ScriptedMacroRunner,
        registry: Option<EventTypeRegistry>,
    ) -> Self {
        let macros = Arc::new(macros);
        let notes = Arc::new(Notes::default());
        let registry = registry.unwrap_or_else(|| {
            EventTypeRegistry::with_builtin_types().expect("built-in types register")
        });

        let app = App::with_registries(
            EngineConfig::default(),
            AppServices {
                session: Arc::new(session),
                macros: macros.clone(),
                notifier: notes.clone(),
                clock: Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())),
            },
            registry,
            HandlerRegistry::with_builtin_handlers(),
        );

        Self {
            app,
            gm,
            macros,
            notes,
        }
    }

    pub fn seed(&self, actor: Actor) -> Actor {
        self.app.store.insert_actor(actor.clone());
        actor
    }

    pub fn actor(&self, actor: &Actor) -> Actor {
        self.app.store.actor(actor.id).expect("actor exists")
    }

    /// Ref of the actor's first item with this name.
    pub fn item(&self, actor: &Actor, name: &str) -> DocumentRef {
        self.actor(actor)
            .items
            .iter()
            .find(|item| item.name == name)
            .map(Item::uuid)
            .expect("item exists")
    }

    pub async fn update_item(&self, actor: &Actor, name: &str, changes: Value) {
        let uuid = self.item(actor, name);
        self.app
            .update_item(self.gm.id, uuid, &changes_of(changes))
            .await
            .expect("update succeeds");
    }

    pub async fn use_item(&self, actor: &Actor, name: &str) {
        let uuid = self.item(actor, name);
        self.app
            .use_item(self.gm.id, uuid, json!({}))
            .await
            .expect("use succeeds");
    }

    pub fn mutation_kinds(&self) -> Vec<MutationKind> {
        self.app
            .store
            .mutations()
            .into_iter()
            .map(|mutation| mutation.kind)
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.notes.warnings.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notes.errors.lock().unwrap().clone()
    }
}

pub fn changes_of(value: Value) -> Changes {
    value.as_object().cloned().expect("changes object")
}

pub fn character(name: &str) -> Actor {
    Actor::new(name, ActorType::Character).with_system(json!({
        "attributes": { "speed": { "value": 3 } },
        "inspiration": 0
    }))
}

pub fn inspiration(actor: &Actor) -> Option<i64> {
    itemflow_domain::data::get_i64(&actor.system, "inspiration")
}

pub fn rule(event: &str, handler_type: HandlerType, fields: Value) -> Rule {
    let mut config = HandlerConfig::new(handler_type);
    config.fields = fields.as_object().cloned().unwrap_or_default();
    Rule::new(event, config)
}

pub fn gain_inspiration(event: &str) -> Rule {
    rule(
        event,
        HandlerType::UpdateActor,
        json!({ "changes": { "system.inspiration": "+1" } }),
    )
}

pub fn spear_template() -> Item {
    Item::new("Spear", ItemType::Weapon).with_system(json!({ "damage": "1d8" }))
}
