//! Scenario files: a seeded world and an ordered list of host actions.
//!
//! ```json
//! {
//!   "users": [{ "id": "…", "name": "GM", "isGm": true }],
//!   "localUser": "GM",
//!   "actors": [ { "id": "…", "name": "Kaladin", "type": "character", "items": [ … ] } ],
//!   "templates": { "Compendium.items.spear": { … } },
//!   "macros": { "Macro.announce": null },
//!   "steps": [
//!     { "action": "updateItem", "actor": "Kaladin", "item": "Shardplate",
//!       "changes": { "system.equipped": true } }
//!   ]
//! }
//! ```
//!
//! Steps address actors and items by name. Each step runs to completion,
//! including every dispatch it causes, before the next one starts.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use itemflow_domain::{Actor, ActorId, Changes, DocumentRef, Item, UserId};

use crate::app::{App, AppServices};
use crate::events::{DuplicateEventTypeError, RestKind};
use crate::infrastructure::{
    clock::{FixedClock, SystemClock},
    config::EngineConfig,
    macros::ScriptedMacroRunner,
    memory::Mutation,
    notifier::TracingNotifier,
    ports::{ClockPort, RepoError, SessionPort, SessionUser},
    session::StaticSession,
};

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unknown user: {0}")]
    UnknownUser(String),
    #[error("Unknown actor: {0}")]
    UnknownActor(String),
    #[error("Actor {actor} has no item named {item}")]
    UnknownItem { actor: String, item: String },
    #[error(transparent)]
    Registry(#[from] DuplicateEventTypeError),
    #[error("Step {step} failed: {source}")]
    Step {
        step: usize,
        #[source]
        source: RepoError,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub users: Vec<SessionUser>,
    /// Name of the user this client runs as; the first GM when absent
    #[serde(default)]
    pub local_user: Option<String>,
    #[serde(default)]
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub world_items: Vec<Item>,
    #[serde(default)]
    pub templates: BTreeMap<String, Item>,
    /// Macros that exist in the world and what each returns
    #[serde(default)]
    pub macros: HashMap<String, Option<bool>>,
    /// Freeze the clock at this instant
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    pub steps: Vec<Step>,
}

/// One host action. `user` names the acting user (default: the local user).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Step {
    UpdateItem {
        actor: String,
        item: String,
        changes: Changes,
        #[serde(default)]
        user: Option<String>,
    },
    UpdateActor {
        actor: String,
        changes: Changes,
        #[serde(default)]
        user: Option<String>,
    },
    CreateItem {
        actor: String,
        item: Item,
        #[serde(default)]
        user: Option<String>,
    },
    DeleteItem {
        actor: String,
        item: String,
        #[serde(default)]
        user: Option<String>,
    },
    UseItem {
        actor: String,
        item: String,
        #[serde(default)]
        options: Value,
        #[serde(default)]
        user: Option<String>,
    },
    ActivateMode {
        actor: String,
        item: String,
        mode: String,
        #[serde(default)]
        user: Option<String>,
    },
    DeactivateMode {
        actor: String,
        item: String,
        mode: String,
        #[serde(default)]
        user: Option<String>,
    },
    ApplyDamage {
        actor: String,
        amount: i64,
        #[serde(default)]
        damage_type: Option<String>,
        #[serde(default)]
        user: Option<String>,
    },
    ApplyInjury {
        actor: String,
        injury: String,
        #[serde(default)]
        user: Option<String>,
    },
    Rest {
        actor: String,
        kind: RestKind,
        #[serde(default)]
        user: Option<String>,
    },
}

impl Step {
    fn user(&self) -> Option<&str> {
        match self {
            Self::UpdateItem { user, .. }
            | Self::UpdateActor { user, .. }
            | Self::CreateItem { user, .. }
            | Self::DeleteItem { user, .. }
            | Self::UseItem { user, .. }
            | Self::ActivateMode { user, .. }
            | Self::DeactivateMode { user, .. }
            | Self::ApplyDamage { user, .. }
            | Self::ApplyInjury { user, .. }
            | Self::Rest { user, .. } => user.as_deref(),
        }
    }
}

/// World state after the last step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcome {
    pub actors: Vec<Actor>,
    pub mutations: Vec<Mutation>,
    /// Macros invoked, in call order
    pub macro_calls: Vec<String>,
}

impl Scenario {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Seed a fresh world, run every step and report the final state.
    ///
    /// A user id in `config.local_user` overrides the file's `localUser`.
    pub async fn run(self, config: EngineConfig) -> Result<ScenarioOutcome, ScenarioError> {
        let session = self.session(config.local_user)?;
        let local = session.local_user().id;
        let macros = Arc::new(ScriptedMacroRunner::from_results(self.macros.clone()));
        let clock: Arc<dyn ClockPort> = match self.started_at {
            Some(at) => Arc::new(FixedClock(at)),
            None => Arc::new(SystemClock),
        };

        let app = App::new(
            config,
            AppServices {
                session: Arc::new(session.clone()),
                macros: macros.clone(),
                notifier: Arc::new(TracingNotifier),
                clock,
            },
        )?;

        for actor in self.actors {
            app.store.insert_actor(actor);
        }
        for item in self.world_items {
            app.store.insert_world_item(item);
        }
        for (uuid, template) in self.templates {
            app.store.insert_template(uuid, template);
        }

        let users = session.users();
        for (index, step) in self.steps.into_iter().enumerate() {
            let user = match step.user() {
                Some(name) => find_user(&users, name)?.id,
                None => local,
            };
            tracing::info!(step = index + 1, user = %user, "Running scenario step");
            run_step(&app, user, step)
                .await
                .map_err(|e| match e {
                    StepError::Scenario(e) => e,
                    StepError::Repo(source) => ScenarioError::Step {
                        step: index + 1,
                        source,
                    },
                })?;
        }

        Ok(ScenarioOutcome {
            actors: app.store.actors(),
            mutations: app.store.mutations(),
            macro_calls: macros.calls().into_iter().map(|(name, _)| name).collect(),
        })
    }

    fn session(&self, override_user: Option<UserId>) -> Result<StaticSession, ScenarioError> {
        if self.users.is_empty() {
            return Ok(StaticSession::solo_gm("Gamemaster"));
        }

        let local = match (override_user, &self.local_user) {
            (Some(id), _) => id,
            (None, Some(name)) => find_user(&self.users, name)?.id,
            (None, None) => self
                .users
                .iter()
                .find(|user| user.is_gm)
                .unwrap_or(&self.users[0])
                .id,
        };
        StaticSession::new(self.users.clone(), local)
            .ok_or_else(|| ScenarioError::UnknownUser(local.to_string()))
    }
}

fn find_user<'a>(users: &'a [SessionUser], name: &str) -> Result<&'a SessionUser, ScenarioError> {
    users
        .iter()
        .find(|user| user.name == name)
        .ok_or_else(|| ScenarioError::UnknownUser(name.to_string()))
}

enum StepError {
    Scenario(ScenarioError),
    Repo(RepoError),
}

impl From<ScenarioError> for StepError {
    fn from(err: ScenarioError) -> Self {
        Self::Scenario(err)
    }
}

impl From<RepoError> for StepError {
    fn from(err: RepoError) -> Self {
        Self::Repo(err)
    }
}

fn actor_id(app: &App, name: &str) -> Result<ActorId, ScenarioError> {
    app.store
        .actor_named(name)
        .map(|actor| actor.id)
        .ok_or_else(|| ScenarioError::UnknownActor(name.to_string()))
}

fn item_ref(app: &App, actor: &str, item: &str) -> Result<DocumentRef, ScenarioError> {
    let owner = app
        .store
        .actor_named(actor)
        .ok_or_else(|| ScenarioError::UnknownActor(actor.to_string()))?;
    owner
        .items
        .iter()
        .find(|candidate| candidate.name == item)
        .map(Item::uuid)
        .ok_or_else(|| ScenarioError::UnknownItem {
            actor: actor.to_string(),
            item: item.to_string(),
        })
}

async fn run_step(app: &App, user: UserId, step: Step) -> Result<(), StepError> {
    match step {
        Step::UpdateItem {
            actor,
            item,
            changes,
            ..
        } => {
            let uuid = item_ref(app, &actor, &item)?;
            app.update_item(user, uuid, &changes).await?;
        }
        Step::UpdateActor { actor, changes, .. } => {
            let id = actor_id(app, &actor)?;
            app.update_actor(user, id, &changes).await?;
        }
        Step::CreateItem { actor, item, .. } => {
            let id = actor_id(app, &actor)?;
            app.create_items(user, id, vec![item]).await?;
        }
        Step::DeleteItem { actor, item, .. } => {
            let uuid = item_ref(app, &actor, &item)?;
            let id = actor_id(app, &actor)?;
            let item_id = uuid.item_id().into_iter().collect();
            app.delete_items(user, id, item_id).await?;
        }
        Step::UseItem {
            actor,
            item,
            options,
            ..
        } => {
            let uuid = item_ref(app, &actor, &item)?;
            let options = if options.is_null() {
                Value::Object(Default::default())
            } else {
                options
            };
            app.use_item(user, uuid, options).await?;
        }
        Step::ActivateMode {
            actor, item, mode, ..
        } => {
            let uuid = item_ref(app, &actor, &item)?;
            app.activate_mode(user, uuid, mode).await?;
        }
        Step::DeactivateMode {
            actor, item, mode, ..
        } => {
            let uuid = item_ref(app, &actor, &item)?;
            app.deactivate_mode(user, uuid, mode).await?;
        }
        Step::ApplyDamage {
            actor,
            amount,
            damage_type,
            ..
        } => {
            let id = actor_id(app, &actor)?;
            app.apply_damage(user, id, amount, damage_type).await?;
        }
        Step::ApplyInjury { actor, injury, .. } => {
            let id = actor_id(app, &actor)?;
            app.apply_injury(user, id, injury).await?;
        }
        Step::Rest { actor, kind, .. } => {
            let id = actor_id(app, &actor)?;
            app.rest(user, id, kind).await?;
        }
    }
    Ok(())
}
