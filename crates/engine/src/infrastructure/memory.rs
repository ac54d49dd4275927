//! In-memory document store.
//!
//! Behaves like the host's document API for a single process: mutations apply
//! atomically per document, then fire the matching lifecycle hook with the
//! caller's operation context. Map guards are always released before a hook
//! fires, since listeners read and mutate documents re-entrantly.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;

use itemflow_domain::data::set_path;
use itemflow_domain::{
    Actor, ActorId, Changes, DocumentRef, DomainError, Item, ItemId, OperationContext,
    OperationId,
};

use crate::events::HookPayload;
use crate::infrastructure::hooks::LocalHooks;
use crate::infrastructure::ports::{DocumentStore, RepoError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationKind {
    UpdateActor,
    UpdateItem,
    CreateItem,
    DeleteItem,
}

/// One applied mutation, in application order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    pub kind: MutationKind,
    pub document: DocumentRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<Changes>,
    pub operation: OperationId,
    /// Dispatch chain depth of the causing operation; 0 for host actions
    pub depth: usize,
}

#[derive(Default)]
pub struct InMemoryDocumentStore {
    actors: DashMap<ActorId, Actor>,
    world_items: DashMap<ItemId, Item>,
    /// Compendium entries keyed by their uuid string
    templates: DashMap<String, Item>,
    hooks: Option<Arc<LocalHooks>>,
    log: Mutex<Vec<Mutation>>,
}

impl InMemoryDocumentStore {
    /// A store that fires no hooks.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hooks(hooks: Arc<LocalHooks>) -> Self {
        Self {
            hooks: Some(hooks),
            ..Self::default()
        }
    }

    // Seeding. None of these fire hooks or appear in the mutation log.

    pub fn insert_actor(&self, actor: Actor) {
        self.actors.insert(actor.id, actor);
    }

    pub fn insert_world_item(&self, mut item: Item) {
        item.actor_id = None;
        self.world_items.insert(item.id, item);
    }

    pub fn insert_template(&self, uuid: impl Into<String>, item: Item) {
        self.templates.insert(uuid.into(), item);
    }

    // Snapshots

    pub fn actor(&self, id: ActorId) -> Option<Actor> {
        self.actors.get(&id).map(|entry| entry.value().clone())
    }

    pub fn actor_named(&self, name: &str) -> Option<Actor> {
        self.actors
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value().clone())
    }

    /// All actors, ordered by name.
    pub fn actors(&self) -> Vec<Actor> {
        let mut actors: Vec<Actor> = self
            .actors
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        actors.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        actors
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(
        &self,
        kind: MutationKind,
        document: DocumentRef,
        changes: Option<&Changes>,
        op: &OperationContext,
    ) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Mutation {
                kind,
                document,
                changes: changes.cloned(),
                operation: op.id,
                depth: op.depth(),
            });
    }

    async fn fire(&self, payload: HookPayload) {
        if let Some(hooks) = &self.hooks {
            hooks.fire(&payload).await;
        }
    }

    fn item_snapshot(&self, uuid: DocumentRef) -> Option<Item> {
        match uuid {
            DocumentRef::Item {
                actor: Some(actor_id),
                item,
            } => self
                .actors
                .get(&actor_id)
                .and_then(|actor| actor.find_item(item).cloned()),
            DocumentRef::Item { actor: None, item } => self
                .world_items
                .get(&item)
                .map(|entry| entry.value().clone()),
            DocumentRef::Actor(_) => None,
        }
    }
}

/// Apply document-rooted paths (`name`, `system.*`) to a copy, so a bad path
/// leaves the document untouched.
fn edited(
    name: &str,
    system: &Value,
    changes: &Changes,
) -> Result<(String, Value), DomainError> {
    let mut name = name.to_string();
    let mut system = system.clone();
    for (path, value) in changes {
        if let Some(rest) = path.strip_prefix("system.") {
            set_path(&mut system, rest, value.clone())?;
        } else if path == "name" {
            name = value
                .as_str()
                .ok_or_else(|| DomainError::data_path(path, "name must be a string"))?
                .to_string();
        } else {
            return Err(DomainError::data_path(path, "not an editable field"));
        }
    }
    Ok((name, system))
}

fn edit_item(item: &mut Item, changes: &Changes) -> Result<(Item, Item), DomainError> {
    let previous = item.clone();
    let (name, system) = edited(&item.name, &item.system, changes)?;
    item.name = name;
    item.system = system;
    Ok((previous, item.clone()))
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get_actor(&self, id: ActorId) -> Result<Option<Actor>, RepoError> {
        Ok(self.actor(id))
    }

    async fn get_item(&self, uuid: DocumentRef) -> Result<Option<Item>, RepoError> {
        Ok(self.item_snapshot(uuid))
    }

    async fn fetch_template(&self, uuid: &str) -> Result<Option<Item>, RepoError> {
        if let Some(template) = self.templates.get(uuid) {
            return Ok(Some(template.value().clone()));
        }
        // Not a compendium entry: world and embedded items are valid sources too.
        Ok(uuid
            .parse::<DocumentRef>()
            .ok()
            .and_then(|reference| self.item_snapshot(reference)))
    }

    async fn update_actor(
        &self,
        id: ActorId,
        changes: &Changes,
        op: &OperationContext,
    ) -> Result<Actor, RepoError> {
        let (previous, updated) = {
            let mut actor = self
                .actors
                .get_mut(&id)
                .ok_or_else(|| RepoError::not_found("Actor", id))?;
            let previous = actor.clone();
            let (name, system) = edited(&actor.name, &actor.system, changes)?;
            actor.name = name;
            actor.system = system;
            (previous, actor.clone())
        };

        self.record(MutationKind::UpdateActor, updated.uuid(), Some(changes), op);
        tracing::debug!(actor_id = %id, depth = op.depth(), "Actor updated");

        self.fire(HookPayload::UpdateActor {
            actor: updated.clone(),
            previous,
            changes: changes.clone(),
            op: op.clone(),
        })
        .await;
        Ok(updated)
    }

    async fn update_item(
        &self,
        uuid: DocumentRef,
        changes: &Changes,
        op: &OperationContext,
    ) -> Result<Item, RepoError> {
        let (previous, updated) = match uuid {
            DocumentRef::Item {
                actor: Some(actor_id),
                item,
            } => {
                let mut actor = self
                    .actors
                    .get_mut(&actor_id)
                    .ok_or_else(|| RepoError::not_found("Item", uuid))?;
                let target = actor
                    .find_item_mut(item)
                    .ok_or_else(|| RepoError::not_found("Item", uuid))?;
                edit_item(target, changes)?
            }
            DocumentRef::Item { actor: None, item } => {
                let mut target = self
                    .world_items
                    .get_mut(&item)
                    .ok_or_else(|| RepoError::not_found("Item", uuid))?;
                edit_item(&mut target, changes)?
            }
            DocumentRef::Actor(_) => {
                return Err(RepoError::Validation(format!("{} is not an item", uuid)))
            }
        };

        self.record(MutationKind::UpdateItem, uuid, Some(changes), op);
        tracing::debug!(item = %uuid, depth = op.depth(), "Item updated");

        self.fire(HookPayload::UpdateItem {
            item: updated.clone(),
            previous,
            changes: changes.clone(),
            op: op.clone(),
        })
        .await;
        Ok(updated)
    }

    async fn create_embedded_items(
        &self,
        actor: ActorId,
        items: Vec<Item>,
        op: &OperationContext,
    ) -> Result<Vec<Item>, RepoError> {
        let created: Vec<Item> = {
            let mut parent = self
                .actors
                .get_mut(&actor)
                .ok_or_else(|| RepoError::not_found("Actor", actor))?;
            let mut created = Vec::with_capacity(items.len());
            for mut item in items {
                item.actor_id = Some(actor);
                created.push(item.clone());
                parent.items.push(item);
            }
            created
        };

        for item in &created {
            self.record(MutationKind::CreateItem, item.uuid(), None, op);
        }
        tracing::debug!(
            actor_id = %actor,
            count = created.len(),
            depth = op.depth(),
            "Items created"
        );

        for item in &created {
            self.fire(HookPayload::CreateItem {
                item: item.clone(),
                op: op.clone(),
            })
            .await;
        }
        Ok(created)
    }

    async fn delete_embedded_items(
        &self,
        actor: ActorId,
        ids: Vec<ItemId>,
        op: &OperationContext,
    ) -> Result<Vec<ItemId>, RepoError> {
        let removed: Vec<Item> = {
            let mut parent = self
                .actors
                .get_mut(&actor)
                .ok_or_else(|| RepoError::not_found("Actor", actor))?;
            let (removed, kept): (Vec<Item>, Vec<Item>) = std::mem::take(&mut parent.items)
                .into_iter()
                .partition(|item| ids.contains(&item.id));
            parent.items = kept;
            removed
        };

        for item in &removed {
            self.record(MutationKind::DeleteItem, item.uuid(), None, op);
        }
        tracing::debug!(
            actor_id = %actor,
            count = removed.len(),
            depth = op.depth(),
            "Items deleted"
        );

        let deleted = removed.iter().map(|item| item.id).collect();
        for item in removed {
            self.fire(HookPayload::DeleteItem { item, op: op.clone() })
                .await;
        }
        Ok(deleted)
    }
}
