//! Actor entity - characters and adversaries that own items

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data;
use crate::document_ref::DocumentRef;
use crate::entities::{Item, OwnershipLevel};
use crate::expertise::Expertise;
use crate::ids::{ActorId, ItemId, UserId};
use crate::schema::{ActorSchema, EXPERTISES_PATH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorType {
    Character,
    Adversary,
    /// Unknown type for forward compatibility
    #[serde(other)]
    Unknown,
}

/// An actor and its embedded items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    #[serde(rename = "type")]
    pub actor_type: ActorType,
    #[serde(default)]
    pub ownership: BTreeMap<UserId, OwnershipLevel>,
    #[serde(default)]
    pub system: Value,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Actor {
    pub fn new(name: impl Into<String>, actor_type: ActorType) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            actor_type,
            ownership: BTreeMap::new(),
            system: Value::Object(Default::default()),
            items: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: Value) -> Self {
        self.system = system;
        self
    }

    pub fn with_owner(mut self, user: UserId, level: OwnershipLevel) -> Self {
        self.ownership.insert(user, level);
        self
    }

    /// Embed an item, re-parenting it to this actor.
    pub fn with_item(mut self, item: Item) -> Self {
        self.add_item(item);
        self
    }

    pub fn add_item(&mut self, mut item: Item) -> DocumentRef {
        item.actor_id = Some(self.id);
        let uuid = item.uuid();
        self.items.push(item);
        uuid
    }

    pub fn uuid(&self) -> DocumentRef {
        DocumentRef::Actor(self.id)
    }

    pub fn find_item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn find_item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Items that are, or were created from, `reference`.
    pub fn find_by_reference<'a>(
        &'a self,
        reference: &'a str,
    ) -> impl Iterator<Item = &'a Item> + 'a {
        self.items
            .iter()
            .filter(move |item| item.matches_reference(reference))
    }

    pub fn attribute(&self, attribute: &str) -> Option<i64> {
        data::get_i64(&self.system, &strip_system(&ActorSchema::attribute_path(attribute)))
    }

    pub fn skill_rank(&self, skill: &str) -> Option<i64> {
        data::get_i64(&self.system, &strip_system(&ActorSchema::skill_rank_path(skill)))
    }

    /// Expertise collection; malformed entries are ignored.
    pub fn expertises(&self) -> Vec<Expertise> {
        data::get_path(&self.system, &strip_system(EXPERTISES_PATH))
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default()
    }

    /// Read any dotted document path (`system.*`, `name`).
    pub fn read_path(&self, path: &str) -> Option<Value> {
        match path.strip_prefix("system.") {
            Some(rest) => data::get_path(&self.system, rest).cloned(),
            None if path == "name" => Some(Value::from(self.name.clone())),
            None => None,
        }
    }
}

/// Document paths are rooted at the document; `system` data is stored separately.
fn strip_system(path: &str) -> String {
    path.strip_prefix("system.").unwrap_or(path).to_string()
}
