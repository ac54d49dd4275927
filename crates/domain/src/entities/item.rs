//! Item entity - game objects that can carry automation rules
//!
//! Items either live in the world or are embedded in an actor (`actor_id`).
//! Type-specific data lives in the free-form `system` object:
//!
//! ```text
//! system.equipped   bool   (equipment, weapons, armor)
//! system.level      int    (goals: 0..=GOAL_MAX_LEVEL)
//! system.modes      obj    (items with activatable modes)
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data;
use crate::document_ref::DocumentRef;
use crate::entities::OwnershipLevel;
use crate::error::DomainError;
use crate::ids::{ActorId, ItemId, RuleId, UserId};
use crate::rules::Rule;

/// Level at which a goal is complete.
pub const GOAL_MAX_LEVEL: i64 = 3;

/// Kind of item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Weapon,
    Armor,
    Equipment,
    Loot,
    Talent,
    Action,
    Goal,
    Trait,
    Path,
    Ancestry,
    Injury,
    Connection,
    /// Unknown type for forward compatibility
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Equipment => "equipment",
            Self::Loot => "loot",
            Self::Talent => "talent",
            Self::Action => "action",
            Self::Goal => "goal",
            Self::Trait => "trait",
            Self::Path => "path",
            Self::Ancestry => "ancestry",
            Self::Injury => "injury",
            Self::Connection => "connection",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Provenance of an item created by a grant rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    /// The item whose rule granted this one
    pub item: DocumentRef,
    pub rule: RuleId,
    pub granted_at: DateTime<Utc>,
}

/// A game item.
///
/// Plain data struct: the rule list is freely editable by the configuration
/// UI, and the engine never validates it at save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Parent actor for embedded items
    #[serde(default)]
    pub actor_id: Option<ActorId>,
    /// Template (compendium) this item was created from
    #[serde(default)]
    pub source_uuid: Option<String>,
    #[serde(default)]
    pub system: Value,
    /// Automation rules, in persisted order
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub ownership: BTreeMap<UserId, OwnershipLevel>,
    #[serde(default)]
    pub granted_by: Option<Grant>,
}

impl Item {
    pub fn new(name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            item_type,
            actor_id: None,
            source_uuid: None,
            system: Value::Object(Default::default()),
            rules: Vec::new(),
            ownership: BTreeMap::new(),
            granted_by: None,
        }
    }

    pub fn with_system(mut self, system: Value) -> Self {
        self.system = system;
        self
    }

    pub fn with_source(mut self, source_uuid: impl Into<String>) -> Self {
        self.source_uuid = Some(source_uuid.into());
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_owner(mut self, user: UserId, level: OwnershipLevel) -> Self {
        self.ownership.insert(user, level);
        self
    }

    pub fn uuid(&self) -> DocumentRef {
        DocumentRef::item(self.actor_id, self.id)
    }

    pub fn is_embedded(&self) -> bool {
        self.actor_id.is_some()
    }

    pub fn is_equipped(&self) -> bool {
        data::get_flag(&self.system, "equipped")
    }

    pub fn goal_level(&self) -> i64 {
        data::get_i64(&self.system, "level").unwrap_or(0)
    }

    /// Whether this item is (or was created from) the given reference.
    pub fn matches_reference(&self, reference: &str) -> bool {
        self.source_uuid.as_deref() == Some(reference) || self.uuid().to_string() == reference
    }

    // =========================================================================
    // Rule collection
    // =========================================================================

    /// Rules bound to `event_type`, in persisted order.
    pub fn rules_for<'a>(&'a self, event_type: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |rule| rule.event == event_type)
    }

    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn add_rule(&mut self, rule: Rule) -> Result<(), DomainError> {
        if self.rule(rule.id).is_some() {
            return Err(DomainError::validation(format!(
                "Rule {} already exists on item {}",
                rule.id, self.id
            )));
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn remove_rule(&mut self, id: RuleId) -> Option<Rule> {
        let index = self.rules.iter().position(|rule| rule.id == id)?;
        Some(self.rules.remove(index))
    }

    /// Move a rule to `index`, shifting the others. Order is significant.
    pub fn move_rule(&mut self, id: RuleId, index: usize) -> Result<(), DomainError> {
        let from = self
            .rules
            .iter()
            .position(|rule| rule.id == id)
            .ok_or_else(|| DomainError::not_found("Rule", id.to_string()))?;
        if index >= self.rules.len() {
            return Err(DomainError::validation(format!(
                "Rule index {} out of bounds ({} rules)",
                index,
                self.rules.len()
            )));
        }
        let rule = self.rules.remove(from);
        self.rules.insert(index, rule);
        Ok(())
    }
}
