//! Document references - the "UUID" strings documents are addressed by
//!
//! Format mirrors the host's dotted document paths:
//!
//! ```text
//! Actor.<actor-uuid>
//! Item.<item-uuid>                       (world-level item)
//! Actor.<actor-uuid>.Item.<item-uuid>    (item embedded in an actor)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{ActorId, ItemId};

/// Reference to an actor or item document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentRef {
    Actor(ActorId),
    Item {
        actor: Option<ActorId>,
        item: ItemId,
    },
}

impl DocumentRef {
    pub fn item(actor: Option<ActorId>, item: ItemId) -> Self {
        Self::Item { actor, item }
    }

    /// The actor that owns (or is) the referenced document.
    pub fn actor_id(&self) -> Option<ActorId> {
        match self {
            Self::Actor(id) => Some(*id),
            Self::Item { actor, .. } => *actor,
        }
    }

    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            Self::Actor(_) => None,
            Self::Item { item, .. } => Some(*item),
        }
    }

    /// Two item refs match when their item ids are equal, regardless of
    /// whether the parent actor is spelled out.
    pub fn matches_item(&self, item_id: ItemId) -> bool {
        self.item_id() == Some(item_id)
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actor(id) => write!(f, "Actor.{}", id),
            Self::Item {
                actor: Some(actor),
                item,
            } => write!(f, "Actor.{}.Item.{}", actor, item),
            Self::Item { actor: None, item } => write!(f, "Item.{}", item),
        }
    }
}

impl FromStr for DocumentRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        let bad = || DomainError::invalid_reference(format!("Malformed document reference: {}", s));

        match parts.as_slice() {
            ["Actor", actor] => Ok(Self::Actor(actor.parse().map_err(|_| bad())?)),
            ["Item", item] => Ok(Self::Item {
                actor: None,
                item: item.parse().map_err(|_| bad())?,
            }),
            ["Actor", actor, "Item", item] => Ok(Self::Item {
                actor: Some(actor.parse().map_err(|_| bad())?),
                item: item.parse().map_err(|_| bad())?,
            }),
            _ => Err(bad()),
        }
    }
}

impl Serialize for DocumentRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocumentRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
