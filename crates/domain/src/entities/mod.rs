//! Document entities

mod actor;
mod item;

pub use actor::{Actor, ActorType};
pub use item::{Grant, Item, ItemType, GOAL_MAX_LEVEL};

use serde::{Deserialize, Serialize};

/// Permission a user holds on a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnershipLevel {
    #[default]
    None,
    Limited,
    Observer,
    Owner,
}
