//! Actor data schema - where attributes and skills live, and their valid ranges

use serde::{Deserialize, Serialize};

/// Inclusive numeric range documented for a data field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: i64,
    pub max: i64,
}

impl ValueRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }
}

/// The six core attributes and their documented range.
pub const ATTRIBUTES: [&str; 6] = [
    "strength",
    "speed",
    "intellect",
    "willpower",
    "awareness",
    "presence",
];
pub const ATTRIBUTE_RANGE: ValueRange = ValueRange::new(0, 10);
pub const SKILL_RANK_RANGE: ValueRange = ValueRange::new(0, 5);

/// Path of the actor's expertise collection.
pub const EXPERTISES_PATH: &str = "system.expertises";

/// Field layout of actor `system` data.
pub struct ActorSchema;

impl ActorSchema {
    pub fn attribute_path(attribute: &str) -> String {
        format!("system.attributes.{}.value", attribute)
    }

    pub fn skill_rank_path(skill: &str) -> String {
        format!("system.skills.{}.rank", skill)
    }

    /// Range for a known attribute; unknown attributes are not clamped.
    pub fn attribute_range(attribute: &str) -> Option<ValueRange> {
        ATTRIBUTES
            .contains(&attribute)
            .then_some(ATTRIBUTE_RANGE)
    }

    pub fn skill_rank_range(_skill: &str) -> Option<ValueRange> {
        Some(SKILL_RANK_RANGE)
    }
}
