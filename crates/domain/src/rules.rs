//! Rules - persisted (event type, handler config) pairs attached to items
//!
//! A rule says "when event `X` happens to this item, run handler `Y` with this
//! configuration". Rules are stored verbatim on the item; the handler config is
//! kept as a raw object so that a malformed config never prevents the item
//! itself from loading. Validation happens when the engine builds the handler.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DomainError;
use crate::ids::RuleId;

/// The kinds of action a rule can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandlerType {
    GrantItems,
    RemoveItems,
    ModifyAttribute,
    SetAttribute,
    ModifySkillRank,
    SetSkillRank,
    GrantExpertises,
    RemoveExpertises,
    UseItem,
    UpdateItem,
    UpdateActor,
    ExecuteMacro,
}

impl HandlerType {
    pub const ALL: [HandlerType; 12] = [
        Self::GrantItems,
        Self::RemoveItems,
        Self::ModifyAttribute,
        Self::SetAttribute,
        Self::ModifySkillRank,
        Self::SetSkillRank,
        Self::GrantExpertises,
        Self::RemoveExpertises,
        Self::UseItem,
        Self::UpdateItem,
        Self::UpdateActor,
        Self::ExecuteMacro,
    ];

    /// The persisted tag, e.g. `grant-items`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GrantItems => "grant-items",
            Self::RemoveItems => "remove-items",
            Self::ModifyAttribute => "modify-attribute",
            Self::SetAttribute => "set-attribute",
            Self::ModifySkillRank => "modify-skill-rank",
            Self::SetSkillRank => "set-skill-rank",
            Self::GrantExpertises => "grant-expertises",
            Self::RemoveExpertises => "remove-expertises",
            Self::UseItem => "use-item",
            Self::UpdateItem => "update-item",
            Self::UpdateActor => "update-actor",
            Self::ExecuteMacro => "execute-macro",
        }
    }
}

impl fmt::Display for HandlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandlerType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::parse(format!("Unknown handler type: {}", s)))
    }
}

/// Raw handler configuration as persisted: `{ "type": <tag>, ...fields }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerConfig {
    #[serde(rename = "type")]
    pub handler_type: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl HandlerConfig {
    pub fn new(handler_type: HandlerType) -> Self {
        Self {
            handler_type: handler_type.as_str().to_string(),
            fields: Map::new(),
        }
    }

    /// Config with an arbitrary (possibly unknown) type tag.
    pub fn raw(handler_type: impl Into<String>) -> Self {
        Self {
            handler_type: handler_type.into(),
            fields: Map::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn parsed_type(&self) -> Result<HandlerType, DomainError> {
        self.handler_type.parse()
    }

    /// The fields as a JSON object (without the type tag).
    pub fn fields_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// A persisted automation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: RuleId,
    /// Human-readable, non-functional
    #[serde(default)]
    pub description: String,
    /// The event type this rule reacts to
    pub event: String,
    pub handler: HandlerConfig,
}

impl Rule {
    pub fn new(event: impl Into<String>, handler: HandlerConfig) -> Self {
        Self {
            id: RuleId::new(),
            description: String::new(),
            event: event.into(),
            handler,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
