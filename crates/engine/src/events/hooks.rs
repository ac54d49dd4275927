//! Host lifecycle hooks and their argument lists.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use itemflow_domain::{Actor, Changes, Item, OperationContext};

/// Name of a host lifecycle hook.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HookName(Cow<'static, str>);

impl HookName {
    // Host document pipeline
    pub const CREATE_ITEM: HookName = HookName::from_static("createItem");
    pub const UPDATE_ITEM: HookName = HookName::from_static("updateItem");
    pub const DELETE_ITEM: HookName = HookName::from_static("deleteItem");
    pub const UPDATE_ACTOR: HookName = HookName::from_static("updateActor");

    // Engine-internal semantic hooks
    pub const USE_ITEM: HookName = HookName::from_static("itemflow.useItem");
    pub const MODE_ACTIVATE: HookName = HookName::from_static("itemflow.modeActivate");
    pub const MODE_DEACTIVATE: HookName = HookName::from_static("itemflow.modeDeactivate");
    pub const APPLY_DAMAGE: HookName = HookName::from_static("itemflow.applyDamage");
    pub const APPLY_INJURY: HookName = HookName::from_static("itemflow.applyInjury");
    pub const REST: HookName = HookName::from_static("itemflow.rest");

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestKind {
    Short,
    Long,
}

/// The hook-specific argument list of a firing.
///
/// Item hooks carry the item as it is after the operation; update hooks also
/// carry the state before it so conditions can detect transitions.
#[derive(Debug, Clone)]
pub enum HookPayload {
    CreateItem {
        item: Item,
        op: OperationContext,
    },
    UpdateItem {
        item: Item,
        previous: Item,
        changes: Changes,
        op: OperationContext,
    },
    DeleteItem {
        item: Item,
        op: OperationContext,
    },
    UpdateActor {
        actor: Actor,
        previous: Actor,
        changes: Changes,
        op: OperationContext,
    },
    UseItem {
        item: Item,
        options: Value,
        op: OperationContext,
    },
    ModeActivate {
        item: Item,
        mode: String,
        op: OperationContext,
    },
    ModeDeactivate {
        item: Item,
        mode: String,
        op: OperationContext,
    },
    ApplyDamage {
        actor: Actor,
        amount: i64,
        damage_type: Option<String>,
        op: OperationContext,
    },
    ApplyInjury {
        actor: Actor,
        injury: String,
        op: OperationContext,
    },
    Rest {
        actor: Actor,
        kind: RestKind,
        op: OperationContext,
    },
}

/// The document a firing is about.
#[derive(Debug, Clone, Copy)]
pub enum HookSubject<'a> {
    Item(&'a Item),
    Actor(&'a Actor),
}

impl HookPayload {
    /// The hook this payload is fired on.
    pub fn hook_name(&self) -> HookName {
        match self {
            Self::CreateItem { .. } => HookName::CREATE_ITEM,
            Self::UpdateItem { .. } => HookName::UPDATE_ITEM,
            Self::DeleteItem { .. } => HookName::DELETE_ITEM,
            Self::UpdateActor { .. } => HookName::UPDATE_ACTOR,
            Self::UseItem { .. } => HookName::USE_ITEM,
            Self::ModeActivate { .. } => HookName::MODE_ACTIVATE,
            Self::ModeDeactivate { .. } => HookName::MODE_DEACTIVATE,
            Self::ApplyDamage { .. } => HookName::APPLY_DAMAGE,
            Self::ApplyInjury { .. } => HookName::APPLY_INJURY,
            Self::Rest { .. } => HookName::REST,
        }
    }

    pub fn op(&self) -> &OperationContext {
        match self {
            Self::CreateItem { op, .. }
            | Self::UpdateItem { op, .. }
            | Self::DeleteItem { op, .. }
            | Self::UpdateActor { op, .. }
            | Self::UseItem { op, .. }
            | Self::ModeActivate { op, .. }
            | Self::ModeDeactivate { op, .. }
            | Self::ApplyDamage { op, .. }
            | Self::ApplyInjury { op, .. }
            | Self::Rest { op, .. } => op,
        }
    }

    pub fn subject(&self) -> HookSubject<'_> {
        match self {
            Self::CreateItem { item, .. }
            | Self::UpdateItem { item, .. }
            | Self::DeleteItem { item, .. }
            | Self::UseItem { item, .. }
            | Self::ModeActivate { item, .. }
            | Self::ModeDeactivate { item, .. } => HookSubject::Item(item),
            Self::UpdateActor { actor, .. }
            | Self::ApplyDamage { actor, .. }
            | Self::ApplyInjury { actor, .. }
            | Self::Rest { actor, .. } => HookSubject::Actor(actor),
        }
    }

    /// Default event options derived from the hook arguments.
    pub fn options(&self) -> Value {
        match self {
            Self::CreateItem { .. } | Self::DeleteItem { .. } => json!({}),
            Self::UpdateItem { changes, .. } | Self::UpdateActor { changes, .. } => {
                json!({ "changes": changes })
            }
            Self::UseItem { options, .. } => options.clone(),
            Self::ModeActivate { mode, .. } | Self::ModeDeactivate { mode, .. } => {
                json!({ "mode": mode })
            }
            Self::ApplyDamage {
                amount,
                damage_type,
                ..
            } => json!({ "amount": amount, "damageType": damage_type }),
            Self::ApplyInjury { injury, .. } => json!({ "injury": injury }),
            Self::Rest { kind, .. } => json!({ "kind": kind }),
        }
    }
}
