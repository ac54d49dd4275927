//! Built-in event types.
//!
//! Every condition here compares the state before and after a single host
//! operation, so each event fires at most once per operation no matter how
//! many unrelated fields the update touched.

use itemflow_domain::{Item, ItemType, GOAL_MAX_LEVEL};

use super::event::{EventDocument, EventPatch};
use super::hooks::{HookName, HookPayload, RestKind};
use super::registration::EventTypeRegistration;

/// Source name the built-in types are registered under.
pub const BUILTIN_SOURCE: &str = "itemflow";

/// Built-in event type names.
pub mod event_types {
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    pub const ADD_TO_ACTOR: &str = "add-to-actor";
    pub const REMOVE_FROM_ACTOR: &str = "remove-from-actor";
    pub const EQUIP: &str = "equip";
    pub const UNEQUIP: &str = "unequip";
    pub const USE: &str = "use";
    pub const MODE_ACTIVATE: &str = "mode-activate";
    pub const MODE_DEACTIVATE: &str = "mode-deactivate";
    pub const GOAL_PROGRESS: &str = "goal-progress";
    pub const GOAL_COMPLETE: &str = "goal-complete";
    pub const ACTOR_UPDATE: &str = "actor-update";
    pub const APPLY_DAMAGE: &str = "apply-damage";
    pub const APPLY_INJURY: &str = "apply-injury";
    pub const SHORT_REST: &str = "short-rest";
    pub const LONG_REST: &str = "long-rest";
}

pub(crate) fn registrations() -> Vec<EventTypeRegistration> {
    use event_types::*;

    let builtin = |event_type: &str, label: &str, hook: HookName| {
        EventTypeRegistration::new(BUILTIN_SOURCE, event_type, hook).with_label(label)
    };

    vec![
        // Document lifecycle
        builtin(CREATE, "Item created", HookName::CREATE_ITEM),
        builtin(UPDATE, "Item updated", HookName::UPDATE_ITEM),
        builtin(DELETE, "Item deleted", HookName::DELETE_ITEM),
        builtin(ADD_TO_ACTOR, "Added to actor", HookName::CREATE_ITEM)
            .with_filter(Item::is_embedded),
        builtin(REMOVE_FROM_ACTOR, "Removed from actor", HookName::DELETE_ITEM)
            .with_filter(Item::is_embedded),
        // Equipment
        builtin(EQUIP, "Equipped", HookName::UPDATE_ITEM)
            .with_condition(|_: &Item, payload: &HookPayload| {
                equip_transition(payload) == Some(true)
            }),
        builtin(UNEQUIP, "Unequipped", HookName::UPDATE_ITEM)
            .with_condition(|_: &Item, payload: &HookPayload| {
                equip_transition(payload) == Some(false)
            }),
        // Activation
        builtin(USE, "Used", HookName::USE_ITEM),
        builtin(MODE_ACTIVATE, "Mode activated", HookName::MODE_ACTIVATE),
        builtin(MODE_DEACTIVATE, "Mode deactivated", HookName::MODE_DEACTIVATE),
        // Goals
        builtin(GOAL_PROGRESS, "Goal progressed", HookName::UPDATE_ITEM)
            .with_filter(is_goal)
            .with_condition(|_: &Item, payload: &HookPayload| {
                goal_levels(payload)
                    .map(|(before, after)| after > before && after < GOAL_MAX_LEVEL)
                    .unwrap_or(false)
            }),
        builtin(GOAL_COMPLETE, "Goal completed", HookName::UPDATE_ITEM)
            .with_filter(is_goal)
            .with_condition(|_: &Item, payload: &HookPayload| {
                goal_levels(payload)
                    .map(|(before, after)| before < GOAL_MAX_LEVEL && after >= GOAL_MAX_LEVEL)
                    .unwrap_or(false)
            }),
        // Actor-level hooks, fanned out to every embedded item
        builtin(ACTOR_UPDATE, "Owner updated", HookName::UPDATE_ACTOR)
            .with_transform(actor_as_document),
        builtin(APPLY_DAMAGE, "Owner damaged", HookName::APPLY_DAMAGE)
            .with_transform(actor_as_document),
        builtin(APPLY_INJURY, "Owner injured", HookName::APPLY_INJURY)
            .with_transform(actor_as_document),
        builtin(SHORT_REST, "Short rest", HookName::REST)
            .with_condition(|_: &Item, payload: &HookPayload| {
                rest_kind(payload) == Some(RestKind::Short)
            })
            .with_transform(actor_as_document),
        builtin(LONG_REST, "Long rest", HookName::REST)
            .with_condition(|_: &Item, payload: &HookPayload| {
                rest_kind(payload) == Some(RestKind::Long)
            })
            .with_transform(actor_as_document),
    ]
}

/// New equipped state when an update flipped it.
fn equip_transition(payload: &HookPayload) -> Option<bool> {
    match payload {
        HookPayload::UpdateItem { item, previous, .. }
            if item.is_equipped() != previous.is_equipped() =>
        {
            Some(item.is_equipped())
        }
        _ => None,
    }
}

fn is_goal(item: &Item) -> bool {
    item.item_type == ItemType::Goal
}

fn goal_levels(payload: &HookPayload) -> Option<(i64, i64)> {
    match payload {
        HookPayload::UpdateItem { item, previous, .. } => {
            Some((previous.goal_level(), item.goal_level()))
        }
        _ => None,
    }
}

fn rest_kind(payload: &HookPayload) -> Option<RestKind> {
    match payload {
        HookPayload::Rest { kind, .. } => Some(*kind),
        _ => None,
    }
}

fn actor_as_document(_: &Item, payload: &HookPayload) -> EventPatch {
    match payload {
        HookPayload::UpdateActor { actor, .. }
        | HookPayload::ApplyDamage { actor, .. }
        | HookPayload::ApplyInjury { actor, .. }
        | HookPayload::Rest { actor, .. } => {
            EventPatch::document(EventDocument::Actor(actor.clone()))
        }
        _ => EventPatch::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::registration::EventTransform;
    use chrono::Utc;
    use itemflow_domain::{Actor, ActorType, Changes, OperationContext, UserId};
    use serde_json::json;

    fn op() -> OperationContext {
        OperationContext::new(UserId::new(), Utc::now())
    }

    fn registration(event_type: &str) -> EventTypeRegistration {
        registrations()
            .into_iter()
            .find(|r| r.event_type == event_type)
            .expect("built-in type")
    }

    fn update(previous: Item, item: Item) -> HookPayload {
        HookPayload::UpdateItem {
            item,
            previous,
            changes: Changes::new(),
            op: op(),
        }
    }

    #[tokio::test]
    async fn equip_fires_only_on_transition() {
        let equip = registration(event_types::EQUIP);
        let unequip = registration(event_types::UNEQUIP);
        let stowed =
            Item::new("Shardplate", ItemType::Armor).with_system(json!({"equipped": false}));
        let mut worn = stowed.clone();
        worn.system = json!({"equipped": true});

        let equipping = update(stowed.clone(), worn.clone());
        assert!(equip.applies_to(&worn, &equipping).await);
        assert!(!unequip.applies_to(&worn, &equipping).await);

        let already_worn = update(worn.clone(), worn.clone());
        assert!(!equip.applies_to(&worn, &already_worn).await);

        let removing = update(worn, stowed.clone());
        assert!(unequip.applies_to(&stowed, &removing).await);
    }

    #[tokio::test]
    async fn goal_events_track_level_changes() {
        let progress = registration(event_types::GOAL_PROGRESS);
        let complete = registration(event_types::GOAL_COMPLETE);
        let goal = |level: i64| {
            Item::new("Swear the Third Ideal", ItemType::Goal).with_system(json!({"level": level}))
        };

        let step = update(goal(0), goal(1));
        assert!(progress.applies_to(&goal(1), &step).await);
        assert!(!complete.applies_to(&goal(1), &step).await);

        let finish = update(goal(2), goal(3));
        assert!(!progress.applies_to(&goal(3), &finish).await);
        assert!(complete.applies_to(&goal(3), &finish).await);

        let unchanged = update(goal(3), goal(3));
        assert!(!complete.applies_to(&goal(3), &unchanged).await);

        let not_a_goal = Item::new("Spear", ItemType::Weapon).with_system(json!({"level": 1}));
        let weapon_update = update(not_a_goal.clone(), not_a_goal.clone());
        assert!(!progress.applies_to(&not_a_goal, &weapon_update).await);
    }

    #[tokio::test]
    async fn add_to_actor_requires_a_parent() {
        let add = registration(event_types::ADD_TO_ACTOR);
        let loose = Item::new("Sphere", ItemType::Loot);
        let mut actor = Actor::new("Lift", ActorType::Character);
        actor.add_item(loose.clone());
        let embedded = actor.items[0].clone();

        let created_loose = HookPayload::CreateItem { item: loose.clone(), op: op() };
        let created_embedded = HookPayload::CreateItem { item: embedded.clone(), op: op() };

        assert!(!add.applies_to(&loose, &created_loose).await);
        assert!(add.applies_to(&embedded, &created_embedded).await);
    }

    #[tokio::test]
    async fn rest_events_split_on_kind_and_target_the_actor() {
        let short = registration(event_types::SHORT_REST);
        let long = registration(event_types::LONG_REST);
        let actor = Actor::new("Navani", ActorType::Character)
            .with_item(Item::new("Fabrial", ItemType::Equipment));
        let item = actor.items[0].clone();
        let payload = HookPayload::Rest {
            actor: actor.clone(),
            kind: RestKind::Long,
            op: op(),
        };

        assert!(!short.applies_to(&item, &payload).await);
        assert!(long.applies_to(&item, &payload).await);

        let transform = long.transform.as_ref().expect("transform");
        let patch = transform.transform(&item, &payload).await;
        assert_eq!(patch.document, Some(EventDocument::Actor(actor)));
    }
}
