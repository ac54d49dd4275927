//! Helpers shared by the handlers.

use serde::Serialize;
use serde_json::Value;

use itemflow_domain::{data, Actor, ActorId, Changes, DocumentRef, Item, ValueRange};

use super::error::HandlerExecutionError;
use super::{HandlerContext, HandlerOutcome};
use crate::events::ItemEvent;
use crate::infrastructure::ports::RepoError;

/// The actor an actor-targeting handler acts on.
pub(super) fn require_actor(event: &ItemEvent) -> Result<ActorId, HandlerExecutionError> {
    event
        .actor_id()
        .ok_or_else(|| HandlerExecutionError::missing_actor(&event.event_type, event.item.uuid()))
}

/// Current state of an actor. Always read fresh so earlier rules' writes are visible.
pub(super) async fn load_actor(
    ctx: &HandlerContext<'_>,
    id: ActorId,
) -> Result<Actor, HandlerExecutionError> {
    ctx.ports
        .documents
        .get_actor(id)
        .await?
        .ok_or_else(|| RepoError::not_found("Actor", id).into())
}

pub(super) async fn load_item(
    ctx: &HandlerContext<'_>,
    uuid: DocumentRef,
) -> Result<Item, HandlerExecutionError> {
    ctx.ports
        .documents
        .get_item(uuid)
        .await?
        .ok_or_else(|| HandlerExecutionError::TargetNotFound(uuid.to_string()))
}

/// Resolve a reference to one of the actor's items, or any item by uuid.
pub(super) async fn resolve_item(
    ctx: &HandlerContext<'_>,
    actor: Option<&Actor>,
    reference: &str,
) -> Result<Item, HandlerExecutionError> {
    if let Some(item) = actor.and_then(|actor| actor.find_by_reference(reference).next()) {
        return Ok(item.clone());
    }
    match reference.parse::<DocumentRef>() {
        Ok(uuid @ DocumentRef::Item { .. }) => load_item(ctx, uuid).await,
        _ => Err(HandlerExecutionError::TargetNotFound(reference.to_string())),
    }
}

/// Serialize a document so relative updates can be resolved against it.
pub(super) fn document_value<T: Serialize>(document: &T) -> Result<Value, HandlerExecutionError> {
    serde_json::to_value(document).map_err(|e| RepoError::serialization(e).into())
}

/// The new value for a numeric field, clamped to its documented range.
pub(super) fn next_value(
    current: Option<i64>,
    range: Option<ValueRange>,
    compute: impl FnOnce(i64) -> i64,
) -> i64 {
    let value = compute(current.unwrap_or(0));
    match range {
        Some(range) => range.clamp(value),
        None => value,
    }
}

/// Write a numeric actor field, skipping the update when nothing changes.
pub(super) async fn write_actor_number(
    ctx: &HandlerContext<'_>,
    event: &ItemEvent,
    actor_id: ActorId,
    path: String,
    current: Option<i64>,
    value: i64,
) -> Result<HandlerOutcome, HandlerExecutionError> {
    if current == Some(value) {
        tracing::debug!(rule_id = %ctx.rule.id, path = %path, value, "Value already set");
        return Ok(HandlerOutcome::Continue);
    }

    let changes = single_change(path.clone(), value);
    ctx.ports
        .documents
        .update_actor(actor_id, &changes, &event.child_op())
        .await?;

    tracing::info!(
        rule_id = %ctx.rule.id,
        actor_id = %actor_id,
        path = %path,
        from = ?current,
        to = value,
        "Updated actor value"
    );
    Ok(HandlerOutcome::Continue)
}

pub(super) fn single_change(path: impl Into<String>, value: impl Into<Value>) -> Changes {
    let mut changes = Changes::new();
    changes.insert(path.into(), value.into());
    changes
}

/// Whether applying `changes` to `current` would leave it as it is.
pub(super) fn is_noop(current: &Value, changes: &Changes) -> bool {
    changes
        .iter()
        .all(|(path, value)| data::get_path(current, path) == Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn next_value_clamps_only_ranged_fields() {
        let range = Some(ValueRange::new(0, 5));
        assert_eq!(next_value(Some(4), range, |v| v + 3), 5);
        assert_eq!(next_value(None, range, |v| v - 1), 0);
        assert_eq!(next_value(Some(4), None, |v| v + 3), 7);
    }

    #[test]
    fn noop_detection_compares_paths() {
        let doc = json!({"system": {"equipped": true}});
        assert!(is_noop(&doc, &single_change("system.equipped", true)));
        assert!(!is_noop(&doc, &single_change("system.equipped", false)));
        assert!(!is_noop(&doc, &single_change("system.level", 1)));
    }
}
