//! Expertise handlers.
//!
//! Expertises live on the event's actor, or on the item itself when the item
//! is not embedded in one.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use itemflow_domain::{
    data, merge_expertises, remove_expertises, Expertise, HandlerConfig, HandlerType,
    EXPERTISES_PATH,
};

use super::error::{HandlerConfigValidationError, HandlerExecutionError};
use super::schema::{ConfigSchema, FieldKind, FieldSpec};
use super::support::{load_actor, load_item, single_change};
use super::{ConfiguredHandler, Handler, HandlerContext, HandlerOutcome};
use crate::events::ItemEvent;
use crate::infrastructure::ports::RepoError;

const SCHEMA: ConfigSchema = ConfigSchema::new(&[FieldSpec::required(
    "expertises",
    FieldKind::ObjectList,
    "Expertises as {type, id, label?}",
)]);

#[derive(Debug, Clone, Copy)]
enum Edit {
    Grant,
    Remove,
}

impl Edit {
    fn apply(self, existing: &[Expertise], edits: &[Expertise]) -> Option<Vec<Expertise>> {
        match self {
            Self::Grant => merge_expertises(existing, edits),
            Self::Remove => remove_expertises(existing, edits),
        }
    }
}

async fn edit_expertises(
    edit: Edit,
    edits: &[Expertise],
    event: &ItemEvent,
    ctx: &HandlerContext<'_>,
) -> Result<HandlerOutcome, HandlerExecutionError> {
    let op = event.child_op();

    match event.actor_id() {
        Some(actor_id) => {
            let actor = load_actor(ctx, actor_id).await?;
            let Some(updated) = edit.apply(&actor.expertises(), edits) else {
                return Ok(HandlerOutcome::Continue);
            };
            let changes = single_change(EXPERTISES_PATH, to_value(&updated)?);
            ctx.ports
                .documents
                .update_actor(actor_id, &changes, &op)
                .await?;
            tracing::info!(
                rule_id = %ctx.rule.id,
                actor_id = %actor_id,
                count = updated.len(),
                "Updated actor expertises"
            );
        }
        None => {
            let uuid = event.item.uuid();
            let item = load_item(ctx, uuid).await?;
            let existing: Vec<Expertise> = data::get_path(&item.system, "expertises")
                .and_then(|value| serde_json::from_value(value.clone()).ok())
                .unwrap_or_default();
            let Some(updated) = edit.apply(&existing, edits) else {
                return Ok(HandlerOutcome::Continue);
            };
            let changes = single_change(EXPERTISES_PATH, to_value(&updated)?);
            ctx.ports.documents.update_item(uuid, &changes, &op).await?;
            tracing::info!(
                rule_id = %ctx.rule.id,
                item = %uuid,
                count = updated.len(),
                "Updated item expertises"
            );
        }
    }

    Ok(HandlerOutcome::Continue)
}

fn to_value(expertises: &[Expertise]) -> Result<Value, HandlerExecutionError> {
    serde_json::to_value(expertises).map_err(|e| RepoError::serialization(e).into())
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrantExpertisesHandler {
    expertises: Vec<Expertise>,
}

impl ConfiguredHandler for GrantExpertisesHandler {
    const TYPE: HandlerType = HandlerType::GrantExpertises;
    const LABEL: &'static str = "Grant expertises";
    const SCHEMA: ConfigSchema = SCHEMA;

    fn from_config(config: &HandlerConfig) -> Result<Self, HandlerConfigValidationError> {
        Self::SCHEMA.parse(Self::TYPE, config)
    }
}

#[async_trait]
impl Handler for GrantExpertisesHandler {
    fn handler_type(&self) -> HandlerType {
        Self::TYPE
    }

    async fn execute(
        &self,
        event: &ItemEvent,
        ctx: &HandlerContext<'_>,
    ) -> Result<HandlerOutcome, HandlerExecutionError> {
        edit_expertises(Edit::Grant, &self.expertises, event, ctx).await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoveExpertisesHandler {
    expertises: Vec<Expertise>,
}

impl ConfiguredHandler for RemoveExpertisesHandler {
    const TYPE: HandlerType = HandlerType::RemoveExpertises;
    const LABEL: &'static str = "Remove expertises";
    const SCHEMA: ConfigSchema = SCHEMA;

    fn from_config(config: &HandlerConfig) -> Result<Self, HandlerConfigValidationError> {
        Self::SCHEMA.parse(Self::TYPE, config)
    }
}

#[async_trait]
impl Handler for RemoveExpertisesHandler {
    fn handler_type(&self) -> HandlerType {
        Self::TYPE
    }

    async fn execute(
        &self,
        event: &ItemEvent,
        ctx: &HandlerContext<'_>,
    ) -> Result<HandlerOutcome, HandlerExecutionError> {
        edit_expertises(Edit::Remove, &self.expertises, event, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{documents, event, rule_for};
    use crate::infrastructure::ports::MockDocumentStore;
    use itemflow_domain::{Actor, ActorType, Item, ItemType};
    use serde_json::json;

    fn config(handler_type: HandlerType) -> HandlerConfig {
        HandlerConfig::new(handler_type).with(
            "expertises",
            json!([{"type": "cultural", "id": "alethi"}, {"type": "weapon", "id": "spear"}]),
        )
    }

    fn actor_with(expertises: Value) -> Actor {
        Actor::new("Dalinar", ActorType::Character)
            .with_system(json!({"expertises": expertises}))
            .with_item(Item::new("Ancestry", ItemType::Ancestry))
    }

    #[tokio::test]
    async fn grant_merges_without_duplicates() {
        let actor = actor_with(json!([{"type": "cultural", "id": "alethi"}]));
        let trigger = actor.items[0].clone();
        let returned = actor.clone();

        let mut store = MockDocumentStore::new();
        store
            .expect_get_actor()
            .returning(move |_| Ok(Some(actor.clone())));
        store
            .expect_update_actor()
            .withf(|_, changes, _| {
                changes.get(EXPERTISES_PATH).and_then(Value::as_array).map(Vec::len) == Some(2)
            })
            .times(1)
            .returning(move |_, _, _| Ok(returned.clone()));

        let ports = documents(store);
        let rule = rule_for(config(HandlerType::GrantExpertises));
        let ctx = HandlerContext { ports: &ports, rule: &rule };
        GrantExpertisesHandler::from_config(&config(HandlerType::GrantExpertises))
            .unwrap()
            .execute(&event("add-to-actor", trigger), &ctx)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn remove_of_absent_expertises_issues_no_update() {
        let actor = actor_with(json!([{"type": "cultural", "id": "veden"}]));
        let trigger = actor.items[0].clone();

        let mut store = MockDocumentStore::new();
        store
            .expect_get_actor()
            .returning(move |_| Ok(Some(actor.clone())));
        store.expect_update_actor().never();

        let ports = documents(store);
        let rule = rule_for(config(HandlerType::RemoveExpertises));
        let ctx = HandlerContext { ports: &ports, rule: &rule };
        RemoveExpertisesHandler::from_config(&config(HandlerType::RemoveExpertises))
            .unwrap()
            .execute(&event("remove-from-actor", trigger), &ctx)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unembedded_item_edits_itself() {
        let item = Item::new("Path of the Windrunner", ItemType::Path);
        let uuid = item.uuid();
        let stored = item.clone();
        let returned = item.clone();

        let mut store = MockDocumentStore::new();
        store
            .expect_get_item()
            .returning(move |_| Ok(Some(stored.clone())));
        store
            .expect_update_item()
            .withf(move |target, changes, _| {
                *target == uuid && changes.contains_key(EXPERTISES_PATH)
            })
            .times(1)
            .returning(move |_, _, _| Ok(returned.clone()));

        let ports = documents(store);
        let rule = rule_for(config(HandlerType::GrantExpertises));
        let ctx = HandlerContext { ports: &ports, rule: &rule };
        GrantExpertisesHandler::from_config(&config(HandlerType::GrantExpertises))
            .unwrap()
            .execute(&event("create", item), &ctx)
            .await
            .unwrap();
    }

    #[test]
    fn malformed_entries_fail_validation() {
        let err = GrantExpertisesHandler::from_config(
            &HandlerConfig::new(HandlerType::GrantExpertises).with("expertises", json!(["alethi"])),
        )
        .unwrap_err();
        assert_eq!(err.field, "expertises");
    }
}
