//! Remove items from the event's actor.

use async_trait::async_trait;
use serde::Deserialize;

use itemflow_domain::{HandlerConfig, HandlerType, ItemId};

use super::error::{HandlerConfigValidationError, HandlerExecutionError};
use super::schema::{ConfigSchema, FieldKind, FieldSpec};
use super::support::{load_actor, require_actor};
use super::{ConfiguredHandler, Handler, HandlerContext, HandlerOutcome};
use crate::events::ItemEvent;

#[derive(Debug, Clone, Deserialize)]
pub struct RemoveItemsHandler {
    items: Vec<String>,
}

impl ConfiguredHandler for RemoveItemsHandler {
    const TYPE: HandlerType = HandlerType::RemoveItems;
    const LABEL: &'static str = "Remove items";
    const SCHEMA: ConfigSchema = ConfigSchema::new(&[FieldSpec::required(
        "items",
        FieldKind::StringList,
        "Template or item uuids to remove from the actor",
    )]);

    fn from_config(config: &HandlerConfig) -> Result<Self, HandlerConfigValidationError> {
        Self::SCHEMA.parse(Self::TYPE, config)
    }
}

#[async_trait]
impl Handler for RemoveItemsHandler {
    fn handler_type(&self) -> HandlerType {
        Self::TYPE
    }

    async fn execute(
        &self,
        event: &ItemEvent,
        ctx: &HandlerContext<'_>,
    ) -> Result<HandlerOutcome, HandlerExecutionError> {
        let actor_id = require_actor(event)?;
        let actor = load_actor(ctx, actor_id).await?;

        let ids: Vec<ItemId> = actor
            .items
            .iter()
            .filter(|item| self.items.iter().any(|r| item.matches_reference(r)))
            .map(|item| item.id)
            .collect();

        // Missing targets are fine
        if ids.is_empty() {
            return Ok(HandlerOutcome::Continue);
        }

        let removed = ctx
            .ports
            .documents
            .delete_embedded_items(actor_id, ids, &event.child_op())
            .await?;

        tracing::info!(
            rule_id = %ctx.rule.id,
            actor_id = %actor_id,
            count = removed.len(),
            "Removed items"
        );
        Ok(HandlerOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{documents, event, rule_for};
    use crate::infrastructure::ports::MockDocumentStore;
    use itemflow_domain::{Actor, ActorType, Item, ItemType};
    use serde_json::json;

    fn handler(items: &[&str]) -> RemoveItemsHandler {
        RemoveItemsHandler::from_config(
            &HandlerConfig::new(HandlerType::RemoveItems).with("items", json!(items)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn removes_items_by_source_or_uuid() {
        let actor = Actor::new("Rock", ActorType::Character)
            .with_item(Item::new("Sphere", ItemType::Loot).with_source("Compendium.items.sphere"))
            .with_item(Item::new("Pot", ItemType::Equipment))
            .with_item(Item::new("Spear", ItemType::Weapon));
        let sphere = actor.items[0].id;
        let pot = actor.items[1].clone();
        let trigger = actor.items[2].clone();
        let pot_uuid = pot.uuid().to_string();

        let mut store = MockDocumentStore::new();
        store
            .expect_get_actor()
            .returning(move |_| Ok(Some(actor.clone())));
        store
            .expect_delete_embedded_items()
            .withf(move |_, ids, _| ids == &vec![sphere, pot.id])
            .times(1)
            .returning(|_, ids, _| Ok(ids));

        let ports = documents(store);
        let rule = rule_for(HandlerConfig::new(HandlerType::RemoveItems));
        let ctx = HandlerContext { ports: &ports, rule: &rule };

        handler(&["Compendium.items.sphere", &pot_uuid])
            .execute(&event("unequip", trigger), &ctx)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_targets_are_a_noop() {
        let actor = Actor::new("Lopen", ActorType::Character)
            .with_item(Item::new("Spear", ItemType::Weapon));
        let trigger = actor.items[0].clone();

        let mut store = MockDocumentStore::new();
        store
            .expect_get_actor()
            .returning(move |_| Ok(Some(actor.clone())));
        store.expect_delete_embedded_items().never();

        let ports = documents(store);
        let rule = rule_for(HandlerConfig::new(HandlerType::RemoveItems));
        let ctx = HandlerContext { ports: &ports, rule: &rule };

        let outcome = handler(&["Compendium.items.arm"])
            .execute(&event("unequip", trigger), &ctx)
            .await
            .unwrap();
        assert_eq!(outcome, HandlerOutcome::Continue);
    }
}
