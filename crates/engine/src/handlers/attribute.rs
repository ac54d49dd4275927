//! Attribute handlers.

use async_trait::async_trait;
use serde::Deserialize;

use itemflow_domain::{ActorSchema, HandlerConfig, HandlerType};

use super::error::{HandlerConfigValidationError, HandlerExecutionError};
use super::schema::{ConfigSchema, FieldKind, FieldSpec};
use super::support::{load_actor, next_value, require_actor, write_actor_number};
use super::{ConfiguredHandler, Handler, HandlerContext, HandlerOutcome};
use crate::events::ItemEvent;

/// Add `delta` to an actor attribute.
#[derive(Debug, Clone, Deserialize)]
pub struct ModifyAttributeHandler {
    attribute: String,
    delta: i64,
}

impl ConfiguredHandler for ModifyAttributeHandler {
    const TYPE: HandlerType = HandlerType::ModifyAttribute;
    const LABEL: &'static str = "Modify attribute";
    const SCHEMA: ConfigSchema = ConfigSchema::new(&[
        FieldSpec::required("attribute", FieldKind::String, "Attribute key, e.g. speed"),
        FieldSpec::required("delta", FieldKind::Integer, "Amount to add (may be negative)"),
    ]);

    fn from_config(config: &HandlerConfig) -> Result<Self, HandlerConfigValidationError> {
        Self::SCHEMA.parse(Self::TYPE, config)
    }
}

#[async_trait]
impl Handler for ModifyAttributeHandler {
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
        let current = actor.attribute(&self.attribute);
        let value = next_value(
            current,
            ActorSchema::attribute_range(&self.attribute),
            |v| v.saturating_add(self.delta),
        );
        write_actor_number(
            ctx,
            event,
            actor_id,
            ActorSchema::attribute_path(&self.attribute),
            current,
            value,
        )
        .await
    }
}

/// Overwrite an actor attribute.
#[derive(Debug, Clone, Deserialize)]
pub struct SetAttributeHandler {
    attribute: String,
    value: i64,
}

impl ConfiguredHandler for SetAttributeHandler {
    const TYPE: HandlerType = HandlerType::SetAttribute;
    const LABEL: &'static str = "Set attribute";
    const SCHEMA: ConfigSchema = ConfigSchema::new(&[
        FieldSpec::required("attribute", FieldKind::String, "Attribute key, e.g. speed"),
        FieldSpec::required("value", FieldKind::Integer, "New value"),
    ]);

    fn from_config(config: &HandlerConfig) -> Result<Self, HandlerConfigValidationError> {
        Self::SCHEMA.parse(Self::TYPE, config)
    }
}

#[async_trait]
impl Handler for SetAttributeHandler {
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
        let current = actor.attribute(&self.attribute);
        let value = next_value(
            current,
            ActorSchema::attribute_range(&self.attribute),
            |_| self.value,
        );
        write_actor_number(
            ctx,
            event,
            actor_id,
            ActorSchema::attribute_path(&self.attribute),
            current,
            value,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{documents, event, rule_for};
    use crate::infrastructure::ports::MockDocumentStore;
    use itemflow_domain::{Actor, ActorType, Item, ItemType};
    use serde_json::json;

    fn actor_with_speed(speed: i64) -> Actor {
        Actor::new("Kaladin", ActorType::Character)
            .with_system(json!({"attributes": {"speed": {"value": speed}}}))
            .with_item(Item::new("Shardplate", ItemType::Armor))
    }

    fn store_expecting(
        actor: Actor,
        path: &'static str,
        expected: Option<i64>,
    ) -> MockDocumentStore {
        let mut store = MockDocumentStore::new();
        let returned = actor.clone();
        store
            .expect_get_actor()
            .returning(move |_| Ok(Some(actor.clone())));
        match expected {
            Some(value) => {
                store
                    .expect_update_actor()
                    .withf(move |_, changes, _| changes.get(path) == Some(&json!(value)))
                    .times(1)
                    .returning(move |_, _, _| Ok(returned.clone()));
            }
            None => {
                store.expect_update_actor().never();
            }
        }
        store
    }

    async fn run(handler: &dyn Handler, actor: &Actor, store: MockDocumentStore) {
        let ports = documents(store);
        let rule = rule_for(HandlerConfig::new(handler.handler_type()));
        let ctx = HandlerContext { ports: &ports, rule: &rule };
        handler
            .execute(&event("equip", actor.items[0].clone()), &ctx)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn modify_adds_delta() {
        let actor = actor_with_speed(3);
        let handler = ModifyAttributeHandler::from_config(
            &HandlerConfig::new(HandlerType::ModifyAttribute)
                .with("attribute", "speed")
                .with("delta", -1),
        )
        .unwrap();
        let store = store_expecting(actor.clone(), "system.attributes.speed.value", Some(2));
        run(&handler, &actor, store).await;
    }

    #[tokio::test]
    async fn modify_clamps_to_documented_range() {
        let actor = actor_with_speed(0);
        let handler = ModifyAttributeHandler::from_config(
            &HandlerConfig::new(HandlerType::ModifyAttribute)
                .with("attribute", "speed")
                .with("delta", -2),
        )
        .unwrap();
        // Already at the floor: nothing to write
        let store = store_expecting(actor.clone(), "system.attributes.speed.value", None);
        run(&handler, &actor, store).await;
    }

    #[tokio::test]
    async fn set_overwrites_and_clamps() {
        let actor = actor_with_speed(3);
        let handler = SetAttributeHandler::from_config(
            &HandlerConfig::new(HandlerType::SetAttribute)
                .with("attribute", "speed")
                .with("value", 14),
        )
        .unwrap();
        let store = store_expecting(actor.clone(), "system.attributes.speed.value", Some(10));
        run(&handler, &actor, store).await;
    }

    #[tokio::test]
    async fn unknown_attribute_is_not_clamped() {
        let actor = actor_with_speed(3);
        let handler = ModifyAttributeHandler::from_config(
            &HandlerConfig::new(HandlerType::ModifyAttribute)
                .with("attribute", "investiture")
                .with("delta", 12),
        )
        .unwrap();
        let store =
            store_expecting(actor.clone(), "system.attributes.investiture.value", Some(12));
        run(&handler, &actor, store).await;
    }

    #[tokio::test]
    async fn extreme_deltas_saturate_to_the_range_limits() {
        let actor = actor_with_speed(3);
        let raise = ModifyAttributeHandler::from_config(
            &HandlerConfig::new(HandlerType::ModifyAttribute)
                .with("attribute", "speed")
                .with("delta", i64::MAX),
        )
        .unwrap();
        let store = store_expecting(actor.clone(), "system.attributes.speed.value", Some(10));
        run(&raise, &actor, store).await;

        let lower = ModifyAttributeHandler::from_config(
            &HandlerConfig::new(HandlerType::ModifyAttribute)
                .with("attribute", "speed")
                .with("delta", i64::MIN),
        )
        .unwrap();
        let store = store_expecting(actor.clone(), "system.attributes.speed.value", Some(0));
        run(&lower, &actor, store).await;
    }
}
