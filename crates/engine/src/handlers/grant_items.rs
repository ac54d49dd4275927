//! Grant items: copy templates onto the event's actor.

use async_trait::async_trait;
use serde::Deserialize;

use itemflow_domain::{Actor, Grant, HandlerConfig, HandlerType, Item, ItemId};

use super::error::{HandlerConfigValidationError, HandlerExecutionError};
use super::schema::{ConfigSchema, FieldKind, FieldSpec};
use super::support::{load_actor, require_actor};
use super::{ConfiguredHandler, Handler, HandlerContext, HandlerOutcome};
use crate::events::ItemEvent;

/// How to decide that the actor already has a granted item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupPolicy {
    /// Same template uuid
    #[default]
    Source,
    /// Same name and item type
    Name,
    None,
}

impl DedupPolicy {
    fn is_duplicate(self, existing: &Item, reference: &str, template: &Item) -> bool {
        match self {
            Self::Source => existing.matches_reference(reference),
            Self::Name => {
                existing.name == template.name && existing.item_type == template.item_type
            }
            Self::None => false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrantItemsHandler {
    items: Vec<String>,
    #[serde(default)]
    dedup: DedupPolicy,
}

impl ConfiguredHandler for GrantItemsHandler {
    const TYPE: HandlerType = HandlerType::GrantItems;
    const LABEL: &'static str = "Grant items";
    const SCHEMA: ConfigSchema = ConfigSchema::new(&[
        FieldSpec::required("items", FieldKind::StringList, "Uuids of the items to grant"),
        FieldSpec::optional(
            "dedup",
            FieldKind::Enum(&["source", "name", "none"]),
            "Skip items the actor already has (default: source)",
        ),
    ]);

    fn from_config(config: &HandlerConfig) -> Result<Self, HandlerConfigValidationError> {
        Self::SCHEMA.parse(Self::TYPE, config)
    }
}

impl GrantItemsHandler {
    fn already_granted(
        &self,
        actor: &Actor,
        pending: &[Item],
        reference: &str,
        template: &Item,
    ) -> bool {
        actor
            .items
            .iter()
            .chain(pending)
            .any(|existing| self.dedup.is_duplicate(existing, reference, template))
    }
}

#[async_trait]
impl Handler for GrantItemsHandler {
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
        let granted_at = ctx.ports.clock.now();

        let mut pending: Vec<Item> = Vec::new();
        for reference in &self.items {
            let Some(template) = ctx.ports.documents.fetch_template(reference).await? else {
                tracing::warn!(
                    rule_id = %ctx.rule.id,
                    item = %event.item.uuid(),
                    uuid = %reference,
                    "Skipping unresolvable item in grant"
                );
                continue;
            };

            if self.already_granted(&actor, &pending, reference, &template) {
                tracing::debug!(
                    rule_id = %ctx.rule.id,
                    uuid = %reference,
                    actor_id = %actor_id,
                    "Actor already has granted item"
                );
                continue;
            }

            let mut item = template;
            item.id = ItemId::new();
            item.actor_id = Some(actor_id);
            item.source_uuid = Some(reference.clone());
            item.granted_by = Some(Grant {
                item: event.item.uuid(),
                rule: ctx.rule.id,
                granted_at,
            });
            pending.push(item);
        }

        if pending.is_empty() {
            return Ok(HandlerOutcome::Continue);
        }

        let created = ctx
            .ports
            .documents
            .create_embedded_items(actor_id, pending, &event.child_op())
            .await?;

        tracing::info!(
            rule_id = %ctx.rule.id,
            actor_id = %actor_id,
            count = created.len(),
            "Granted items"
        );
        Ok(HandlerOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{documents, event, rule_for};
    use crate::handlers::HandlerContext;
    use crate::infrastructure::ports::MockDocumentStore;
    use itemflow_domain::{ActorType, ItemType};
    use serde_json::json;

    const SPHERE: &str = "Compendium.items.sphere";
    const SPEAR: &str = "Compendium.items.spear";

    fn handler(items: &[&str], dedup: &str) -> GrantItemsHandler {
        GrantItemsHandler::from_config(
            &HandlerConfig::new(HandlerType::GrantItems)
                .with("items", json!(items))
                .with("dedup", dedup),
        )
        .unwrap()
    }

    fn store_for(actor: Actor) -> MockDocumentStore {
        let mut store = MockDocumentStore::new();
        store
            .expect_get_actor()
            .returning(move |_| Ok(Some(actor.clone())));
        store.expect_fetch_template().returning(|uuid| {
            Ok(match uuid {
                SPHERE => Some(Item::new("Sphere", ItemType::Loot)),
                SPEAR => Some(Item::new("Spear", ItemType::Weapon)),
                _ => None,
            })
        });
        store
    }

    #[tokio::test]
    async fn grants_templates_with_provenance() {
        let actor = Actor::new("Kaladin", ActorType::Character)
            .with_item(Item::new("Bridge Four Tattoo", ItemType::Trait));
        let source = actor.items[0].clone();
        let source_uuid = source.uuid();
        let actor_id = actor.id;

        let mut store = store_for(actor);
        store
            .expect_create_embedded_items()
            .withf(move |id, items, op| {
                *id == actor_id
                    && items.len() == 1
                    && items[0].source_uuid.as_deref() == Some(SPHERE)
                    && items[0].actor_id == Some(actor_id)
                    && items[0].granted_by.as_ref().map(|g| g.item) == Some(source_uuid)
                    && op.depth() == 1
            })
            .times(1)
            .returning(|_, items, _| Ok(items));

        let ports = documents(store);
        let handler = handler(&[SPHERE, "Compendium.items.missing"], "source");
        let rule = rule_for(HandlerConfig::new(HandlerType::GrantItems));
        let ctx = HandlerContext { ports: &ports, rule: &rule };
        let event = event("add-to-actor", source);

        let outcome = handler.execute(&event, &ctx).await.unwrap();
        assert_eq!(outcome, HandlerOutcome::Continue);
    }

    #[tokio::test]
    async fn existing_source_is_not_granted_twice() {
        let actor = Actor::new("Moash", ActorType::Character)
            .with_item(Item::new("Sphere", ItemType::Loot).with_source(SPHERE))
            .with_item(Item::new("Cloak", ItemType::Equipment));
        let trigger = actor.items[1].clone();

        let mut store = store_for(actor);
        store
            .expect_create_embedded_items()
            .withf(|_, items, _| items.len() == 1 && items[0].name == "Spear")
            .times(1)
            .returning(|_, items, _| Ok(items));

        let ports = documents(store);
        let rule = rule_for(HandlerConfig::new(HandlerType::GrantItems));
        let ctx = HandlerContext { ports: &ports, rule: &rule };

        handler(&[SPHERE, SPEAR, SPEAR], "source")
            .execute(&event("equip", trigger), &ctx)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn nothing_to_grant_issues_no_create() {
        let actor = Actor::new("Teft", ActorType::Character)
            .with_item(Item::new("Sphere", ItemType::Loot))
            .with_item(Item::new("Cloak", ItemType::Equipment));
        let trigger = actor.items[1].clone();

        let mut store = store_for(actor);
        store.expect_create_embedded_items().never();

        let ports = documents(store);
        let rule = rule_for(HandlerConfig::new(HandlerType::GrantItems));
        let ctx = HandlerContext { ports: &ports, rule: &rule };

        handler(&[SPHERE, "Compendium.items.missing"], "name")
            .execute(&event("equip", trigger), &ctx)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unembedded_item_has_no_actor() {
        let ports = documents(MockDocumentStore::new());
        let rule = rule_for(HandlerConfig::new(HandlerType::GrantItems));
        let ctx = HandlerContext { ports: &ports, rule: &rule };

        let err = handler(&[SPHERE], "source")
            .execute(&event("create", Item::new("Loose", ItemType::Loot)), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerExecutionError::MissingActor { .. }));
    }
}
