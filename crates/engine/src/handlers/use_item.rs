//! Use another item (or the triggering one) through the host's use pathway.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use itemflow_domain::{HandlerConfig, HandlerType};

use super::error::{HandlerConfigValidationError, HandlerExecutionError};
use super::schema::{ConfigSchema, FieldKind, FieldSpec};
use super::support::{load_actor, load_item, resolve_item};
use super::{ConfiguredHandler, Handler, HandlerContext, HandlerOutcome};
use crate::events::ItemEvent;

const SELF_REFERENCE: &str = "self";

#[derive(Debug, Clone, Deserialize)]
pub struct UseItemHandler {
    #[serde(default)]
    item: Option<String>,
    #[serde(default)]
    options: Value,
}

impl ConfiguredHandler for UseItemHandler {
    const TYPE: HandlerType = HandlerType::UseItem;
    const LABEL: &'static str = "Use item";
    const SCHEMA: ConfigSchema = ConfigSchema::new(&[
        FieldSpec::optional(
            "item",
            FieldKind::String,
            "Uuid of the item to use, or \"self\" (default)",
        ),
        FieldSpec::optional("options", FieldKind::Object, "Options passed to the use call"),
    ]);

    fn from_config(config: &HandlerConfig) -> Result<Self, HandlerConfigValidationError> {
        Self::SCHEMA.parse(Self::TYPE, config)
    }
}

#[async_trait]
impl Handler for UseItemHandler {
    fn handler_type(&self) -> HandlerType {
        Self::TYPE
    }

    async fn execute(
        &self,
        event: &ItemEvent,
        ctx: &HandlerContext<'_>,
    ) -> Result<HandlerOutcome, HandlerExecutionError> {
        let target = match self.item.as_deref() {
            None | Some(SELF_REFERENCE) => load_item(ctx, event.item.uuid()).await?,
            Some(reference) => {
                let actor = match event.actor_id() {
                    Some(actor_id) => Some(load_actor(ctx, actor_id).await?),
                    None => None,
                };
                resolve_item(ctx, actor.as_ref(), reference).await?
            }
        };

        let options = if self.options.is_null() {
            json!({})
        } else {
            self.options.clone()
        };

        tracing::info!(
            rule_id = %ctx.rule.id,
            item = %event.item.uuid(),
            target = %target.uuid(),
            "Using item"
        );

        // The nested use fires the use hook with this chain, so the
        // dispatcher can see this (item, event) pair is already in flight.
        ctx.ports
            .item_use
            .use_item(&target, &options, &event.child_op())
            .await?;

        Ok(HandlerOutcome::Continue)
    }
}
