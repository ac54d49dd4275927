//! Generic partial updates of items and actors.
//!
//! String values of the form `"+N"`/`"-N"` aimed at numeric fields are
//! resolved against the current document first, so `{"system.inspiration":
//! "+1"}` increments.

use async_trait::async_trait;
use serde::Deserialize;

use itemflow_domain::{data, Changes, HandlerConfig, HandlerType};

use super::error::{HandlerConfigValidationError, HandlerExecutionError};
use super::schema::{ConfigSchema, FieldKind, FieldSpec};
use super::support::{document_value, is_noop, load_actor, load_item, require_actor, resolve_item};
use super::{ConfiguredHandler, Handler, HandlerContext, HandlerOutcome};
use crate::events::ItemEvent;

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateItemHandler {
    changes: Changes,
    #[serde(default)]
    target: Option<String>,
}

impl ConfiguredHandler for UpdateItemHandler {
    const TYPE: HandlerType = HandlerType::UpdateItem;
    const LABEL: &'static str = "Update item";
    const SCHEMA: ConfigSchema = ConfigSchema::new(&[
        FieldSpec::required("changes", FieldKind::Object, "Dotted-path partial update"),
        FieldSpec::optional(
            "target",
            FieldKind::String,
            "Item to update (default: the triggering item)",
        ),
    ]);

    fn from_config(config: &HandlerConfig) -> Result<Self, HandlerConfigValidationError> {
        Self::SCHEMA.parse(Self::TYPE, config)
    }
}

#[async_trait]
impl Handler for UpdateItemHandler {
    fn handler_type(&self) -> HandlerType {
        Self::TYPE
    }

    async fn execute(
        &self,
        event: &ItemEvent,
        ctx: &HandlerContext<'_>,
    ) -> Result<HandlerOutcome, HandlerExecutionError> {
        let item = match &self.target {
            None => load_item(ctx, event.item.uuid()).await?,
            Some(reference) => {
                let actor = match event.actor_id() {
                    Some(actor_id) => Some(load_actor(ctx, actor_id).await?),
                    None => None,
                };
                resolve_item(ctx, actor.as_ref(), reference).await?
            }
        };

        let current = document_value(&item)?;
        let changes = data::resolve_relative(&current, &self.changes)?;
        if is_noop(&current, &changes) {
            return Ok(HandlerOutcome::Continue);
        }

        let uuid = item.uuid();
        ctx.ports
            .documents
            .update_item(uuid, &changes, &event.child_op())
            .await?;

        tracing::info!(
            rule_id = %ctx.rule.id,
            item = %uuid,
            fields = changes.len(),
            "Updated item"
        );
        Ok(HandlerOutcome::Continue)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateActorHandler {
    changes: Changes,
}

impl ConfiguredHandler for UpdateActorHandler {
    const TYPE: HandlerType = HandlerType::UpdateActor;
    const LABEL: &'static str = "Update actor";
    const SCHEMA: ConfigSchema = ConfigSchema::new(&[FieldSpec::required(
        "changes",
        FieldKind::Object,
        "Dotted-path partial update",
    )]);

    fn from_config(config: &HandlerConfig) -> Result<Self, HandlerConfigValidationError> {
        Self::SCHEMA.parse(Self::TYPE, config)
    }
}

#[async_trait]
impl Handler for UpdateActorHandler {
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

        let current = document_value(&actor)?;
        let changes = data::resolve_relative(&current, &self.changes)?;
        if is_noop(&current, &changes) {
            return Ok(HandlerOutcome::Continue);
        }

        ctx.ports
            .documents
            .update_actor(actor_id, &changes, &event.child_op())
            .await?;

        tracing::info!(
            rule_id = %ctx.rule.id,
            actor_id = %actor_id,
            fields = changes.len(),
            "Updated actor"
        );
        Ok(HandlerOutcome::Continue)
    }
}
