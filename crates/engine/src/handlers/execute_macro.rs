//! Run a user macro.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use itemflow_domain::{HandlerConfig, HandlerType};

use super::error::{HandlerConfigValidationError, HandlerExecutionError};
use super::schema::{ConfigSchema, FieldKind, FieldSpec};
use super::{ConfiguredHandler, Handler, HandlerContext, HandlerOutcome};
use crate::events::ItemEvent;
use crate::infrastructure::ports::MacroContext;

#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteMacroHandler {
    #[serde(rename = "macro")]
    macro_ref: String,
    #[serde(default)]
    args: Value,
}

impl ConfiguredHandler for ExecuteMacroHandler {
    const TYPE: HandlerType = HandlerType::ExecuteMacro;
    const LABEL: &'static str = "Execute macro";
    const SCHEMA: ConfigSchema = ConfigSchema::new(&[
        FieldSpec::required("macro", FieldKind::String, "Macro uuid or name"),
        FieldSpec::optional("args", FieldKind::Any, "Arguments passed to the macro"),
    ]);

    fn from_config(config: &HandlerConfig) -> Result<Self, HandlerConfigValidationError> {
        Self::SCHEMA.parse(Self::TYPE, config)
    }
}

#[async_trait]
impl Handler for ExecuteMacroHandler {
    fn handler_type(&self) -> HandlerType {
        Self::TYPE
    }

    async fn execute(
        &self,
        event: &ItemEvent,
        ctx: &HandlerContext<'_>,
    ) -> Result<HandlerOutcome, HandlerExecutionError> {
        let macro_ctx = MacroContext {
            event_type: event.event_type.clone(),
            item: event.item.uuid(),
            actor: event.actor_id(),
            rule: ctx.rule.id,
            args: self.args.clone(),
            op: event.child_op(),
        };

        let result = ctx.ports.macros.execute(&self.macro_ref, &macro_ctx).await?;

        tracing::debug!(
            rule_id = %ctx.rule.id,
            macro_ref = %self.macro_ref,
            result = ?result,
            "Macro executed"
        );

        // Only an explicit `false` suppresses
        Ok(match result {
            Some(false) => HandlerOutcome::Suppress,
            _ => HandlerOutcome::Continue,
        })
    }
}
