//! Skill rank handlers.

use async_trait::async_trait;
use serde::Deserialize;

use itemflow_domain::{ActorSchema, HandlerConfig, HandlerType};

use super::error::{HandlerConfigValidationError, HandlerExecutionError};
use super::schema::{ConfigSchema, FieldKind, FieldSpec};
use super::support::{load_actor, next_value, require_actor, write_actor_number};
use super::{ConfiguredHandler, Handler, HandlerContext, HandlerOutcome};
use crate::events::ItemEvent;

#[derive(Debug, Clone, Deserialize)]
pub struct ModifySkillRankHandler {
    skill: String,
    delta: i64,
}

impl ConfiguredHandler for ModifySkillRankHandler {
    const TYPE: HandlerType = HandlerType::ModifySkillRank;
    const LABEL: &'static str = "Modify skill rank";
    const SCHEMA: ConfigSchema = ConfigSchema::new(&[
        FieldSpec::required("skill", FieldKind::String, "Skill key, e.g. athletics"),
        FieldSpec::required("delta", FieldKind::Integer, "Ranks to add (may be negative)"),
    ]);

    fn from_config(config: &HandlerConfig) -> Result<Self, HandlerConfigValidationError> {
        Self::SCHEMA.parse(Self::TYPE, config)
    }
}

#[async_trait]
impl Handler for ModifySkillRankHandler {
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
        let current = actor.skill_rank(&self.skill);
        let value = next_value(current, ActorSchema::skill_rank_range(&self.skill), |v| {
            v.saturating_add(self.delta)
        });
        write_actor_number(
            ctx,
            event,
            actor_id,
            ActorSchema::skill_rank_path(&self.skill),
            current,
            value,
        )
        .await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetSkillRankHandler {
    skill: String,
    value: i64,
}

impl ConfiguredHandler for SetSkillRankHandler {
    const TYPE: HandlerType = HandlerType::SetSkillRank;
    const LABEL: &'static str = "Set skill rank";
    const SCHEMA: ConfigSchema = ConfigSchema::new(&[
        FieldSpec::required("skill", FieldKind::String, "Skill key, e.g. athletics"),
        FieldSpec::required("value", FieldKind::Integer, "New rank"),
    ]);

    fn from_config(config: &HandlerConfig) -> Result<Self, HandlerConfigValidationError> {
        Self::SCHEMA.parse(Self::TYPE, config)
    }
}

#[async_trait]
impl Handler for SetSkillRankHandler {
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
        let current = actor.skill_rank(&self.skill);
        let value = next_value(current, ActorSchema::skill_rank_range(&self.skill), |_| {
            self.value
        });
        write_actor_number(
            ctx,
            event,
            actor_id,
            ActorSchema::skill_rank_path(&self.skill),
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

    #[tokio::test]
    async fn modify_skill_rank_clamps_at_five() {
        let actor = Actor::new("Lift", ActorType::Character)
            .with_system(json!({"skills": {"agility": {"rank": 4}}}))
            .with_item(Item::new("Awesomeness", ItemType::Talent));
        let trigger = actor.items[0].clone();
        let returned = actor.clone();

        let mut store = MockDocumentStore::new();
        store
            .expect_get_actor()
            .returning(move |_| Ok(Some(actor.clone())));
        store
            .expect_update_actor()
            .withf(|_, changes, _| changes.get("system.skills.agility.rank") == Some(&json!(5)))
            .times(1)
            .returning(move |_, _, _| Ok(returned.clone()));

        let ports = documents(store);
        let rule = rule_for(HandlerConfig::new(HandlerType::ModifySkillRank));
        let ctx = HandlerContext { ports: &ports, rule: &rule };
        let handler = ModifySkillRankHandler::from_config(
            &HandlerConfig::new(HandlerType::ModifySkillRank)
                .with("skill", "agility")
                .with("delta", 3),
        )
        .unwrap();

        handler.execute(&event("use", trigger), &ctx).await.unwrap();
    }

    #[tokio::test]
    async fn set_skill_rank_writes_missing_skill() {
        let actor = Actor::new("Wyndle", ActorType::Character)
            .with_item(Item::new("Vine", ItemType::Trait));
        let trigger = actor.items[0].clone();
        let returned = actor.clone();

        let mut store = MockDocumentStore::new();
        store
            .expect_get_actor()
            .returning(move |_| Ok(Some(actor.clone())));
        store
            .expect_update_actor()
            .withf(|_, changes, _| changes.get("system.skills.lore.rank") == Some(&json!(2)))
            .times(1)
            .returning(move |_, _, _| Ok(returned.clone()));

        let ports = documents(store);
        let rule = rule_for(HandlerConfig::new(HandlerType::SetSkillRank));
        let ctx = HandlerContext { ports: &ports, rule: &rule };
        let handler = SetSkillRankHandler::from_config(
            &HandlerConfig::new(HandlerType::SetSkillRank)
                .with("skill", "lore")
                .with("value", 2),
        )
        .unwrap();

        handler.execute(&event("create", trigger), &ctx).await.unwrap();
    }

    #[tokio::test]
    async fn modify_skill_rank_saturates_an_extreme_negative_delta() {
        let actor = Actor::new("Lift", ActorType::Character)
            .with_system(json!({"skills": {"agility": {"rank": 2}}}))
            .with_item(Item::new("Awesomeness", ItemType::Talent));
        let trigger = actor.items[0].clone();
        let returned = actor.clone();

        let mut store = MockDocumentStore::new();
        store
            .expect_get_actor()
            .returning(move |_| Ok(Some(actor.clone())));
        store
            .expect_update_actor()
            .withf(|_, changes, _| changes.get("system.skills.agility.rank") == Some(&json!(0)))
            .times(1)
            .returning(move |_, _, _| Ok(returned.clone()));

        let ports = documents(store);
        let rule = rule_for(HandlerConfig::new(HandlerType::ModifySkillRank));
        let ctx = HandlerContext { ports: &ports, rule: &rule };
        let handler = ModifySkillRankHandler::from_config(
            &HandlerConfig::new(HandlerType::ModifySkillRank)
                .with("skill", "agility")
                .with("delta", i64::MIN),
        )
        .unwrap();

        handler.execute(&event("use", trigger), &ctx).await.unwrap();
    }
}
