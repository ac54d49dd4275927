//! The dispatcher: turns hook firings into handler executions.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use itemflow_domain::{Actor, Item, OwnershipLevel, Rule, UserId};

use super::election::ElectionContext;
use super::report::{DispatchReport, RuleError, RuleExecution, RuleFailure};
use crate::events::{
    EventTypeRegistration, EventTypeRegistry, HookName, HookPayload, HookSubject, ItemEvent,
};
use crate::handlers::{HandlerContext, HandlerOutcome, HandlerPorts, HandlerRegistry};
use crate::infrastructure::config::DispatchSettings;
use crate::infrastructure::ports::{HookHost, HookListener, Notifier, SessionPort};

pub struct Dispatcher {
    registry: Arc<EventTypeRegistry>,
    handlers: Arc<HandlerRegistry>,
    ports: HandlerPorts,
    session: Arc<dyn SessionPort>,
    notifier: Arc<dyn Notifier>,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<EventTypeRegistry>,
        handlers: Arc<HandlerRegistry>,
        ports: HandlerPorts,
        session: Arc<dyn SessionPort>,
        notifier: Arc<dyn Notifier>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            registry,
            handlers,
            ports,
            session,
            notifier,
            settings,
        }
    }

    pub fn registry(&self) -> &EventTypeRegistry {
        &self.registry
    }

    /// Listen once on every hook some event type is registered for.
    pub fn bind(self: &Arc<Self>, host: &dyn HookHost) {
        for hook in self.registry.hooks() {
            tracing::debug!(hook = %hook, "Binding dispatcher to hook");
            host.listen(hook, self.clone() as Arc<dyn HookListener>);
        }
    }

    /// Handle one hook firing. Never fails: rule errors are logged, notified
    /// and recorded in the report.
    pub async fn handle(&self, hook: &HookName, payload: &HookPayload) -> DispatchReport {
        let mut report = DispatchReport::default();

        let registrations = self.registry.event_types_for_hook(hook);
        if registrations.is_empty() {
            return report;
        }

        let (bearers, actor): (Vec<&Item>, Option<&Actor>) = match payload.subject() {
            HookSubject::Item(item) => (vec![item], None),
            HookSubject::Actor(actor) => (actor.items.iter().collect(), Some(actor)),
        };

        for registration in registrations {
            for item in &bearers {
                self.dispatch_event(registration, item, actor, payload, &mut report)
                    .await;
            }
        }

        if !report.is_empty() {
            tracing::debug!(
                hook = %hook,
                events = report.events,
                executed = report.executed.len(),
                failures = report.failures.len(),
                not_elected = report.not_elected,
                "Dispatched hook"
            );
        }
        report
    }

    async fn dispatch_event(
        &self,
        registration: &EventTypeRegistration,
        item: &Item,
        actor: Option<&Actor>,
        payload: &HookPayload,
        report: &mut DispatchReport,
    ) {
        if !registration.applies_to(item, payload).await {
            return;
        }

        let mut event = ItemEvent::new(
            registration.event_type.clone(),
            item.clone(),
            payload.op().clone(),
            payload.options(),
        );
        if let Some(transform) = &registration.transform {
            event = event.apply(transform.transform(item, payload).await);
        }

        let uuid = item.uuid();
        if event.op.has_visited(&uuid, &event.event_type) {
            tracing::debug!(
                item = %uuid,
                event_type = %event.event_type,
                "Event already in flight for item, skipping"
            );
            report.cycles_broken += 1;
            return;
        }
        if event.op.depth() >= self.settings.max_chain_depth {
            tracing::warn!(
                item = %uuid,
                event_type = %event.event_type,
                depth = event.op.depth(),
                max_depth = self.settings.max_chain_depth,
                "Chain depth limit reached, skipping event"
            );
            report.cycles_broken += 1;
            return;
        }

        let rules: Vec<&Rule> = item.rules_for(&event.event_type).collect();
        if rules.is_empty() {
            return;
        }
        report.events += 1;

        if !self.is_elected(registration, item, actor, &event).await {
            tracing::trace!(
                item = %uuid,
                event_type = %event.event_type,
                "Another client runs this event"
            );
            report.not_elected += 1;
            return;
        }

        for rule in rules {
            let handler = match self.handlers.build(&rule.handler) {
                Ok(handler) => handler,
                Err(e) => {
                    self.record_failure(report, rule, &event, RuleError::Build(e));
                    continue;
                }
            };

            let ctx = HandlerContext {
                ports: &self.ports,
                rule,
            };
            match handler.execute(&event, &ctx).await {
                Ok(outcome) => {
                    report.executed.push(RuleExecution {
                        rule: rule.id,
                        item: uuid,
                        event_type: event.event_type.clone(),
                        handler_type: handler.handler_type(),
                        outcome,
                    });
                    if outcome == HandlerOutcome::Suppress {
                        tracing::debug!(
                            rule_id = %rule.id,
                            item = %uuid,
                            event_type = %event.event_type,
                            "Remaining rules suppressed"
                        );
                        report.suppressed += 1;
                        break;
                    }
                }
                Err(e) => self.record_failure(report, rule, &event, RuleError::Execution(e)),
            }
        }
    }

    async fn is_elected(
        &self,
        registration: &EventTypeRegistration,
        item: &Item,
        actor: Option<&Actor>,
        event: &ItemEvent,
    ) -> bool {
        let local = self.session.local_user();
        let users = self.session.users();
        let owners = self.effective_ownership(item, actor).await;

        registration.host.should_execute(&ElectionContext {
            local: &local,
            users: &users,
            owners: &owners,
            source_user: event.op.user,
        })
    }

    /// Item ownership, inherited from the parent actor when the item has none.
    async fn effective_ownership(
        &self,
        item: &Item,
        actor: Option<&Actor>,
    ) -> BTreeMap<UserId, OwnershipLevel> {
        if !item.ownership.is_empty() {
            return item.ownership.clone();
        }
        if let Some(actor) = actor {
            return actor.ownership.clone();
        }
        let Some(actor_id) = item.actor_id else {
            return BTreeMap::new();
        };
        match self.ports.documents.get_actor(actor_id).await {
            Ok(Some(actor)) => actor.ownership,
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(actor_id = %actor_id, error = %e, "Failed to load owning actor");
                BTreeMap::new()
            }
        }
    }

    fn record_failure(
        &self,
        report: &mut DispatchReport,
        rule: &Rule,
        event: &ItemEvent,
        error: RuleError,
    ) {
        let item = event.item.uuid();
        let handler_type = rule.handler.handler_type.clone();

        match &error {
            RuleError::Build(e) => tracing::warn!(
                rule_id = %rule.id,
                item = %item,
                event_type = %event.event_type,
                handler_type = %handler_type,
                error = %e,
                "Rule handler could not be built"
            ),
            RuleError::Execution(e) => tracing::error!(
                rule_id = %rule.id,
                item = %item,
                event_type = %event.event_type,
                handler_type = %handler_type,
                error = %e,
                "Rule handler failed"
            ),
        }

        if self.settings.notify_errors {
            let message = format!(
                "Rule on {} ({}) failed: {}",
                event.item.name, event.event_type, error
            );
            match &error {
                RuleError::Build(_) => self.notifier.warn(&message),
                RuleError::Execution(_) => self.notifier.error(&message),
            }
        }

        report.failures.push(RuleFailure {
            rule: rule.id,
            item,
            event_type: event.event_type.clone(),
            handler_type,
            error,
        });
    }
}

#[async_trait]
impl HookListener for Dispatcher {
    async fn on_hook(&self, hook: &HookName, payload: &HookPayload) {
        self.handle(hook, payload).await;
    }
}
