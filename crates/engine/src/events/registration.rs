//! Event type registrations and the predicates that gate them.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use itemflow_domain::Item;

use super::event::EventPatch;
use super::hooks::{HookName, HookPayload};
use crate::dispatch::ExecutionHost;

// =============================================================================
// Predicates
// =============================================================================

/// Cheap gate on the rule-bearing item, checked before the condition.
#[async_trait]
pub trait ItemFilter: Send + Sync {
    async fn accepts(&self, item: &Item) -> bool;
}

/// Decides whether a hook firing constitutes the event for an item.
///
/// Must be side-effect free: several registrations may share a hook and all
/// of them are evaluated for every firing.
#[async_trait]
pub trait EventCondition: Send + Sync {
    async fn matches(&self, item: &Item, payload: &HookPayload) -> bool;
}

/// Produces event data to merge over the default event.
#[async_trait]
pub trait EventTransform: Send + Sync {
    async fn transform(&self, item: &Item, payload: &HookPayload) -> EventPatch;
}

#[async_trait]
impl<F> ItemFilter for F
where
    F: Fn(&Item) -> bool + Send + Sync,
{
    async fn accepts(&self, item: &Item) -> bool {
        self(item)
    }
}

#[async_trait]
impl<F> EventCondition for F
where
    F: Fn(&Item, &HookPayload) -> bool + Send + Sync,
{
    async fn matches(&self, item: &Item, payload: &HookPayload) -> bool {
        self(item, payload)
    }
}

#[async_trait]
impl<F> EventTransform for F
where
    F: Fn(&Item, &HookPayload) -> EventPatch + Send + Sync,
{
    async fn transform(&self, item: &Item, payload: &HookPayload) -> EventPatch {
        self(item, payload)
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Declares how a hook firing becomes a named item event.
#[derive(Clone)]
pub struct EventTypeRegistration {
    pub source: String,
    pub event_type: String,
    pub label: String,
    pub hook: HookName,
    pub host: ExecutionHost,
    pub filter: Option<Arc<dyn ItemFilter>>,
    pub condition: Option<Arc<dyn EventCondition>>,
    pub transform: Option<Arc<dyn EventTransform>>,
}

impl EventTypeRegistration {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, hook: HookName) -> Self {
        let event_type = event_type.into();
        Self {
            source: source.into(),
            label: event_type.clone(),
            event_type,
            hook,
            host: ExecutionHost::default(),
            filter: None,
            condition: None,
            transform: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_host(mut self, host: ExecutionHost) -> Self {
        self.host = host;
        self
    }

    pub fn with_filter<F>(self, filter: F) -> Self
    where
        F: Fn(&Item) -> bool + Send + Sync + 'static,
    {
        self.with_item_filter(Arc::new(filter))
    }

    pub fn with_condition<F>(self, condition: F) -> Self
    where
        F: Fn(&Item, &HookPayload) -> bool + Send + Sync + 'static,
    {
        self.with_event_condition(Arc::new(condition))
    }

    pub fn with_transform<F>(self, transform: F) -> Self
    where
        F: Fn(&Item, &HookPayload) -> EventPatch + Send + Sync + 'static,
    {
        self.with_event_transform(Arc::new(transform))
    }

    /// Use a predicate implemented on a type (e.g. one that awaits host data).
    pub fn with_item_filter(mut self, filter: Arc<dyn ItemFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_event_condition(mut self, condition: Arc<dyn EventCondition>) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_event_transform(mut self, transform: Arc<dyn EventTransform>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Run filter then condition; absent predicates accept.
    pub async fn applies_to(&self, item: &Item, payload: &HookPayload) -> bool {
        if let Some(filter) = &self.filter {
            if !filter.accepts(item).await {
                return false;
            }
        }
        match &self.condition {
            Some(condition) => condition.matches(item, payload).await,
            None => true,
        }
    }

    pub fn describe(&self) -> EventTypeDescriptor {
        EventTypeDescriptor {
            event_type: self.event_type.clone(),
            label: self.label.clone(),
            source: self.source.clone(),
            hook: self.hook.clone(),
            host: self.host,
        }
    }
}

impl fmt::Debug for EventTypeRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTypeRegistration")
            .field("source", &self.source)
            .field("event_type", &self.event_type)
            .field("hook", &self.hook)
            .field("host", &self.host)
            .field("filter", &self.filter.is_some())
            .field("condition", &self.condition.is_some())
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// What the rule editor shows for an event type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeDescriptor {
    pub event_type: String,
    pub label: String,
    pub source: String,
    pub hook: HookName,
    pub host: ExecutionHost,
}
