//! Event type registry.
//!
//! Built once at startup and then shared read-only with the dispatcher and
//! the rule editor.

use std::collections::HashMap;

use super::builtin;
use super::hooks::HookName;
use super::registration::{EventTypeDescriptor, EventTypeRegistration};

/// Two sources tried to register the same event type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Event type '{event_type}' is already registered by '{registered_by}' \
     (attempted by '{attempted_by}')"
)]
pub struct DuplicateEventTypeError {
    pub event_type: String,
    pub registered_by: String,
    pub attempted_by: String,
}

#[derive(Debug, Default)]
pub struct EventTypeRegistry {
    entries: Vec<EventTypeRegistration>,
    index: HashMap<String, usize>,
}

impl EventTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in event type.
    pub fn with_builtin_types() -> Result<Self, DuplicateEventTypeError> {
        let mut registry = Self::new();
        for registration in builtin::registrations() {
            registry.register(registration)?;
        }
        Ok(registry)
    }

    /// Add an event type.
    ///
    /// Re-registering from the same source replaces the entry in place;
    /// a different source claiming the same type is rejected.
    pub fn register(
        &mut self,
        registration: EventTypeRegistration,
    ) -> Result<(), DuplicateEventTypeError> {
        match self.index.get(&registration.event_type) {
            Some(&position) => {
                let existing = &self.entries[position];
                if existing.source != registration.source {
                    return Err(DuplicateEventTypeError {
                        event_type: registration.event_type,
                        registered_by: existing.source.clone(),
                        attempted_by: registration.source,
                    });
                }
                tracing::debug!(
                    event_type = %registration.event_type,
                    source = %registration.source,
                    "Replacing event type registration"
                );
                self.entries[position] = registration;
            }
            None => {
                self.index
                    .insert(registration.event_type.clone(), self.entries.len());
                self.entries.push(registration);
            }
        }
        Ok(())
    }

    /// Registrations listening on `hook`, in registration order.
    pub fn event_types_for_hook(&self, hook: &HookName) -> Vec<&EventTypeRegistration> {
        self.entries
            .iter()
            .filter(|registration| &registration.hook == hook)
            .collect()
    }

    pub fn get(&self, event_type: &str) -> Option<&EventTypeRegistration> {
        self.index
            .get(event_type)
            .map(|&position| &self.entries[position])
    }

    /// Distinct hook names, in first-registered order.
    pub fn hooks(&self) -> Vec<HookName> {
        let mut hooks: Vec<HookName> = Vec::new();
        for registration in &self.entries {
            if !hooks.contains(&registration.hook) {
                hooks.push(registration.hook.clone());
            }
        }
        hooks
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventTypeRegistration> {
        self.entries.iter()
    }

    pub fn describe(&self) -> Vec<EventTypeDescriptor> {
        self.entries.iter().map(EventTypeRegistration::describe).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
