//! In-process hook host.
//!
//! Listeners run sequentially in registration order and each is awaited
//! before the next, the way the host runs its hook callbacks.

use std::sync::Arc;

use dashmap::DashMap;

use crate::events::{HookName, HookPayload};
use crate::infrastructure::ports::{HookHost, HookListener};

#[derive(Default)]
pub struct LocalHooks {
    listeners: DashMap<HookName, Vec<Arc<dyn HookListener>>>,
}

impl LocalHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the hook `payload` belongs to.
    pub async fn fire(&self, payload: &HookPayload) {
        let hook = payload.hook_name();
        // Clone out so no map guard is held while listeners run (they may fire
        // further hooks).
        let listeners: Vec<Arc<dyn HookListener>> = self
            .listeners
            .get(&hook)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        tracing::trace!(hook = %hook, listeners = listeners.len(), "Firing hook");
        for listener in listeners {
            listener.on_hook(&hook, payload).await;
        }
    }

    pub fn listener_count(&self, hook: &HookName) -> usize {
        self.listeners.get(hook).map(|entry| entry.len()).unwrap_or(0)
    }
}

impl HookHost for LocalHooks {
    fn listen(&self, hook: HookName, listener: Arc<dyn HookListener>) {
        self.listeners.entry(hook).or_default().push(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use itemflow_domain::{Item, ItemType, OperationContext, UserId};
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl HookListener for Recorder {
        async fn on_hook(&self, hook: &HookName, _payload: &HookPayload) {
            self.seen.lock().unwrap().push(format!("{}:{}", self.name, hook));
        }
    }

    #[tokio::test]
    async fn listeners_run_in_order_for_their_hook_only() {
        let hooks = LocalHooks::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        hooks.listen(
            HookName::CREATE_ITEM,
            Arc::new(Recorder { name: "a", seen: seen.clone() }),
        );
        hooks.listen(
            HookName::CREATE_ITEM,
            Arc::new(Recorder { name: "b", seen: seen.clone() }),
        );
        hooks.listen(
            HookName::DELETE_ITEM,
            Arc::new(Recorder { name: "c", seen: seen.clone() }),
        );

        hooks
            .fire(&HookPayload::CreateItem {
                item: Item::new("Sphere", ItemType::Loot),
                op: OperationContext::new(UserId::new(), Utc::now()),
            })
            .await;

        assert_eq!(*seen.lock().unwrap(), vec!["a:createItem", "b:createItem"]);
        assert_eq!(hooks.listener_count(&HookName::DELETE_ITEM), 1);
    }
}
