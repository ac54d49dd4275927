//! Item use through the local hook host.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use itemflow_domain::{Item, OperationContext};

use crate::events::HookPayload;
use crate::infrastructure::hooks::LocalHooks;
use crate::infrastructure::ports::{ItemUsePort, RepoError};

/// Using an item fires the use-item hook with the caller's operation context.
pub struct HookItemUse {
    hooks: Arc<LocalHooks>,
}

impl HookItemUse {
    pub fn new(hooks: Arc<LocalHooks>) -> Self {
        Self { hooks }
    }
}

#[async_trait]
impl ItemUsePort for HookItemUse {
    async fn use_item(
        &self,
        item: &Item,
        options: &Value,
        op: &OperationContext,
    ) -> Result<(), RepoError> {
        tracing::debug!(item = %item.uuid(), depth = op.depth(), "Using item");
        self.hooks
            .fire(&HookPayload::UseItem {
                item: item.clone(),
                options: options.clone(),
                op: op.clone(),
            })
            .await;
        Ok(())
    }
}
