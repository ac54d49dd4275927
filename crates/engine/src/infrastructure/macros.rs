//! Macro runner with predeclared results.
//!
//! No user script is ever evaluated: each known macro has a fixed result and
//! every call is recorded for inspection.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::infrastructure::ports::{MacroContext, MacroError, MacroRunner};

#[derive(Debug, Default)]
pub struct ScriptedMacroRunner {
    results: HashMap<String, Option<bool>>,
    calls: Mutex<Vec<(String, MacroContext)>>,
}

impl ScriptedMacroRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_macro(mut self, macro_ref: impl Into<String>, result: Option<bool>) -> Self {
        self.results.insert(macro_ref.into(), result);
        self
    }

    pub fn from_results(results: HashMap<String, Option<bool>>) -> Self {
        Self {
            results,
            calls: Mutex::default(),
        }
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<(String, MacroContext)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl MacroRunner for ScriptedMacroRunner {
    async fn execute(
        &self,
        macro_ref: &str,
        ctx: &MacroContext,
    ) -> Result<Option<bool>, MacroError> {
        let result = *self
            .results
            .get(macro_ref)
            .ok_or_else(|| MacroError::NotFound(macro_ref.to_string()))?;

        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((macro_ref.to_string(), ctx.clone()));

        tracing::info!(
            macro_ref = %macro_ref,
            event_type = %ctx.event_type,
            item = %ctx.item,
            result = ?result,
            "Macro executed"
        );
        Ok(result)
    }
}
