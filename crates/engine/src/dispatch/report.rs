//! What a dispatch did.

use itemflow_domain::{DocumentRef, HandlerType, RuleId};

use crate::handlers::{HandlerBuildError, HandlerExecutionError, HandlerOutcome};

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error(transparent)]
    Build(#[from] HandlerBuildError),
    #[error(transparent)]
    Execution(#[from] HandlerExecutionError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleExecution {
    pub rule: RuleId,
    pub item: DocumentRef,
    pub event_type: String,
    pub handler_type: HandlerType,
    pub outcome: HandlerOutcome,
}

#[derive(Debug)]
pub struct RuleFailure {
    pub rule: RuleId,
    pub item: DocumentRef,
    pub event_type: String,
    /// The persisted tag, which may not name a known type
    pub handler_type: String,
    pub error: RuleError,
}

/// Summary of one hook firing on this client.
///
/// Nested dispatches triggered by handler mutations produce their own reports.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Events that passed gating and had rules bound to them
    pub events: usize,
    pub executed: Vec<RuleExecution>,
    /// Events whose remaining rules a handler suppressed
    pub suppressed: usize,
    /// Events another client is elected to run
    pub not_elected: usize,
    /// Events skipped because their (item, event) pair was already in flight
    pub cycles_broken: usize,
    pub failures: Vec<RuleFailure>,
}

impl DispatchReport {
    pub fn executed_rules(&self) -> Vec<RuleId> {
        self.executed.iter().map(|execution| execution.rule).collect()
    }

    pub fn failed_rules(&self) -> Vec<RuleId> {
        self.failures.iter().map(|failure| failure.rule).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events == 0 && self.cycles_broken == 0
    }
}
