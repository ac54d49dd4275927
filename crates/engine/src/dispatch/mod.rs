//! Hook dispatch: gating, election and rule execution.

mod dispatcher;
mod election;
mod report;

pub use dispatcher::Dispatcher;
pub use election::{ElectionContext, ExecutionHost};
pub use report::{DispatchReport, RuleError, RuleExecution, RuleFailure};
