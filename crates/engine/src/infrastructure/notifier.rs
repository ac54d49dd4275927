//! Notifications routed to the log.

use crate::infrastructure::ports::Notifier;

/// Headless notifier: user-facing notifications become log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "itemflow::notify", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "itemflow::notify", "{}", message);
    }
}
