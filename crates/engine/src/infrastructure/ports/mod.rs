//! Port traits for infrastructure boundaries.
//!
//! These are the only abstractions between the engine and the host:
//! - Document reads and mutations (host document API)
//! - Item use and macro execution (host services)
//! - Session view and notifications (multi-client awareness)
//! - Hook registration (host lifecycle hooks)
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;
pub mod types;

// =============================================================================
// Document Ports
// =============================================================================
pub use repos::DocumentStore;

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    HookHost, HookListener, ItemUsePort, MacroContext, MacroRunner, Notifier, SessionPort,
};

pub use types::SessionUser;

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::MockDocumentStore;

#[cfg(test)]
pub use external::{MockItemUsePort, MockMacroRunner, MockNotifier, MockSessionPort};

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{MacroError, RepoError};
