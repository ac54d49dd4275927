//! ItemFlow Engine library.
//!
//! Reacts to host lifecycle hooks by running the automation rules items carry.
//!
//! ## Structure
//!
//! - `events/` - Event type registry, hook payloads and the built-in event types
//! - `handlers/` - Handler type system and the built-in handlers
//! - `dispatch/` - Hook → event classification, host election, rule execution
//! - `infrastructure/` - Ports, in-process adapters and configuration
//! - `app` - Application composition and host actions
//! - `scenario` - Replaying a seeded world and a list of host actions

pub mod app;
pub mod dispatch;
pub mod events;
pub mod handlers;
pub mod infrastructure;
pub mod scenario;

/// End-to-end tests through the in-memory world.
#[cfg(test)]
mod scenario_tests;

pub use app::{App, AppServices};
