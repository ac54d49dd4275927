//! Infrastructure implementations.
//!
//! Contains the port traits and their in-process adapters.

pub mod clock;
pub mod config;
pub mod hooks;
pub mod item_use;
pub mod macros;
pub mod memory;
pub mod notifier;
pub mod ports;
pub mod session;
