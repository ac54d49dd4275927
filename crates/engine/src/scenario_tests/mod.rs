//! End-to-end tests through the in-memory world.
//!
//! Every test wires a complete App (store, hook host, dispatcher, built-in
//! registries) and drives it through host actions only, the way the host
//! would. Assertions are made on the resulting documents and mutation log.

mod world;

pub use world::*;
