//! Deterministic, pure logic of the configuration engine.
//!
//! Core modules perform no I/O of their own. Schema lookups go through the
//! injected [`schema::SchemaProvider`], so everything here is testable with an
//! in-memory schema.

pub mod compose;
pub mod invariants;
pub mod resolver;
pub mod schema;
pub mod state;
pub mod types;
