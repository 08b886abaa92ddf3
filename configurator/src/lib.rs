//! Interactive workflow-configuration engine.
//!
//! A session asks a dynamically computed sequence of questions and assembles
//! the answers into a workflow document for one pipeline phase. The
//! architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (next-question resolution,
//!   composition, invariants). Schema lookups go through an injected provider.
//! - **[`io`]**: Side-effecting operations (config, module library on disk,
//!   folder probes, workflow persistence, screen templates).
//!
//! Orchestration modules ([`session`], [`validate`], [`present`], [`check`])
//! combine the two to implement CLI commands.

pub mod check;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod present;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validate;
