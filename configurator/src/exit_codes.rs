//! Stable exit codes for configurator CLI commands.

/// Command succeeded (workflow saved, listing printed, check passed).
pub const OK: i32 = 0;
/// Command failed: invalid config, missing or malformed schema, failed check.
pub const INVALID: i32 = 1;
/// `configurator new` ended without saving a workflow.
pub const QUIT: i32 = 2;
