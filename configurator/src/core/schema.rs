//! Module schema contract.

use anyhow::Result;

use crate::core::types::{Arg, ArgType, ELEMENTS_IN, Phase};

/// Source of module names and argument descriptors.
///
/// Implementations may read from disk; failures are configuration errors and
/// abort the session.
pub trait SchemaProvider {
    /// Modules available for `phase`, in presentation order.
    fn modules(&self, phase: Phase) -> Result<Vec<String>>;

    /// Arguments a module declares for `phase`, in question order.
    fn args(&self, module: &str, phase: Phase) -> Result<Vec<Arg>>;
}

/// Arguments the engine asks for, in order.
///
/// Analyse-phase modules always take `elements_in` first; a module that also
/// declares it does not get asked twice.
pub fn effective_args(
    schema: &dyn SchemaProvider,
    module: &str,
    phase: Phase,
) -> Result<Vec<Arg>> {
    let declared = schema.args(module, phase)?;
    if phase != Phase::Analyse {
        return Ok(declared);
    }
    let mut args = Vec::with_capacity(declared.len() + 1);
    args.push(Arg::new(ELEMENTS_IN, ArgType::Whitelist, true));
    args.extend(declared.into_iter().filter(|arg| arg.name != ELEMENTS_IN));
    Ok(args)
}
