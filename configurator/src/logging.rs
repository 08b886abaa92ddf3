//! Diagnostic tracing for the configurator.
//!
//! Tracing output goes to stderr and never mixes with the questions written
//! by the presenter on stdout, so scripted sessions stay parseable.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `verbose` selects `configurator=debug`
/// and the default is `warn`, which still surfaces rejected answers.
///
/// # Example
/// ```bash
/// RUST_LOG=configurator::session=debug configurator new
/// ```
pub fn init(verbose: bool) {
    let fallback = if verbose { "configurator=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .compact(),
        )
        .init();
}
