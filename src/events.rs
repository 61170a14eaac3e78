//! Diagnostic logging setup.

use crate::trace_categories;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Error returned for a `--trace` category that does not exist.
#[derive(thiserror::Error, Debug)]
#[error("unknown trace category '{0}' (expected one of: {categories})", categories = trace_categories::ALL.join(", "))]
pub struct UnknownTraceCategory(pub String);

/// Build the log filter: warnings by default, debug output for the requested
/// categories, or for every category when `verbose` is set.
pub fn compose_filter(verbose: bool, categories: &[String]) -> Result<Targets, UnknownTraceCategory> {
    let mut filter = Targets::new().with_default(LevelFilter::WARN);

    let enabled: Vec<&str> = if verbose {
        trace_categories::ALL.to_vec()
    } else {
        categories
            .iter()
            .map(|requested| {
                trace_categories::ALL
                    .iter()
                    .copied()
                    .find(|known| *known == requested.as_str())
                    .ok_or_else(|| UnknownTraceCategory(requested.clone()))
            })
            .collect::<Result<_, _>>()?
    };

    for target in enabled {
        filter = filter.with_target(target, LevelFilter::DEBUG);
    }
    Ok(filter)
}

/// Install a stderr subscriber with the given filter.
///
/// Logging goes to stderr only, so it never mixes with pipeline output.
pub fn init(filter: Targets) {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_filter(filter);

    if tracing_subscriber::registry().with(layer).try_init().is_err() {
        // Something went wrong; proceed on anyway but complain audibly.
        eprintln!("warning: failed to initialize tracing.");
    }
}
