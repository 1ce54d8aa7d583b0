//! Tracing subscriber setup: human-readable events on stderr, filtered by environment.

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

/// Filter directive: explicit filter wins, `--verbose` raises the default from warn to info.
pub fn filter_directive(explicit: Option<&str>, verbose: bool) -> String {
    match explicit {
        Some(f) if !f.trim().is_empty() => f.trim().to_string(),
        _ if verbose => "xcp_ng_dev=info,warn".to_string(),
        _ => "warn".to_string(),
    }
}

pub fn telemetry_init(explicit: Option<&str>, verbose: bool) {
    if INIT.get().is_some() {
        return;
    }
    let directive = filter_directive(explicit, verbose);
    let env_filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("xcp-ng-dev: invalid log filter '{directive}': {e}; using 'warn'");
        EnvFilter::new("warn")
    });
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();
    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("xcp-ng-dev: logging init skipped (global subscriber already set)");
    }
    let _ = INIT.set(());
}
