// src/logging.rs
// =============================================================================
// Diagnostic logging setup.
//
// Logs go to stderr through tracing-subscriber so that stdout stays clean for
// the report (and for --json output that other tools parse).
//
// Level selection:
// - RUST_LOG, when set, wins (e.g. RUST_LOG=sitemap_sentinel=debug)
// - otherwise -v flags: none = warn, -v = info, -vv and more = debug
// =============================================================================

use anyhow::Result;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Maps the number of -v flags to a default filter directive.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Installs the global tracing subscriber. Call once, at startup.
pub fn init_logging(verbosity: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
