//! Logging init: structured stderr output with an env-filter override.

use tracing_subscriber::EnvFilter;

/// Initialize tracing output to stderr. `RUST_LOG` overrides the default
/// filter. Call at most once per process.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hardline_core=debug,hardline_cli=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
