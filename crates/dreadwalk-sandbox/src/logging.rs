use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// When `verbose` is `true`, debug messages are printed. Otherwise only info
/// level and above are shown. `RUST_LOG` overrides either default.
pub fn init(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // `try_init` only fails if a subscriber was already set. Ignore that case
    // so tests can call `init` multiple times without panicking.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
