use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber: stderr, warn by default, debug with
/// `--verbose`, overridable via `RUST_LOG`.
pub fn init(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
