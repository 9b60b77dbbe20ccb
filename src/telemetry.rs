use tracing_subscriber::EnvFilter;

/// Installs a JSON `tracing` subscriber filtered at `directive`
/// (e.g. `"info"`). `RUST_LOG`, when set, takes precedence.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let installed = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .with_current_span(false)
        .try_init()
        .is_ok();
    if installed {
        tracing::info!(filter = directive, "trace_initialised");
    }
}
