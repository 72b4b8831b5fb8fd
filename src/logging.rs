use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Events go to stderr.
///
/// The filter comes from `RUST_LOG` and defaults to `info`, e.g.
/// `RUST_LOG=sortie_plan=debug`.
///
/// ```no_run
/// sortie_plan::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second call keeps the first subscriber.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .try_init();
}

/// Debug-level subscriber routed through the test harness writer, for
/// unit tests that want to see rejected drops and sparse-save decisions.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
