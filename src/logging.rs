// 📝 Logging - tracing subscriber setup
//
// RUST_LOG overrides the per-binary default, e.g. RUST_LOG=seafood_cost=debug.
// Output goes to stderr so it never mixes with report output on stdout.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging with `default_filter` when RUST_LOG is unset.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Verbose logging captured by the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
