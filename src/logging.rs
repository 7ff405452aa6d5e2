//! Diagnostic logging for the binary. Output goes to stderr so stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `DEBRIEF_LOG=debrief::linking=debug`.
pub const LOG_ENV: &str = "DEBRIEF_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Calling it twice is harmless; the second call is ignored.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
