pub mod app;
pub mod cli;

use tracing_subscriber::EnvFilter;

/// Logs go to stderr so command output on stdout stays clean. `HABITS_LOG` sets the filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("HABITS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
