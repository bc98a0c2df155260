//! Test-friendly log output.

use std::env;

use tracing::Level;

const LOG_ENV: &str = "MUZZLE_LOG";

/// Install a `tracing` subscriber that writes through the test harness.
///
/// The level comes from `MUZZLE_LOG` (`error`, `warn`, `info`, `debug`,
/// `trace`) and defaults to `warn`. Calling this more than once, or after
/// another subscriber was installed, does nothing.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level_from_env())
        .with_test_writer()
        .with_target(false)
        .try_init();
}

fn level_from_env() -> Level {
    env::var(LOG_ENV)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(Level::WARN)
}
