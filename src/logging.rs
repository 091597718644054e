//! Logging setup, gated on `STARFIG_DEBUG` the way the CLI's ambient
//! observability is wired in the rest of the pack (`tracing`/
//! `tracing-subscriber` with an env filter): trace-level spans when the
//! variable is set, info-level otherwise.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = if std::env::var_os("STARFIG_DEBUG").is_some() {
        EnvFilter::new("trace")
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
