//! Tracing subscriber bootstrap.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. Otherwise the binary's own crate is logged at
/// `default_level` and everything else at `info`.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let crate_target = bin_name.replace('-', "_");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "info,{crate_target}={default_level},tower_http={default_level}"
        ))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}
