//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "warn";

/// Initialize the tracing subscriber from `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`].
///
/// Output goes to stderr; stdout is reserved for the report.
pub fn init_tracing() {
    init_tracing_with(DEFAULT_FILTER);
}

/// Initialize the tracing subscriber with an explicit fallback filter.
///
/// `RUST_LOG` still wins when it is set. Calling this twice is a no-op for
/// the second call.
pub fn init_tracing_with(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
