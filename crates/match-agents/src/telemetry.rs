//! Tracing setup for the CLI.

/// Install the global fmt subscriber. `RUST_LOG` controls the filter,
/// defaulting to `info`.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}
