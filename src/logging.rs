//! Process-wide log setup.
//!
//! Every component logs through `tracing`. The `fmt` layer stamps each event
//! with a timestamp and level; `RUST_LOG` overrides the default `info` filter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Returns `false` if one was already set,
/// so test binaries and the CLI can both call it freely.
pub fn init() -> bool {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".to_string().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .is_ok()
}

/// Short, log-safe preview of a secret value.
pub fn redact(value: &str) -> String {
    format!("{}...", value.chars().take(6).collect::<String>())
}
