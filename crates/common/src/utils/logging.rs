use std::io;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,sqlx=warn,sea_orm_migration=info";

/// Initialize tracing subscriber with compact human-readable output on stdout.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,sqlx=warn,sea_orm_migration=info`
pub fn init_logging_default() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing subscriber with JSON structured output.
/// Use `RUST_LOG=info,service=debug` to see per-query access-layer events.
pub fn init_logging_json() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_logging_default();
        // a second subscriber install is ignored instead of panicking
        init_logging_json();
        tracing::info!(event = "logging_test", "subscriber installed");
    }
}
