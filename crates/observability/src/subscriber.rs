//! JSON log subscriber.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or does not parse.
pub const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Install the process-wide subscriber.
///
/// Returns `false` when a global subscriber was already set.
pub fn install() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(true)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(default_filter = DEFAULT_FILTER, "log subscriber installed");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_a_no_op() {
        let _ = install();
        assert!(!install());
    }
}
