use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Per-query sqlx logs are noisy at `info`; keep them at `warn` unless
/// asked for explicitly.
const QUIET_DIRECTIVES: &str = "sqlx=warn";

/// `RUST_LOG` wins over the configured level when both are set.
pub(crate) fn init_logging(default_level: &str) -> Result<()> {
    fmt()
        .with_env_filter(build_filter(default_level))
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(default_level)))
        .unwrap_or_else(|_| EnvFilter::new(default_directives("info")))
}

fn default_directives(level: &str) -> String {
    if level.contains("sqlx") {
        level.to_string()
    } else {
        format!("{level},{QUIET_DIRECTIVES}")
    }
}

#[cfg(test)]
mod tests {
    use super::default_directives;

    #[test]
    fn sqlx_is_quieted_unless_configured() {
        assert_eq!(default_directives("debug"), "debug,sqlx=warn");
        assert_eq!(default_directives("info,sqlx=debug"), "info,sqlx=debug");
    }
}
