use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Resolve the default log level from the environment name and an optional
/// explicit `LOG_LEVEL` value.
/// - Recognised explicit values: `debug`, `info`, `warn`/`warning`, `error`
/// - Otherwise `debug` for the `dev` environment and `info` for everything else
pub fn resolve_level(env: &str, explicit: Option<&str>) -> &'static str {
    let parsed = explicit.and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    });
    match parsed {
        Some(level) => level,
        None if env == "dev" => "debug",
        None => "info",
    }
}

/// Initialize tracing subscriber with JSON structured output.
/// - Respects `RUST_LOG` if set, otherwise uses `default_level`
/// - Keeps `tower_http` request traces visible at the same level
/// - Writes to stdout for consistent container logging behavior
pub fn init_logging_json(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{default_level},tower_http={default_level},sqlx=warn"))
    });
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::resolve_level;

    #[test]
    fn dev_defaults_to_debug() {
        assert_eq!(resolve_level("dev", None), "debug");
    }

    #[test]
    fn non_dev_defaults_to_info() {
        assert_eq!(resolve_level("prod", None), "info");
        assert_eq!(resolve_level("staging", Some("")), "info");
    }

    #[test]
    fn explicit_level_wins_case_insensitive() {
        assert_eq!(resolve_level("dev", Some("ERROR")), "error");
        assert_eq!(resolve_level("prod", Some(" warning ")), "warn");
    }

    #[test]
    fn unknown_explicit_level_falls_back() {
        assert_eq!(resolve_level("dev", Some("verbose")), "debug");
    }
}
