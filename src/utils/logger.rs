use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Levels accepted by `[monitoring] log_level`.
pub const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

pub fn verbosity_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

// debug 以上也開啟相依套件的 info 日誌
fn filter_directive(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    match level.as_str() {
        "debug" | "trace" => format!("campus_energy_dashboard={},info", level),
        _ => format!("campus_energy_dashboard={}", level),
    }
}

/// `RUST_LOG` takes precedence over `level`.
fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directive(level)))
}

pub fn init_cli_logger(verbose: bool) {
    init_cli_logger_at(verbosity_level(verbose));
}

pub fn init_cli_logger_at(level: &str) {
    tracing_subscriber::registry()
        .with(level_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// JSON 格式日誌，方便交給日誌收集系統
pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(level_filter(verbosity_level(verbose)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_follows_level() {
        assert_eq!(filter_directive("warn"), "campus_energy_dashboard=warn");
        assert_eq!(filter_directive(" Error "), "campus_energy_dashboard=error");
        assert_eq!(filter_directive("trace"), "campus_energy_dashboard=trace,info");
        assert_eq!(
            filter_directive(verbosity_level(true)),
            "campus_energy_dashboard=debug,info"
        );
        assert_eq!(filter_directive(verbosity_level(false)), "campus_energy_dashboard=info");
    }
}
