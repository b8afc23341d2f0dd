use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging with human-readable output.
///
/// Uses `RUST_LOG` if set, otherwise falls back to `default_level` (spec
/// §6's `LOG_LEVEL`, e.g. "info", "debug", "scout_antispam=debug,warn").
///
/// Safe to call multiple times (e.g. in tests) — subsequent calls are no-ops.
pub fn init_logging(service_name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .try_init()
        .ok();

    tracing::info!(service = service_name, "logging initialised (text)");
}

/// Initialize logging with JSON output (spec §6 `LOG_FORMAT=json`).
pub fn init_logging_json(service_name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .try_init()
        .ok();

    tracing::info!(service = service_name, "logging initialised (json)");
}

/// Dispatch on the `LOG_FORMAT` string from config (`"json"` or `"text"`).
pub fn init_logging_for_format(service_name: &str, default_level: &str, format: &str) {
    if format.eq_ignore_ascii_case("json") {
        init_logging_json(service_name, default_level);
    } else {
        init_logging(service_name, default_level);
    }
}
