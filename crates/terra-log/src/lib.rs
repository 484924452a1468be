//! Structured logging for the globe effect and its demo host.
//!
//! Console output with timestamps and module paths via the `tracing`
//! ecosystem, plus JSON file logging in debug builds for post-mortem
//! analysis. The log filter can come from `RUST_LOG`, from the settings
//! file, or fall back to a quiet default.

use std::path::Path;

use terra_config::Settings;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter: informational messages, with the GPU stack quieted down.
const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// Initialize the tracing subscriber.
///
/// * `log_dir` — optional directory for JSON log files (debug builds only)
/// * `debug_build` — whether this is a debug build (enables file logging)
/// * `settings` — optional settings carrying a log-level override
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, settings: Option<&Settings>) {
    let filter_str = settings
        .map(|s| s.log_level.as_str())
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_FILTER);

    // RUST_LOG wins over everything when set.
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true) // cloud-fetch and texture loader threads are named
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join("terra.log"))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// The default [`EnvFilter`], for tests and embedding hosts.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quiets_gpu_crates() {
        let filter = format!("{}", default_env_filter());
        assert!(filter.contains("wgpu=warn"));
        assert!(filter.contains("naga=warn"));
        assert!(filter.contains("info"));
    }

    #[test]
    fn test_settings_override_is_used_when_nonempty() {
        let mut settings = Settings::default();
        settings.log_level = "debug,terra_clouds=trace".to_string();
        let filter = EnvFilter::new(&settings.log_level);
        let rendered = format!("{filter}");
        assert!(rendered.contains("terra_clouds=trace"));
    }

    #[test]
    fn test_filter_strings_parse() {
        for filter in ["info", "warn,terra_render=debug", "error", "trace"] {
            assert!(
                EnvFilter::try_new(filter).is_ok(),
                "Filter should parse: {filter}"
            );
        }
    }

    #[test]
    fn test_log_file_path_layout() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path()).unwrap();
        let path = dir.path().join("terra.log");
        assert_eq!(path.file_name().unwrap(), "terra.log");
    }
}
