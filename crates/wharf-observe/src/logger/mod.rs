mod config;
mod error;
mod format;
mod level;

pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use format::LoggerFormat;
pub use level::LoggerLevel;

use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global tracing subscriber described by `cfg`.
///
/// Can succeed only once per process; later calls return
/// [`LoggerError::AlreadyInitialized`].
///
/// # Examples
/// ```rust
/// use wharf_observe::{LoggerConfig, init_logger};
///
/// init_logger(&LoggerConfig::default()).expect("logger");
/// tracing::info!("ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    let filter = cfg.level.to_env_filter();
    let registry = tracing_subscriber::registry().with(filter);

    match cfg.format {
        LoggerFormat::Text => install(
            registry.with(
                fmt::layer()
                    .with_ansi(cfg.should_use_color())
                    .with_target(cfg.with_targets),
            ),
        ),
        LoggerFormat::Json => install(
            registry.with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_target(cfg.with_targets),
            ),
        ),
    }
}

fn install<S>(subscriber: S) -> LoggerResult<()>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global subscriber is process-wide, so both calls live in one test.
    #[test]
    fn second_init_reports_already_initialized() {
        let cfg = LoggerConfig {
            format: LoggerFormat::Json,
            level: "debug".parse().unwrap(),
            with_targets: false,
            use_color: false,
        };

        let first = init_logger(&cfg);
        assert!(first.is_ok(), "first init failed: {first:?}");

        let second = init_logger(&LoggerConfig::default());
        assert!(matches!(second, Err(LoggerError::AlreadyInitialized)));
    }
}
