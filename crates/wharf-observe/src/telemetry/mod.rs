//! Conditional activation of an external monitoring client.
//!
//! [`init_telemetry`] decides, in order:
//! 1. no dsn configured: nothing happens;
//! 2. development run: nothing happens, whatever the dsn;
//! 3. otherwise the client is loaded through a [`ClientLoader`] and initialized
//!    with the dsn, the effective sample rate and no integrations.
mod client;
mod config;
mod error;

pub use client::{ClientLoader, ClientOptions, LoaderFn, MonitoringClient, loader_fn};
pub use config::{
    DEFAULT_TRACES_SAMPLE_RATE, DSN_ENV, RUN_MODE_ENV, RunMode, SAMPLE_RATE_ENV, TelemetryConfig,
};
pub use error::{TelemetryError, TelemetryResult};

use tracing::{debug, info};

/// What [`init_telemetry`] ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryState {
    /// No dsn configured.
    Disabled,
    /// A dsn is configured but the process runs in development mode.
    Suppressed,
    /// The client was initialized with these options.
    Active(ClientOptions),
}

impl TelemetryState {
    pub fn is_active(&self) -> bool {
        matches!(self, TelemetryState::Active(_))
    }
}

/// Activates monitoring when `cfg` and `mode` allow it.
///
/// A missing or blank dsn means disabled. Meant to run once at startup;
/// repeated calls are not guarded against. Load and init failures are
/// returned as-is, without retry.
///
/// # Examples
/// ```rust
/// use std::sync::Arc;
/// use wharf_observe::{
///     ClientOptions, MonitoringClient, RunMode, TelemetryConfig, TelemetryError, TelemetryState,
///     init_telemetry, loader_fn,
/// };
///
/// struct Noop;
///
/// impl MonitoringClient for Noop {
///     fn init(&self, _: &ClientOptions) -> Result<(), TelemetryError> {
///         Ok(())
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), TelemetryError> {
/// let loader = loader_fn(|| async { Ok::<_, TelemetryError>(Arc::new(Noop) as Arc<dyn MonitoringClient>) });
///
/// let off = init_telemetry(&TelemetryConfig::default(), RunMode::Production, &loader).await?;
/// assert_eq!(off, TelemetryState::Disabled);
///
/// let cfg = TelemetryConfig::with_dsn("https://key@mon.example/1");
/// let state = init_telemetry(&cfg, RunMode::Production, &loader).await?;
/// assert!(state.is_active());
/// # Ok(())
/// # }
/// ```
pub async fn init_telemetry<L>(
    cfg: &TelemetryConfig,
    mode: RunMode,
    loader: &L,
) -> TelemetryResult<TelemetryState>
where
    L: ClientLoader + ?Sized,
{
    let Some(dsn) = cfg.dsn.as_deref().filter(|d| !d.trim().is_empty()) else {
        debug!("telemetry disabled: no dsn configured");
        return Ok(TelemetryState::Disabled);
    };
    if mode.is_development() {
        debug!(%mode, "telemetry suppressed in development mode");
        return Ok(TelemetryState::Suppressed);
    }
    cfg.validate()?;

    let opts = ClientOptions {
        dsn: dsn.to_string(),
        traces_sample_rate: cfg.effective_sample_rate(),
        integrations: Vec::new(),
    };

    let client = loader.load().await?;
    client.init(&opts)?;

    info!(
        traces_sample_rate = opts.traces_sample_rate,
        "monitoring client initialized"
    );
    Ok(TelemetryState::Active(opts))
}
