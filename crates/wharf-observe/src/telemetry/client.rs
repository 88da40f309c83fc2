use std::{future::Future, sync::Arc};

use async_trait::async_trait;

use crate::telemetry::TelemetryResult;

/// Options passed to the monitoring client's init entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub dsn: String,
    pub traces_sample_rate: f64,
    /// Extra client integrations. The initializer always passes none.
    pub integrations: Vec<String>,
}

/// External error/performance monitoring client.
///
/// `init` configures the client process-wide; what that means (global hub,
/// background transport, ...) is up to the implementation.
pub trait MonitoringClient: Send + Sync {
    fn init(&self, opts: &ClientOptions) -> TelemetryResult<()>;
}

/// Acquires the monitoring client on demand.
///
/// Only called once telemetry is known to be active, so processes running
/// with telemetry disabled never pay for loading the client.
#[async_trait]
pub trait ClientLoader: Send + Sync {
    async fn load(&self) -> TelemetryResult<Arc<dyn MonitoringClient>>;
}

/// [`ClientLoader`] backed by an async closure. See [`loader_fn`].
pub struct LoaderFn<F>(F);

/// Wrap an async closure as a [`ClientLoader`].
///
/// # Examples
/// ```rust
/// use std::sync::Arc;
/// use wharf_observe::{ClientOptions, MonitoringClient, TelemetryError, loader_fn};
///
/// struct Stdout;
///
/// impl MonitoringClient for Stdout {
///     fn init(&self, opts: &ClientOptions) -> Result<(), TelemetryError> {
///         println!("monitoring -> {}", opts.dsn);
///         Ok(())
///     }
/// }
///
/// let _loader = loader_fn(|| async { Ok::<_, TelemetryError>(Arc::new(Stdout) as Arc<dyn MonitoringClient>) });
/// ```
pub fn loader_fn<F, Fut>(f: F) -> LoaderFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = TelemetryResult<Arc<dyn MonitoringClient>>> + Send + 'static,
{
    LoaderFn(f)
}

#[async_trait]
impl<F, Fut> ClientLoader for LoaderFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = TelemetryResult<Arc<dyn MonitoringClient>>> + Send + 'static,
{
    async fn load(&self) -> TelemetryResult<Arc<dyn MonitoringClient>> {
        (self.0)().await
    }
}
