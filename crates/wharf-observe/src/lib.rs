//! Logging and monitoring setup for wharf processes.
//!
//! - [`init_logger`] installs the global `tracing` subscriber.
//! - [`init_telemetry`] activates an external monitoring client when configured.
mod logger;
pub use logger::*;

pub mod telemetry;
pub use telemetry::{
    ClientLoader, ClientOptions, MonitoringClient, RunMode, TelemetryConfig, TelemetryError,
    TelemetryState, init_telemetry, loader_fn,
};
