//! End-to-end test harness descriptor.
//!
//! [`HarnessConfig`] declares where tests live, how long each may run, how
//! failures are retried and traced, and which local server the harness must
//! bring up first. With the `server` feature, [`server::ManagedServer`]
//! starts (or reuses) that server.
mod error;
pub use error::{HarnessError, HarnessResult};

mod config;
pub use config::{
    BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_TEST_DIR, DEFAULT_TIMEOUT_MS, HarnessConfig,
    base_url_from_env, resolve_base_url,
};

mod trace;
pub use trace::TracePolicy;

mod web_server;
pub use web_server::{DEFAULT_STARTUP_TIMEOUT_MS, ServerCommand, WebServerConfig};

#[cfg(feature = "server")]
pub mod server;
