use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("readiness url '{readiness_url}' does not match base url '{base_url}'")]
    ReadinessUrlMismatch {
        base_url: String,
        readiness_url: String,
    },

    #[error("invalid trace policy: {0} (expected: off|on|retain-on-failure|on-first-retry)")]
    InvalidTracePolicy(String),

    #[error("url {url} is already in use and reusing an existing server is disabled")]
    AlreadyInUse { url: String },

    #[error("web server command is empty")]
    EmptyCommand,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http client error: {0}")]
    HttpClient(String),

    #[error("web server exited before becoming ready: {0}")]
    ServerExited(String),

    #[error("web server at {url} not ready after {timeout_ms}ms")]
    ServerNotReady { url: String, timeout_ms: u64 },
}

pub type HarnessResult<T> = Result<T, HarnessError>;
