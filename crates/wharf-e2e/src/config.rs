use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use wharf_model::Env;

use crate::{HarnessError, HarnessResult, ServerCommand, TracePolicy, WebServerConfig};

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "WHARF_E2E_BASE_URL";
/// Base URL used when [`BASE_URL_ENV`] is unset.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5173";
/// Per-test timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Directory holding the end-to-end tests.
pub const DEFAULT_TEST_DIR: &str = "e2e";

/// Pick the base URL: the override from `lookup` when set, else the default.
///
/// A blank override counts as unset.
///
/// # Examples
/// ```
/// use wharf_e2e::{BASE_URL_ENV, DEFAULT_BASE_URL, resolve_base_url};
///
/// assert_eq!(resolve_base_url(|_| None), DEFAULT_BASE_URL);
///
/// let staging = resolve_base_url(|k| {
///     (k == BASE_URL_ENV).then(|| "https://staging.example.com".to_string())
/// });
/// assert_eq!(staging, "https://staging.example.com");
/// ```
pub fn resolve_base_url<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(BASE_URL_ENV) {
        Some(url) if !url.trim().is_empty() => url,
        _ => DEFAULT_BASE_URL.to_string(),
    }
}

/// [`resolve_base_url`] against the process environment.
pub fn base_url_from_env() -> String {
    resolve_base_url(|k| std::env::var(k).ok())
}

/// Declarative description of an end-to-end test run.
///
/// Nothing here runs tests: the harness reads this descriptor, starts
/// [`HarnessConfig::web_server`], waits for it to answer, then runs the tests
/// in `test_dir` against `base_url` with the given timeout, retry and trace
/// policies.
///
/// When a document leaves out `webServer.url`, the readiness URL follows
/// `baseUrl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "HarnessDoc")]
pub struct HarnessConfig {
    pub test_dir: PathBuf,
    /// Per-test timeout in milliseconds.
    pub timeout_ms: u64,
    /// Automatic retries of a failing test.
    pub retries: u32,
    pub base_url: String,
    pub trace: TracePolicy,
    pub web_server: WebServerConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl HarnessConfig {
    /// Canonical descriptor for `base_url`; the server readiness URL is the same URL.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use wharf_e2e::{HarnessConfig, TracePolicy};
    ///
    /// let cfg = HarnessConfig::new("http://127.0.0.1:4173");
    /// assert_eq!(cfg.web_server.url, cfg.base_url);
    /// assert_eq!(cfg.timeout(), Duration::from_secs(30));
    /// assert_eq!(cfg.retries, 0);
    /// assert_eq!(cfg.trace, TracePolicy::OnFirstRetry);
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            test_dir: PathBuf::from(DEFAULT_TEST_DIR),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retries: 0,
            trace: TracePolicy::OnFirstRetry,
            web_server: WebServerConfig::for_url(base_url.clone()),
            base_url,
        }
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let cfg = Self::new(resolve_base_url(lookup));
        debug!(base_url = %cfg.base_url, "e2e harness config resolved");
        cfg
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Rules:
    /// - `base_url` is an absolute http(s) URL;
    /// - the web server has a command and a valid readiness URL;
    /// - the readiness URL is the base URL.
    pub fn validate(&self) -> HarnessResult<()> {
        let base = parse_http_url(&self.base_url)?;
        self.web_server.validate()?;
        let readiness = parse_http_url(&self.web_server.url)?;
        if base != readiness {
            return Err(HarnessError::ReadinessUrlMismatch {
                base_url: self.base_url.clone(),
                readiness_url: self.web_server.url.clone(),
            });
        }
        Ok(())
    }
}

/// Wire shape of [`HarnessConfig`]: every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct HarnessDoc {
    test_dir: Option<PathBuf>,
    timeout_ms: Option<u64>,
    retries: Option<u32>,
    base_url: Option<String>,
    trace: Option<TracePolicy>,
    web_server: Option<WebServerDoc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WebServerDoc {
    command: Option<ServerCommand>,
    url: Option<String>,
    reuse_existing_server: Option<bool>,
    startup_timeout_ms: Option<u64>,
    env: Option<Env>,
}

impl From<HarnessDoc> for HarnessConfig {
    fn from(doc: HarnessDoc) -> Self {
        let mut cfg = HarnessConfig::new(doc.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.into()));
        if let Some(test_dir) = doc.test_dir {
            cfg.test_dir = test_dir;
        }
        if let Some(timeout_ms) = doc.timeout_ms {
            cfg.timeout_ms = timeout_ms;
        }
        if let Some(retries) = doc.retries {
            cfg.retries = retries;
        }
        if let Some(trace) = doc.trace {
            cfg.trace = trace;
        }

        let ws = doc.web_server.unwrap_or_default();
        let server = &mut cfg.web_server;
        if let Some(command) = ws.command {
            server.command = command;
        }
        if let Some(url) = ws.url {
            server.url = url;
        }
        if let Some(reuse) = ws.reuse_existing_server {
            server.reuse_existing_server = reuse;
        }
        if let Some(timeout) = ws.startup_timeout_ms {
            server.startup_timeout_ms = timeout;
        }
        if let Some(env) = ws.env {
            server.env = env;
        }
        cfg
    }
}

/// Parse `raw` and require an `http` or `https` scheme with a host.
pub(crate) fn parse_http_url(raw: &str) -> HarnessResult<Url> {
    let invalid = |reason: String| HarnessError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{other}'"))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".into()));
    }
    Ok(url)
}
