use std::fmt;

use serde::{Deserialize, Serialize};
use wharf_model::Env;

use crate::{DEFAULT_BASE_URL, HarnessError, HarnessResult, config::parse_http_url};

/// How long the harness waits for the server to answer, by default.
pub const DEFAULT_STARTUP_TIMEOUT_MS: u64 = 60_000;

/// Program and arguments used to launch the local server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ServerCommand {
    pub fn new<P, I, A>(program: P, args: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a shell-like line on whitespace. No quoting support.
    ///
    /// ```
    /// use wharf_e2e::ServerCommand;
    ///
    /// let cmd = ServerCommand::from_line("npm  run preview");
    /// assert_eq!(cmd.program, "npm");
    /// assert_eq!(cmd.args, ["run", "preview"]);
    /// assert_eq!(cmd.to_string(), "npm run preview");
    /// ```
    pub fn from_line(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let program = words.next().unwrap_or_default();
        Self::new(program, words)
    }

    /// `npm run dev` bound to `127.0.0.1:5173`.
    pub fn dev_server() -> Self {
        Self::from_line("npm run dev -- --host 127.0.0.1 --port 5173")
    }

    pub fn is_empty(&self) -> bool {
        self.program.trim().is_empty()
    }
}

impl Default for ServerCommand {
    fn default() -> Self {
        Self::dev_server()
    }
}

impl fmt::Display for ServerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Local server the harness starts for the duration of a test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebServerConfig {
    pub command: ServerCommand,
    /// Readiness URL, polled until it answers.
    pub url: String,
    /// Use a server that already answers on `url` instead of spawning one.
    pub reuse_existing_server: bool,
    pub startup_timeout_ms: u64,
    /// Extra environment for the spawned process.
    pub env: Env,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self::for_url(DEFAULT_BASE_URL)
    }
}

impl WebServerConfig {
    /// Dev server config whose readiness URL is `url`.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            command: ServerCommand::dev_server(),
            url: url.into(),
            reuse_existing_server: true,
            startup_timeout_ms: DEFAULT_STARTUP_TIMEOUT_MS,
            env: Env::new(),
        }
    }

    pub fn validate(&self) -> HarnessResult<()> {
        if self.command.is_empty() {
            return Err(HarnessError::EmptyCommand);
        }
        parse_http_url(&self.url)?;
        Ok(())
    }
}
