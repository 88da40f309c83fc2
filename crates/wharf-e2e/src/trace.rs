use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::HarnessError;

/// When the harness records a trace of a test attempt.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TracePolicy {
    Off,
    On,
    /// Record every attempt, keep only the failing ones.
    RetainOnFailure,
    /// Record only the first retry of a failing test.
    #[default]
    OnFirstRetry,
}

impl TracePolicy {
    /// Whether the attempt numbered `retry` (0 = initial run) keeps a trace.
    ///
    /// `failed` is the attempt's outcome; only `RetainOnFailure` looks at it.
    ///
    /// ```
    /// use wharf_e2e::TracePolicy;
    ///
    /// let policy: TracePolicy = "on-first-retry".parse().unwrap();
    /// assert!(!policy.captures(0, true));
    /// assert!(policy.captures(1, false));
    /// ```
    pub fn captures(&self, retry: u32, failed: bool) -> bool {
        match self {
            TracePolicy::Off => false,
            TracePolicy::On => true,
            TracePolicy::RetainOnFailure => failed,
            TracePolicy::OnFirstRetry => retry == 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TracePolicy::Off => "off",
            TracePolicy::On => "on",
            TracePolicy::RetainOnFailure => "retain-on-failure",
            TracePolicy::OnFirstRetry => "on-first-retry",
        }
    }
}

impl FromStr for TracePolicy {
    type Err = HarnessError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(TracePolicy::Off),
            "on" => Ok(TracePolicy::On),
            "retain-on-failure" => Ok(TracePolicy::RetainOnFailure),
            "on-first-retry" => Ok(TracePolicy::OnFirstRetry),
            _ => Err(HarnessError::InvalidTracePolicy(s.to_string())),
        }
    }
}

impl TryFrom<String> for TracePolicy {
    type Error = HarnessError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TracePolicy> for String {
    fn from(p: TracePolicy) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for TracePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
