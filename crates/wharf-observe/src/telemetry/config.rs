use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::telemetry::{TelemetryError, TelemetryResult};

/// Sample rate used when none is configured.
pub const DEFAULT_TRACES_SAMPLE_RATE: f64 = 0.1;

/// Environment variable holding the monitoring dsn.
pub const DSN_ENV: &str = "WHARF_MONITORING_DSN";
/// Environment variable holding the traces sample rate.
pub const SAMPLE_RATE_ENV: &str = "WHARF_TRACES_SAMPLE_RATE";
/// Environment variable selecting the [`RunMode`].
pub const RUN_MODE_ENV: &str = "WHARF_ENV";

/// Monitoring configuration.
///
/// A missing or blank `dsn` is the "telemetry disabled" signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TelemetryConfig {
    /// Destination identifier of the monitoring backend.
    pub dsn: Option<String>,
    /// Fraction of performance traces to record, in `[0, 1]`.
    pub traces_sample_rate: Option<f64>,
}

impl TelemetryConfig {
    /// Config with a dsn and the default sample rate.
    pub fn with_dsn(dsn: impl Into<String>) -> Self {
        Self {
            dsn: Some(dsn.into()),
            traces_sample_rate: None,
        }
    }

    /// The configured sample rate, or [`DEFAULT_TRACES_SAMPLE_RATE`].
    pub fn effective_sample_rate(&self) -> f64 {
        self.traces_sample_rate
            .unwrap_or(DEFAULT_TRACES_SAMPLE_RATE)
    }

    /// A present `traces_sample_rate` must be finite and within `[0, 1]`.
    ///
    /// A blank dsn is not an error: it disables telemetry like a missing one.
    pub fn validate(&self) -> TelemetryResult<()> {
        if let Some(rate) = self.traces_sample_rate {
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return Err(TelemetryError::InvalidSampleRate(rate.to_string()));
            }
        }
        Ok(())
    }

    /// Build the config from variables returned by `lookup`.
    ///
    /// An empty dsn counts as unset. A rate that does not parse as a number
    /// is an error rather than a silent fallback.
    pub fn from_lookup<F>(lookup: F) -> TelemetryResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dsn = lookup(DSN_ENV).filter(|v| !v.trim().is_empty());
        let traces_sample_rate = match lookup(SAMPLE_RATE_ENV) {
            Some(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<f64>()
                    .map_err(|_| TelemetryError::InvalidSampleRate(raw.clone()))?,
            ),
            _ => None,
        };
        Ok(Self {
            dsn,
            traces_sample_rate,
        })
    }

    /// Build the config from the process environment.
    pub fn from_env() -> TelemetryResult<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }
}

/// Execution environment of the process.
///
/// Telemetry never activates in [`RunMode::Development`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Development,
    #[default]
    Production,
}

impl RunMode {
    #[inline]
    pub fn is_development(&self) -> bool {
        matches!(self, RunMode::Development)
    }

    /// Reads [`RUN_MODE_ENV`] through `lookup`; unset means production.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(RUN_MODE_ENV)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }
}

/// Parsing never fails: anything that is not a development alias is production.
impl FromStr for RunMode {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(RunMode::Development),
            _ => Ok(RunMode::Production),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunMode::Development => "development",
            RunMode::Production => "production",
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn default_is_disabled_with_default_rate() {
        let cfg = TelemetryConfig::default();
        assert!(cfg.dsn.is_none());
        assert_eq!(cfg.effective_sample_rate(), 0.1);
    }

    #[test]
    fn deserializes_camel_case_and_partial_documents() {
        let cfg: TelemetryConfig =
            serde_json::from_str(r#"{"dsn": "https://key@mon.example/1", "tracesSampleRate": 0.5}"#)
                .unwrap();
        assert_eq!(cfg.dsn.as_deref(), Some("https://key@mon.example/1"));
        assert_eq!(cfg.effective_sample_rate(), 0.5);

        let empty: TelemetryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, TelemetryConfig::default());
    }

    #[test]
    fn validate_rejects_out_of_range_rates() {
        for rate in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let cfg = TelemetryConfig {
                dsn: Some("dsn".into()),
                traces_sample_rate: Some(rate),
            };
            assert!(
                matches!(cfg.validate(), Err(TelemetryError::InvalidSampleRate(_))),
                "rate {rate} should be rejected"
            );
        }
    }

    #[test]
    fn validate_accepts_bounds() {
        for rate in [0.0, 1.0] {
            let cfg = TelemetryConfig {
                dsn: Some("dsn".into()),
                traces_sample_rate: Some(rate),
            };
            assert!(cfg.validate().is_ok());
        }
    }

    #[test]
    fn validate_accepts_blank_dsn() {
        let cfg: TelemetryConfig = serde_json::from_str(r#"{"dsn": ""}"#).unwrap();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn from_lookup_reads_both_variables() {
        let cfg = TelemetryConfig::from_lookup(lookup(&[
            (DSN_ENV, "https://key@mon.example/1"),
            (SAMPLE_RATE_ENV, " 0.25 "),
        ]))
        .unwrap();

        assert_eq!(cfg.dsn.as_deref(), Some("https://key@mon.example/1"));
        assert_eq!(cfg.traces_sample_rate, Some(0.25));
    }

    #[test]
    fn from_lookup_treats_empty_dsn_as_unset() {
        let cfg = TelemetryConfig::from_lookup(lookup(&[(DSN_ENV, "")])).unwrap();
        assert!(cfg.dsn.is_none());
        assert!(cfg.traces_sample_rate.is_none());
    }

    #[test]
    fn from_lookup_rejects_unparsable_rate() {
        let res = TelemetryConfig::from_lookup(lookup(&[(SAMPLE_RATE_ENV, "lots")]));
        assert!(matches!(res, Err(TelemetryError::InvalidSampleRate(v)) if v == "lots"));
    }

    #[test]
    fn run_mode_aliases() {
        for v in ["development", "DEV", " local "] {
            assert_eq!(v.parse::<RunMode>().unwrap(), RunMode::Development, "{v}");
        }
        for v in ["production", "staging", ""] {
            assert_eq!(v.parse::<RunMode>().unwrap(), RunMode::Production, "{v}");
        }
    }

    #[test]
    fn run_mode_from_lookup_defaults_to_production() {
        assert_eq!(RunMode::from_lookup(lookup(&[])), RunMode::Production);
        assert_eq!(
            RunMode::from_lookup(lookup(&[(RUN_MODE_ENV, "dev")])),
            RunMode::Development
        );
    }

    #[test]
    fn run_mode_serde_and_display() {
        assert_eq!(RunMode::Development.to_string(), "development");
        assert_eq!(
            serde_json::to_string(&RunMode::Production).unwrap(),
            r#""production""#
        );
        let m: RunMode = serde_json::from_str(r#""development""#).unwrap();
        assert!(m.is_development());
    }
}
