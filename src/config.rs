// Statline - A StatsD client with a metrics-over-logging bridge
//
// Copyright 2026 Statline Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::types::{MetricError, MetricResult};
use crate::DEFAULT_PORT;
use serde::{Deserialize, Deserializer};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(1000);
const MAX_SAMPLE_RATE: u8 = 100;

/// Settings for a [`StatsdClient`](crate::StatsdClient).
///
/// Can be deserialized from any serde format using the keys `addr`,
/// `prefix`, `connect_timeout_ms` and `sample_rate`, or read from the
/// environment with [`ClientConfig::from_env`]. Missing keys take their
/// default value.
///
/// # Example
///
/// ```
/// use statline::ClientConfig;
///
/// let config: ClientConfig = serde_json::from_str(r#"{"prefix": "api.", "sample_rate": 25}"#).unwrap();
///
/// assert_eq!("127.0.0.1:8125", config.addr);
/// assert_eq!(0.25, config.default_sample_rate());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Collector address as `host:port`.
    pub addr: String,
    /// Prepended verbatim to every stat name.
    pub prefix: String,
    /// Timeout for TCP connects. Zero means block until connected.
    #[serde(rename = "connect_timeout_ms", deserialize_with = "deserialize_millis")]
    pub connect_timeout: Duration,
    /// Default sample rate in percent, used by the logging bridge.
    pub sample_rate: u8,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            addr: format!("127.0.0.1:{}", DEFAULT_PORT),
            prefix: String::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            sample_rate: MAX_SAMPLE_RATE,
        }
    }
}

impl ClientConfig {
    pub fn new<A, P>(addr: A, prefix: P, connect_timeout: Duration, sample_rate: u8) -> MetricResult<Self>
    where
        A: Into<String>,
        P: Into<String>,
    {
        let config = ClientConfig {
            addr: addr.into(),
            prefix: prefix.into(),
            connect_timeout,
            sample_rate,
        };

        config.validate()?;
        Ok(config)
    }

    /// Read `STATSD_ADDR`, `STATSD_PREFIX`, `STATSD_CONNECT_TIMEOUT_MS` and
    /// `STATSD_SAMPLE_RATE` from the process environment.
    ///
    /// Unset variables keep their default; values that don't parse are an
    /// `InvalidInput` error.
    pub fn from_env() -> MetricResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`ClientConfig::from_env`] but reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> MetricResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ClientConfig::default();

        if let Some(addr) = lookup("STATSD_ADDR") {
            config.addr = addr;
        }
        if let Some(prefix) = lookup("STATSD_PREFIX") {
            config.prefix = prefix;
        }
        if let Some(ms) = lookup("STATSD_CONNECT_TIMEOUT_MS") {
            config.connect_timeout = Duration::from_millis(parse_var(&ms, "STATSD_CONNECT_TIMEOUT_MS is not a number")?);
        }
        if let Some(rate) = lookup("STATSD_SAMPLE_RATE") {
            config.sample_rate = parse_var(&rate, "STATSD_SAMPLE_RATE is not a number between 0 and 100")?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MetricResult<()> {
        if self.sample_rate > MAX_SAMPLE_RATE {
            return Err(MetricError::InvalidInput("sample rate must be between 0 and 100"));
        }

        Ok(())
    }

    /// The percent sample rate as a fraction, `100` and above being `1.0`.
    pub fn default_sample_rate(&self) -> f32 {
        if self.sample_rate >= MAX_SAMPLE_RATE {
            1.0
        } else {
            f32::from(self.sample_rate) / 100.0
        }
    }
}

fn parse_var<T: FromStr>(raw: &str, msg: &'static str) -> MetricResult<T> {
    raw.trim().parse().map_err(|_| MetricError::InvalidInput(msg))
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::ClientConfig;
    use crate::types::ErrorKind;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!("127.0.0.1:8125", config.addr);
        assert_eq!("", config.prefix);
        assert_eq!(Duration::from_millis(1000), config.connect_timeout);
        assert_eq!(100, config.sample_rate);
        assert_eq!(1.0, config.default_sample_rate());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"addr": "metrics:9125", "connect_timeout_ms": 250}"#).unwrap();

        assert_eq!("metrics:9125", config.addr);
        assert_eq!(Duration::from_millis(250), config.connect_timeout);
        assert_eq!(100, config.sample_rate);
    }

    #[test]
    fn test_from_lookup() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("STATSD_ADDR", "10.0.0.5:8125"),
            ("STATSD_PREFIX", "svc."),
            ("STATSD_CONNECT_TIMEOUT_MS", "0"),
            ("STATSD_SAMPLE_RATE", " 10 "),
        ]))
        .unwrap();

        assert_eq!("10.0.0.5:8125", config.addr);
        assert_eq!("svc.", config.prefix);
        assert_eq!(Duration::ZERO, config.connect_timeout);
        assert_eq!(10, config.sample_rate);
        assert!((config.default_sample_rate() - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_from_lookup_unset_keeps_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(ClientConfig::default(), config);
    }

    #[test]
    fn test_from_lookup_invalid() {
        let err = ClientConfig::from_lookup(lookup(&[("STATSD_SAMPLE_RATE", "lots")])).unwrap_err();
        assert_eq!(ErrorKind::InvalidInput, err.kind());

        let err = ClientConfig::from_lookup(lookup(&[("STATSD_SAMPLE_RATE", "150")])).unwrap_err();
        assert_eq!(ErrorKind::InvalidInput, err.kind());

        let err = ClientConfig::from_lookup(lookup(&[("STATSD_CONNECT_TIMEOUT_MS", "-1")])).unwrap_err();
        assert_eq!(ErrorKind::InvalidInput, err.kind());
    }

    #[test]
    fn test_new_rejects_rate_over_100() {
        let err = ClientConfig::new("localhost:8125", "", Duration::ZERO, 101).unwrap_err();
        assert_eq!(ErrorKind::InvalidInput, err.kind());
    }

    #[test]
    fn test_zero_sample_rate() {
        let config = ClientConfig::new("localhost:8125", "", Duration::ZERO, 0).unwrap();
        assert_eq!(0.0, config.default_sample_rate());
    }
}
