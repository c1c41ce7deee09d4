// Statline - A StatsD client with a metrics-over-logging bridge
//
// Copyright 2026 Statline Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::io;

/// Key/value tags attached to a metric.
///
/// Ordered by key so that the encoded `|#k:v,...` suffix is the same
/// every time for the same set of tags. Keys and values are written
/// verbatim: `:`, `,` and `|` are not escaped, so they must not appear in
/// either.
pub type Tags = BTreeMap<String, String>;

/// Potential categories an error from this library falls into.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    NotConnected,
    Connect,
    InvalidInput,
    IoError,
    Decode,
    Configuration,
}

/// Error generated by this library, potentially wrapping another
/// type of error (exposed via the `Error` trait).
#[derive(Debug, thiserror::Error)]
pub enum MetricError {
    #[error("statsd client is not connected")]
    NotConnected,

    #[error("failed to connect to statsd at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    InvalidInput(&'static str),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to decode embedded metric: {0}")]
    Decode(#[from] DecodeError),

    #[error("no metric decoder configured")]
    NoDecoder,
}

impl MetricError {
    /// Return the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MetricError::NotConnected => ErrorKind::NotConnected,
            MetricError::Connect { .. } => ErrorKind::Connect,
            MetricError::InvalidInput(_) => ErrorKind::InvalidInput,
            MetricError::Io(_) => ErrorKind::IoError,
            MetricError::Decode(_) => ErrorKind::Decode,
            MetricError::NoDecoder => ErrorKind::Configuration,
        }
    }
}

impl From<MetricError> for io::Error {
    fn from(err: MetricError) -> io::Error {
        match err {
            MetricError::Io(e) => e,
            MetricError::NotConnected => io::Error::new(io::ErrorKind::NotConnected, err),
            MetricError::Decode(_) => io::Error::new(io::ErrorKind::InvalidData, err),
            other => io::Error::new(io::ErrorKind::Other, other),
        }
    }
}

/// Failure to pull a metric descriptor out of a serialized log record.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("record is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("no metric payload at `{0}`")]
    MissingPayload(String),

    #[error("malformed metric payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),

    #[error("unknown metric type `{0}`")]
    UnknownKind(String),
}

pub type MetricResult<T> = Result<T, MetricError>;

/// The kind of metric carried by a [`MetricDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Gauge,
    GaugeDelta,
    Counter,
    Increment,
    Decrement,
    Timing,
    Set,
    Histogram,
}

impl MetricKind {
    const ALL: [MetricKind; 8] = [
        MetricKind::Gauge,
        MetricKind::GaugeDelta,
        MetricKind::Counter,
        MetricKind::Increment,
        MetricKind::Decrement,
        MetricKind::Timing,
        MetricKind::Set,
        MetricKind::Histogram,
    ];

    /// Look up a kind by the name used in serialized descriptors.
    pub fn from_name(name: &str) -> Option<MetricKind> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::GaugeDelta => "gauge_delta",
            MetricKind::Counter => "counter",
            MetricKind::Increment => "increment",
            MetricKind::Decrement => "decrement",
            MetricKind::Timing => "timing",
            MetricKind::Set => "set",
            MetricKind::Histogram => "histogram",
        }
    }

    /// Whether metrics of this kind pick up a client's default sample
    /// rate when they arrive through the logging bridge.
    pub fn is_sampled(&self) -> bool {
        !matches!(self, MetricKind::Set | MetricKind::GaugeDelta | MetricKind::Histogram)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Self-describing metric that can be embedded in a structured log record
/// and later re-emitted by [`StatsdBridge`](crate::StatsdBridge).
///
/// Serialized as `{"type": "counter", "name": "...", "value": 1, "tags": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    #[serde(rename = "type")]
    pub kind: MetricKind,
    pub name: String,
    #[serde(deserialize_with = "deserialize_value")]
    pub value: i64,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Tags,
}

impl MetricDescriptor {
    pub fn new<S: Into<String>>(kind: MetricKind, name: S, value: i64, tags: Tags) -> Self {
        MetricDescriptor {
            kind,
            name: name.into(),
            value,
            tags,
        }
    }

    /// JSON form of this descriptor, for embedding in a log record.
    pub fn to_value(&self) -> Value {
        json!({
            "type": self.kind,
            "name": self.name,
            "value": self.value,
            "tags": self.tags,
        })
    }
}

impl fmt::Display for MetricDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_value().fmt(f)
    }
}

fn deserialize_value<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    // floats are truncated toward zero
    Ok(match Number::deserialize(deserializer)? {
        Number::Int(v) => v,
        Number::Float(v) => v as i64,
    })
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Tags, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Tags>::deserialize(deserializer)?.unwrap_or_default())
}
