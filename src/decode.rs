// Statline - A StatsD client with a metrics-over-logging bridge
//
// Copyright 2026 Statline Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Strategies for finding a [`MetricDescriptor`] inside a serialized log
//! record.
//!
//! Each logging backend lays out its records differently, so the bridge
//! doesn't assume a structure. It is given a [`Decoder`] that knows where
//! the `statsd` payload lives for the records it will see.

use crate::types::{DecodeError, MetricDescriptor, MetricKind};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Key under which the metric payload is stored.
pub const PAYLOAD_KEY: &str = "statsd";

/// Function pulling a metric descriptor out of one serialized record.
pub type Decoder = Arc<dyn Fn(&[u8]) -> Result<MetricDescriptor, DecodeError> + Send + Sync>;

/// Descriptor stored at the top-level `statsd` key.
///
/// ```
/// use statline::decode;
///
/// let decoder = decode::direct();
/// let desc = decoder(br#"{"statsd":{"type":"counter","name":"hits","value":1}}"#).unwrap();
/// assert_eq!("hits", desc.name);
/// ```
pub fn direct() -> Decoder {
    Arc::new(|buf: &[u8]| {
        let record = parse(buf)?;
        descriptor_at(&record, &[PAYLOAD_KEY])
    })
}

/// Descriptor stored at `<wrapper>.statsd`, for JSON loggers that keep
/// structured data under a wrapper object such as `meta`.
pub fn nested<S: Into<String>>(wrapper: S) -> Decoder {
    let wrapper = wrapper.into();
    Arc::new(move |buf: &[u8]| {
        let record = parse(buf)?;
        descriptor_at(&record, &[wrapper.as_str(), PAYLOAD_KEY])
    })
}

/// Descriptor written by the `tracing-subscriber` JSON formatter.
///
/// The payload is read from `fields.statsd`, or from a top-level `statsd`
/// key when events are flattened, as the [`Logger`](crate::Logger) writes
/// them. Fields recorded with `%` or as strings arrive as a string holding
/// JSON, which is decoded a second time.
pub fn tracing_fields() -> Decoder {
    Arc::new(|buf: &[u8]| {
        let record = parse(buf)?;
        match lookup(&record, &["fields", PAYLOAD_KEY]) {
            Some(value) => descriptor_from(value),
            None => descriptor_at(&record, &[PAYLOAD_KEY]),
        }
    })
}

fn parse(buf: &[u8]) -> Result<Value, DecodeError> {
    serde_json::from_slice(buf).map_err(DecodeError::Json)
}

fn lookup<'v>(record: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter().try_fold(record, |value, key| value.get(*key))
}

fn descriptor_at(record: &Value, path: &[&str]) -> Result<MetricDescriptor, DecodeError> {
    let value = lookup(record, path).ok_or_else(|| DecodeError::MissingPayload(path.join(".")))?;
    descriptor_from(value)
}

fn descriptor_from(value: &Value) -> Result<MetricDescriptor, DecodeError> {
    match value {
        Value::String(raw) => {
            let inner: Value = serde_json::from_str(raw).map_err(DecodeError::InvalidPayload)?;
            descriptor_from_object(&inner)
        }
        other => descriptor_from_object(other),
    }
}

fn descriptor_from_object(value: &Value) -> Result<MetricDescriptor, DecodeError> {
    if let Some(kind) = value.get("type").and_then(Value::as_str) {
        if MetricKind::from_name(kind).is_none() {
            return Err(DecodeError::UnknownKind(kind.to_owned()));
        }
    }

    MetricDescriptor::deserialize(value).map_err(DecodeError::InvalidPayload)
}
