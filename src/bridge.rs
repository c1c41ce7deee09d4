// Statline - A StatsD client with a metrics-over-logging bridge
//
// Copyright 2026 Statline Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::client::{Counted, CountedExt, Gauged, Histogrammed, Setted, StatsdClient, Timed};
use crate::decode::Decoder;
use crate::types::{DecodeError, MetricDescriptor, MetricError, MetricKind, MetricResult};
use std::io::{self, Write};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Bytes that must appear in a record for it to be decoded at all.
const MARKER: &[u8] = b"\"statsd\":";

/// Log sink that turns metric payloads embedded in log records into
/// StatsD lines.
///
/// The bridge implements `io::Write`, so it can be handed to anything that
/// writes serialized records, such as the `tracing-subscriber` JSON
/// formatter through `.with_writer(move || bridge.clone())`. That is how
/// the [`Logger`](crate::Logger) uses it.
/// Records without a `"statsd":` key are accepted and ignored. The others
/// are decoded with the configured [`Decoder`] and sent through the client.
///
/// Gauges, counters, increments, decrements and timings are sent at the
/// client's default sample rate. Sets, gauge deltas and histograms are
/// always sent. A payload whose `type` isn't a known [`MetricKind`] is
/// skipped and the record is still reported as written. Any other decode
/// failure is an error.
///
/// Clones share the client and the decoder, so swapping the decoder on one
/// clone affects all of them.
///
/// # Example
///
/// ```
/// use std::io::Write;
/// use std::sync::Arc;
/// use statline::{decode, SpyMetricSink, StatsdBridge, StatsdClient};
///
/// let (rx, sink) = SpyMetricSink::new();
/// let client = StatsdClient::builder("127.0.0.1:8125").build().unwrap();
/// client.open_sink(sink);
///
/// let mut bridge = StatsdBridge::with_decoder(Arc::new(client), decode::direct());
/// bridge.write_all(br#"{"msg":"hi","statsd":{"type":"set","name":"users","value":7}}"#).unwrap();
///
/// assert_eq!(b"users:7|s".to_vec(), rx.recv().unwrap());
/// ```
#[derive(Clone)]
pub struct StatsdBridge {
    client: Arc<StatsdClient>,
    decoder: Arc<RwLock<Option<Decoder>>>,
}

impl StatsdBridge {
    /// Create a bridge with no decoder. Records carrying a metric payload
    /// are rejected until one is set.
    pub fn new(client: Arc<StatsdClient>) -> Self {
        StatsdBridge {
            client,
            decoder: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_decoder(client: Arc<StatsdClient>, decoder: Decoder) -> Self {
        let bridge = Self::new(client);
        bridge.set_decoder(decoder);
        bridge
    }

    pub fn set_decoder(&self, decoder: Decoder) {
        *self.decoder.write().unwrap_or_else(PoisonError::into_inner) = Some(decoder);
    }

    pub fn clear_decoder(&self) {
        *self.decoder.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn client(&self) -> &Arc<StatsdClient> {
        &self.client
    }

    /// Handle one serialized record, returning `buf.len()` when it carried
    /// no metric or its metric was handed to the client.
    pub fn emit(&self, buf: &[u8]) -> MetricResult<usize> {
        if !contains_marker(buf) {
            return Ok(buf.len());
        }

        let decoder = self
            .decoder
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(MetricError::NoDecoder)?;

        let descriptor = match decoder(buf) {
            Ok(descriptor) => descriptor,
            Err(DecodeError::UnknownKind(kind)) => {
                debug!(kind = %kind, "ignoring embedded metric of unknown type");
                return Ok(buf.len());
            }
            Err(e) => return Err(e.into()),
        };

        self.dispatch(&descriptor)?;
        Ok(buf.len())
    }

    fn dispatch(&self, desc: &MetricDescriptor) -> MetricResult<usize> {
        let client = &self.client;
        let rate = if desc.kind.is_sampled() {
            client.default_sample_rate()
        } else {
            1.0
        };

        match desc.kind {
            MetricKind::Gauge => client.gauge_sampled(&desc.name, desc.value, &desc.tags, rate),
            MetricKind::GaugeDelta => client.gauge_delta(&desc.name, desc.value, &desc.tags),
            MetricKind::Counter => client.counter_sampled(&desc.name, desc.value, &desc.tags, rate),
            MetricKind::Increment => client.increment_sampled(&desc.name, desc.value, &desc.tags, rate),
            MetricKind::Decrement => client.decrement_sampled(&desc.name, desc.value, &desc.tags, rate),
            MetricKind::Timing => client.timing_sampled(&desc.name, desc.value, &desc.tags, rate),
            MetricKind::Set => client.set(&desc.name, desc.value, &desc.tags),
            MetricKind::Histogram => client.histogram(&desc.name, desc.value, &desc.tags),
        }
    }
}

impl std::fmt::Debug for StatsdBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let has_decoder = self.decoder.read().unwrap_or_else(PoisonError::into_inner).is_some();
        f.debug_struct("StatsdBridge")
            .field("client", &self.client)
            .field("has_decoder", &has_decoder)
            .finish()
    }
}

impl Write for &StatsdBridge {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.emit(buf).map_err(|e| {
            debug!(error = %e, "failed to forward embedded metric");
            io::Error::from(e)
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Write for StatsdBridge {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn contains_marker(buf: &[u8]) -> bool {
    buf.windows(MARKER.len()).any(|window| window == MARKER)
}
