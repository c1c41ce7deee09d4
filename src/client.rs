// Statline - A StatsD client with a metrics-over-logging bridge
//
// Copyright 2026 Statline Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::builder::{MetricFormatter, SampleRate};
use crate::config::ClientConfig;
use crate::sampler::Sampler;
use crate::sinks::{Framing, MetricSink, SinkStats, TcpMetricSink, UdpMetricSink};
use crate::types::{MetricDescriptor, MetricError, MetricKind, MetricResult, Tags};
use lockfree_object_pool::LinearObjectPool;
use serde_json::Value;
use std::fmt;
use std::io;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, trace};

/// Trait for incrementing and decrementing counters.
///
/// Counters are simple values incremented or decremented by a client. The
/// rates at which these events occur or average values will be determined
/// by the server receiving them. Examples of counter uses include number
/// of logins to a system or requests received.
///
/// Note that tags are a [Datadog](https://docs.datadoghq.com/developers/dogstatsd/)
/// extension to StatsD and may not be supported by your server.
pub trait Counted {
    /// Increment or decrement the counter by the given amount.
    fn counter(&self, stat: &str, count: i64, tags: &Tags) -> MetricResult<usize> {
        self.counter_sampled(stat, count, tags, 1.0)
    }

    /// Increment or decrement the counter by the given amount, only sending
    /// it with probability `rate`. The rate is written on the line so the
    /// server can scale the count back up.
    fn counter_sampled(&self, stat: &str, count: i64, tags: &Tags, rate: f32) -> MetricResult<usize>;
}

/// Trait for convenience methods for counters.
pub trait CountedExt: Counted {
    /// Increment the counter by the given amount.
    fn increment(&self, stat: &str, count: i64, tags: &Tags) -> MetricResult<usize> {
        self.counter(stat, count, tags)
    }

    /// Increment the counter by the given amount at the given sample rate.
    fn increment_sampled(&self, stat: &str, count: i64, tags: &Tags, rate: f32) -> MetricResult<usize> {
        self.counter_sampled(stat, count, tags, rate)
    }

    /// Send the negated count, so `decrement(stat, 3)` goes over the wire as `stat:-3|c`.
    ///
    /// `i64::MIN` has no positive counterpart and is rejected as invalid input.
    fn decrement(&self, stat: &str, count: i64, tags: &Tags) -> MetricResult<usize> {
        self.counter(stat, negate(count)?, tags)
    }

    /// Decrement the counter by the given amount at the given sample rate.
    fn decrement_sampled(&self, stat: &str, count: i64, tags: &Tags, rate: f32) -> MetricResult<usize> {
        self.counter_sampled(stat, negate(count)?, tags, rate)
    }
}

fn negate(count: i64) -> MetricResult<i64> {
    count
        .checked_neg()
        .ok_or(MetricError::InvalidInput("decrement amount can't be negated"))
}

/// Trait for recording timings in milliseconds.
///
/// Timings are a positive number of milliseconds between a start and end
/// time. Examples include time taken to render a web page or time taken
/// for a database call to return.
pub trait Timed {
    /// Record a timing in milliseconds.
    fn timing(&self, stat: &str, millis: i64, tags: &Tags) -> MetricResult<usize> {
        self.timing_sampled(stat, millis, tags, 1.0)
    }

    /// Record a timing in milliseconds at the given sample rate.
    fn timing_sampled(&self, stat: &str, millis: i64, tags: &Tags, rate: f32) -> MetricResult<usize>;
}

/// Trait for recording gauge values.
///
/// Gauge values are an instantaneous measurement of a value determined
/// by the client. They do not change unless changed by the client. Examples
/// include things like load average or how many connections are active.
/// A gauge can also be moved relative to its current value with
/// [`Gauged::gauge_delta`].
pub trait Gauged {
    /// Record a gauge value.
    fn gauge(&self, stat: &str, value: i64, tags: &Tags) -> MetricResult<usize> {
        self.gauge_sampled(stat, value, tags, 1.0)
    }

    /// Record a gauge value at the given sample rate.
    fn gauge_sampled(&self, stat: &str, value: i64, tags: &Tags, rate: f32) -> MetricResult<usize>;

    /// Move the gauge by `delta`, written as `+N` or `-N`. Never sampled.
    fn gauge_delta(&self, stat: &str, delta: i64, tags: &Tags) -> MetricResult<usize>;
}

/// Trait for recording histogram values.
///
/// Histogram values are positive values that can represent anything, whose
/// statistical distribution is calculated by the server.
pub trait Histogrammed {
    /// Record a single histogram value. Never sampled.
    fn histogram(&self, stat: &str, value: i64, tags: &Tags) -> MetricResult<usize>;
}

/// Trait for recording set values.
///
/// Sets count the number of unique elements in a group. You can use them to,
/// for example, count the unique visitors to your site.
pub trait Setted {
    /// Record a single set value. Never sampled.
    fn set(&self, stat: &str, value: i64, tags: &Tags) -> MetricResult<usize>;
}

/// Trait that encompasses all other traits for sending metrics.
///
/// If you wish to use `StatsdClient` with a generic type or place a
/// `StatsdClient` instance behind a pointer (such as a `Box`) this will allow
/// you to reference all the implemented methods for recording metrics, while
/// using a single trait. An example of this is shown below.
///
/// ```
/// use statline::{MetricClient, NopMetricSink, StatsdClient, Tags};
///
/// let client = StatsdClient::builder("localhost:8125").with_prefix("prefix.").build().unwrap();
/// client.open_sink(NopMetricSink);
/// let client: Box<dyn MetricClient> = Box::new(client);
/// let tags = Tags::new();
///
/// client.counter("some.counter", 1, &tags).unwrap();
/// client.increment("some.counter", 1, &tags).unwrap();
/// client.decrement("some.counter", 1, &tags).unwrap();
/// client.timing("some.timer", 42, &tags).unwrap();
/// client.gauge("some.gauge", 8, &tags).unwrap();
/// client.gauge_delta("some.gauge", -2, &tags).unwrap();
/// client.histogram("some.histogram", 4, &tags).unwrap();
/// client.set("some.set", 5, &tags).unwrap();
/// ```
pub trait MetricClient: Counted + CountedExt + Timed + Gauged + Histogrammed + Setted {}

/// Builder for creating and customizing `StatsdClient` instances.
///
/// Only the collector address is required. The client is created without
/// a connection, call one of the `open_*` methods before sending.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use statline::StatsdClient;
///
/// let client = StatsdClient::builder("127.0.0.1:8125")
///     .with_prefix("api.")
///     .with_connect_timeout(Duration::from_millis(250))
///     .with_sample_rate(50)
///     .build()
///     .unwrap();
///
/// assert!(!client.is_connected());
/// assert_eq!(0.5, client.default_sample_rate());
/// ```
pub struct StatsdClientBuilder {
    config: ClientConfig,
    sampler: Option<Sampler>,
}

impl StatsdClientBuilder {
    fn new<A: Into<String>>(addr: A) -> Self {
        StatsdClientBuilder {
            config: ClientConfig {
                addr: addr.into(),
                ..ClientConfig::default()
            },
            sampler: None,
        }
    }

    /// Prefix prepended, as is, to every stat name.
    pub fn with_prefix<P: Into<String>>(mut self, prefix: P) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    /// Timeout for TCP connects. Zero blocks until connected.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Default sample rate in percent, applied by the logging bridge.
    pub fn with_sample_rate(mut self, percent: u8) -> Self {
        self.config.sample_rate = percent;
        self
    }

    /// Use a specific sampler instead of one seeded from OS entropy.
    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Construct a new `StatsdClient`, failing if the settings are invalid.
    pub fn build(self) -> MetricResult<StatsdClient> {
        self.config.validate()?;

        Ok(StatsdClient {
            config: self.config,
            sink: RwLock::new(None),
            sampler: self.sampler.unwrap_or_default(),
            buffers: LinearObjectPool::new(String::new, String::clear),
        })
    }
}

impl fmt::Debug for StatsdClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsdClientBuilder")
            .field("config", &self.config)
            .field("sampler", &self.sampler)
            .finish()
    }
}

type BoxedSink = Box<dyn MetricSink + Send + Sync>;

/// Client for StatsD that implements various traits to record metrics.
///
/// The client holds at most one connection at a time, opened with
/// [`StatsdClient::open_udp`], [`StatsdClient::open_tcp`] or
/// [`StatsdClient::open_sink`]. Sending while no connection is open fails
/// with [`MetricError::NotConnected`] and performs no I/O.
///
/// Metrics that lose the sampling draw are not sent and report `Ok(0)`.
///
/// The client is `Send + Sync` and is meant to be shared between threads
/// with an `Arc`. Lines on a TCP connection are written whole, one at a time.
///
/// # Example
///
/// ```no_run
/// use statline::prelude::*;
/// use statline::{StatsdClient, Tags};
///
/// let client = StatsdClient::builder("metrics.example.com:8125")
///     .with_prefix("my.app.")
///     .build()
///     .unwrap();
/// client.open_udp().unwrap();
///
/// let mut tags = Tags::new();
/// tags.insert("region".to_owned(), "us-east".to_owned());
///
/// client.increment("requests", 1, &tags).unwrap();
/// client.timing("request.latency", 42, &tags).unwrap();
/// ```
pub struct StatsdClient {
    config: ClientConfig,
    sink: RwLock<Option<BoxedSink>>,
    sampler: Sampler,
    buffers: LinearObjectPool<String>,
}

impl StatsdClient {
    /// Create a client for the collector at `addr`. `sample_rate` is the
    /// default rate in percent used by the logging bridge.
    pub fn new<A, P>(addr: A, prefix: P, connect_timeout: Duration, sample_rate: u8) -> MetricResult<Self>
    where
        A: Into<String>,
        P: Into<String>,
    {
        Self::builder(addr)
            .with_prefix(prefix)
            .with_connect_timeout(connect_timeout)
            .with_sample_rate(sample_rate)
            .build()
    }

    /// Create a new builder for a client sending to `addr`.
    pub fn builder<A: Into<String>>(addr: A) -> StatsdClientBuilder {
        StatsdClientBuilder::new(addr)
    }

    pub fn from_config(config: ClientConfig) -> MetricResult<Self> {
        StatsdClientBuilder { config, sampler: None }.build()
    }

    /// Open a UDP connection to the configured address, replacing and
    /// closing any existing connection.
    pub fn open_udp(&self) -> MetricResult<()> {
        let sink = UdpMetricSink::connect(self.config.addr.as_str()).map_err(|e| self.connect_error(e))?;
        debug!(addr = %sink.peer_addr(), "opened udp connection to statsd");
        self.open_sink(sink);
        Ok(())
    }

    /// Open a TCP connection to the configured address, honoring the
    /// connect timeout, replacing and closing any existing connection.
    pub fn open_tcp(&self) -> MetricResult<()> {
        let sink = TcpMetricSink::connect(self.config.addr.as_str(), self.config.connect_timeout)
            .map_err(|e| self.connect_error(e))?;
        debug!(addr = %sink.peer_addr(), "opened tcp connection to statsd");
        self.open_sink(sink);
        Ok(())
    }

    /// Install an arbitrary sink as this client's connection.
    pub fn open_sink<T>(&self, sink: T)
    where
        T: MetricSink + Send + Sync + 'static,
    {
        let previous = self.write_slot().replace(Box::new(sink));

        if let Some(old) = previous {
            if let Err(e) = old.close() {
                debug!(error = %e, "failed to close replaced statsd connection");
            }
        }
    }

    /// Close the current connection. Closing a client that isn't connected
    /// is not an error.
    pub fn close(&self) -> MetricResult<()> {
        match self.write_slot().take() {
            Some(sink) => {
                debug!(addr = %self.config.addr, "closing statsd connection");
                Ok(sink.close()?)
            }
            None => Ok(()),
        }
    }

    pub fn flush(&self) -> MetricResult<()> {
        match self.read_slot().as_ref() {
            Some(sink) => Ok(sink.flush()?),
            None => Ok(()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.read_slot().is_some()
    }

    /// I/O telemetry of the current connection, zeros when not connected.
    pub fn stats(&self) -> SinkStats {
        self.read_slot().as_ref().map(|sink| sink.stats()).unwrap_or_default()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn default_sample_rate(&self) -> f32 {
        self.config.default_sample_rate()
    }

    /// Send a line exactly as given. On a stream connection a trailing
    /// newline is added if missing.
    pub fn raw(&self, line: &str) -> MetricResult<usize> {
        let slot = self.read_slot();
        let sink = slot.as_ref().ok_or(MetricError::NotConnected)?;

        if sink.framing() == Framing::Stream && !line.ends_with('\n') {
            let mut buf = self.buffers.pull();
            buf.push_str(line);
            buf.push('\n');
            return Ok(sink.emit(&buf)?);
        }

        Ok(sink.emit(line)?)
    }

    /// Build the JSON payload for embedding a metric in a log record, to be
    /// picked up later by a [`StatsdBridge`](crate::StatsdBridge).
    ///
    /// ```
    /// use statline::{MetricKind, StatsdClient, Tags};
    ///
    /// let client = StatsdClient::builder("127.0.0.1:8125").build().unwrap();
    /// let field = client.field(MetricKind::Counter, "logins", 1, &Tags::new());
    ///
    /// assert_eq!("counter", field["type"]);
    /// assert_eq!(1, field["value"]);
    /// ```
    pub fn field(&self, kind: MetricKind, name: &str, value: i64, tags: &Tags) -> Value {
        MetricDescriptor::new(kind, name, value, tags.clone()).to_value()
    }

    fn send(&self, mut fmt: MetricFormatter<'_>, rate: f32) -> MetricResult<usize> {
        let slot = self.read_slot();
        let sink = slot.as_ref().ok_or(MetricError::NotConnected)?;
        let rate = SampleRate::try_from(rate)?;

        if !self.sampler.should_send(rate.value()) {
            trace!(rate = rate.value(), "metric dropped by sampler");
            return Ok(0);
        }

        fmt.with_sample_rate(rate).with_framing(sink.framing());

        let mut line = self.buffers.pull();
        fmt.write_to(&mut line);
        trace!(line = %line.trim_end(), "sending metric");

        Ok(sink.emit(&line)?)
    }

    fn connect_error(&self, source: io::Error) -> MetricError {
        debug!(addr = %self.config.addr, error = %source, "failed to connect to statsd");
        MetricError::Connect {
            addr: self.config.addr.clone(),
            source,
        }
    }

    fn read_slot(&self) -> RwLockReadGuard<'_, Option<BoxedSink>> {
        self.sink.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Option<BoxedSink>> {
        self.sink.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for StatsdClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StatsdClient {{ config: {:?}, connected: {}, sampler: {:?}, buffers: ... }}",
            self.config,
            self.is_connected(),
            self.sampler,
        )
    }
}

impl Counted for StatsdClient {
    fn counter_sampled(&self, stat: &str, count: i64, tags: &Tags, rate: f32) -> MetricResult<usize> {
        let mut fmt = MetricFormatter::counter(&self.config.prefix, stat, count);
        fmt.with_tags(tags);
        self.send(fmt, rate)
    }
}

impl CountedExt for StatsdClient {}

impl Timed for StatsdClient {
    fn timing_sampled(&self, stat: &str, millis: i64, tags: &Tags, rate: f32) -> MetricResult<usize> {
        let mut fmt = MetricFormatter::timer(&self.config.prefix, stat, millis);
        fmt.with_tags(tags);
        self.send(fmt, rate)
    }
}

impl Gauged for StatsdClient {
    fn gauge_sampled(&self, stat: &str, value: i64, tags: &Tags, rate: f32) -> MetricResult<usize> {
        let mut fmt = MetricFormatter::gauge(&self.config.prefix, stat, value);
        fmt.with_tags(tags);
        self.send(fmt, rate)
    }

    fn gauge_delta(&self, stat: &str, delta: i64, tags: &Tags) -> MetricResult<usize> {
        let mut fmt = MetricFormatter::gauge_delta(&self.config.prefix, stat, delta);
        fmt.with_tags(tags);
        self.send(fmt, 1.0)
    }
}

impl Histogrammed for StatsdClient {
    fn histogram(&self, stat: &str, value: i64, tags: &Tags) -> MetricResult<usize> {
        let mut fmt = MetricFormatter::histogram(&self.config.prefix, stat, value);
        fmt.with_tags(tags);
        self.send(fmt, 1.0)
    }
}

impl Setted for StatsdClient {
    fn set(&self, stat: &str, value: i64, tags: &Tags) -> MetricResult<usize> {
        let mut fmt = MetricFormatter::set(&self.config.prefix, stat, value);
        fmt.with_tags(tags);
        self.send(fmt, 1.0)
    }
}

impl MetricClient for StatsdClient {}

#[cfg(test)]
mod tests {
    use super::{Counted, CountedExt, Gauged, Histogrammed, MetricClient, Setted, StatsdClient, Timed};
    use crate::sampler::Sampler;
    use crate::sinks::{MetricSink, NopMetricSink, SpyMetricSink};
    use crate::types::{ErrorKind, MetricKind, Tags};
    use crossbeam_channel::Receiver;
    use rand::rngs::mock::StepRng;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn spy_client(prefix: &str) -> (Receiver<Vec<u8>>, StatsdClient) {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::builder("127.0.0.1:8125").with_prefix(prefix).build().unwrap();
        client.open_sink(sink);
        (rx, client)
    }

    fn recv(rx: &Receiver<Vec<u8>>) -> String {
        String::from_utf8(rx.try_recv().unwrap()).unwrap()
    }

    #[derive(Clone, Default)]
    struct CloseCountingSink {
        closed: Arc<AtomicUsize>,
    }

    impl MetricSink for CloseCountingSink {
        fn emit(&self, metric: &str) -> io::Result<usize> {
            Ok(metric.len())
        }

        fn close(&self) -> io::Result<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_statsd_client_every_metric_type() {
        let (rx, client) = spy_client("test_");
        let t = tags(&[("tag1", "1")]);

        client.gauge("foo", 1, &t).unwrap();
        client.gauge_delta("foo", -4, &t).unwrap();
        client.gauge_delta("foo", 4, &t).unwrap();
        client.counter("hits", 2, &t).unwrap();
        client.increment("hits", 1, &t).unwrap();
        client.decrement("hits", 3, &t).unwrap();
        client.timing("latency", 120, &t).unwrap();
        client.histogram("size", 512, &t).unwrap();
        client.set("users", 42, &t).unwrap();

        assert_eq!("test_foo:1|g|#tag1:1", recv(&rx));
        assert_eq!("test_foo:-4|g|#tag1:1", recv(&rx));
        assert_eq!("test_foo:+4|g|#tag1:1", recv(&rx));
        assert_eq!("test_hits:2|c|#tag1:1", recv(&rx));
        assert_eq!("test_hits:1|c|#tag1:1", recv(&rx));
        assert_eq!("test_hits:-3|c|#tag1:1", recv(&rx));
        assert_eq!("test_latency:120|ms|#tag1:1", recv(&rx));
        assert_eq!("test_size:512|h|#tag1:1", recv(&rx));
        assert_eq!("test_users:42|s|#tag1:1", recv(&rx));
    }

    #[test]
    fn test_statsd_client_decrement_matches_negative_counter() {
        let (rx, client) = spy_client("");
        let t = Tags::new();

        client.decrement("hits", 3, &t).unwrap();
        client.counter("hits", -3, &t).unwrap();
        assert_eq!(recv(&rx), recv(&rx));

        client.decrement("hits", i64::MAX, &t).unwrap();
        assert_eq!(format!("hits:-{}|c", i64::MAX), recv(&rx));
    }

    #[test]
    fn test_statsd_client_decrement_min_is_rejected() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::builder("127.0.0.1:8125").build().unwrap();
        client.open_sink(sink);

        let err = client.decrement("hits", i64::MIN, &Tags::new()).unwrap_err();
        assert_eq!(ErrorKind::InvalidInput, err.kind());

        let err = client.decrement_sampled("hits", i64::MIN, &Tags::new(), 0.5).unwrap_err();
        assert_eq!(ErrorKind::InvalidInput, err.kind());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_statsd_client_stream_framing() {
        let (rx, sink) = SpyMetricSink::stream();
        let client = StatsdClient::builder("127.0.0.1:8125").with_prefix("test_").build().unwrap();
        client.open_sink(sink);

        client.gauge("foo", 1, &tags(&[("tag1", "1")])).unwrap();
        assert_eq!("test_foo:1|g|#tag1:1\n", recv(&rx));
    }

    #[test]
    fn test_statsd_client_sampled_accepted() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::builder("127.0.0.1:8125")
            .with_sampler(Sampler::from_rng(StepRng::new(0, 0)))
            .build()
            .unwrap();
        client.open_sink(sink);

        let sent = client.counter_sampled("hits", 1, &Tags::new(), 0.5).unwrap();
        assert_eq!("hits:1|c|@0.5".len(), sent);
        assert_eq!("hits:1|c|@0.5", recv(&rx));

        client.timing_sampled("latency", 9, &Tags::new(), 1.0 / 54.0).unwrap();
        assert_eq!("latency:9|ms|@0.018519", recv(&rx));
    }

    #[test]
    fn test_statsd_client_sampled_rejected() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::builder("127.0.0.1:8125")
            .with_sampler(Sampler::from_rng(StepRng::new(u64::MAX, 0)))
            .build()
            .unwrap();
        client.open_sink(sink);

        assert_eq!(0, client.gauge_sampled("foo", 1, &Tags::new(), 0.5).unwrap());
        assert_eq!(0, client.increment_sampled("foo", 1, &Tags::new(), 0.0).unwrap());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_statsd_client_invalid_sample_rate() {
        let (rx, client) = spy_client("");
        let err = client.counter_sampled("hits", 1, &Tags::new(), 1.5).unwrap_err();

        assert_eq!(ErrorKind::InvalidInput, err.kind());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_statsd_client_not_connected() {
        let client = StatsdClient::builder("127.0.0.1:8125").build().unwrap();
        let err = client.gauge("foo", 1, &Tags::new()).unwrap_err();
        assert_eq!(ErrorKind::NotConnected, err.kind());

        // not connected wins over an invalid rate
        let err = client.counter_sampled("foo", 1, &Tags::new(), 7.0).unwrap_err();
        assert_eq!(ErrorKind::NotConnected, err.kind());

        assert_eq!(ErrorKind::NotConnected, client.raw("foo:1|c").unwrap_err().kind());
    }

    #[test]
    fn test_statsd_client_raw() {
        let (rx, client) = spy_client("ignored.");
        client.raw("custom:1|c").unwrap();
        assert_eq!("custom:1|c", recv(&rx));

        let (rx, sink) = SpyMetricSink::stream();
        client.open_sink(sink);
        client.raw("custom:1|c").unwrap();
        client.raw("custom:2|c\n").unwrap();
        assert_eq!("custom:1|c\n", recv(&rx));
        assert_eq!("custom:2|c\n", recv(&rx));
    }

    #[test]
    fn test_statsd_client_close_is_idempotent() {
        let sink = CloseCountingSink::default();
        let closed = sink.closed.clone();
        let client = StatsdClient::builder("127.0.0.1:8125").build().unwrap();

        assert!(client.close().is_ok());
        client.open_sink(sink);
        assert!(client.is_connected());
        assert!(client.close().is_ok());
        assert!(client.close().is_ok());
        assert!(!client.is_connected());
        assert_eq!(1, closed.load(Ordering::SeqCst));

        let err = client.counter("hits", 1, &Tags::new()).unwrap_err();
        assert_eq!(ErrorKind::NotConnected, err.kind());
    }

    #[test]
    fn test_statsd_client_reopen_closes_previous() {
        let sink = CloseCountingSink::default();
        let closed = sink.closed.clone();
        let client = StatsdClient::builder("127.0.0.1:8125").build().unwrap();

        client.open_sink(sink);
        client.open_sink(NopMetricSink);
        assert_eq!(1, closed.load(Ordering::SeqCst));
        assert!(client.is_connected());
    }

    #[test]
    fn test_statsd_client_new_validates() {
        let err = StatsdClient::new("127.0.0.1:8125", "", Duration::ZERO, 101).unwrap_err();
        assert_eq!(ErrorKind::InvalidInput, err.kind());

        let client = StatsdClient::new("127.0.0.1:8125", "app.", Duration::from_secs(1), 25).unwrap();
        assert_eq!("app.", client.config().prefix);
        assert_eq!(0.25, client.default_sample_rate());
    }

    #[test]
    fn test_statsd_client_field() {
        let client = StatsdClient::builder("127.0.0.1:8125").build().unwrap();
        let field = client.field(MetricKind::GaugeDelta, "conns", -2, &tags(&[("a", "b")]));

        assert_eq!("gauge_delta", field["type"]);
        assert_eq!("conns", field["name"]);
        assert_eq!(-2, field["value"]);
        assert_eq!("b", field["tags"]["a"]);
    }

    #[test]
    fn test_statsd_client_as_metric_client() {
        let client = StatsdClient::builder("127.0.0.1:8125").build().unwrap();
        client.open_sink(NopMetricSink);
        let client: Box<dyn MetricClient + Send + Sync> = Box::new(client);

        assert!(client.increment("hits", 1, &Tags::new()).is_ok());
    }

    #[test]
    fn test_statsd_client_threaded() {
        let (rx, client) = spy_client("");
        let client = Arc::new(client);

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let local = Arc::clone(&client);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        local.counter("hits", i, &Tags::new()).unwrap();
                    }
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(100, rx.try_iter().count());
    }
}
