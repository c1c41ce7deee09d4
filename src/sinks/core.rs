// Statline - A StatsD client with a metrics-over-logging bridge
//
// Copyright 2026 Statline Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::atomic::{AtomicU64, Ordering};

/// Telemetry about the I/O performed by a sink.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub bytes_sent: u64,
    pub packets_sent: u64,
    pub bytes_dropped: u64,
    pub packets_dropped: u64,
}

#[derive(Debug, Default)]
pub(crate) struct SocketStats {
    bytes_sent: AtomicU64,
    packets_sent: AtomicU64,
    bytes_dropped: AtomicU64,
    packets_dropped: AtomicU64,
}

impl SocketStats {
    /// Record the outcome of writing `len` bytes and pass the result through.
    pub(crate) fn update(&self, res: io::Result<usize>, len: usize) -> io::Result<usize> {
        match res {
            Ok(written) => {
                self.bytes_sent.fetch_add(written as u64, Ordering::Relaxed);
                self.packets_sent.fetch_add(1, Ordering::Relaxed);
                Ok(written)
            }
            Err(e) => {
                self.bytes_dropped.fetch_add(len as u64, Ordering::Relaxed);
                self.packets_dropped.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }
}

impl From<&SocketStats> for SinkStats {
    fn from(stats: &SocketStats) -> Self {
        SinkStats {
            bytes_sent: stats.bytes_sent.load(Ordering::Relaxed),
            packets_sent: stats.packets_sent.load(Ordering::Relaxed),
            bytes_dropped: stats.bytes_dropped.load(Ordering::Relaxed),
            packets_dropped: stats.packets_dropped.load(Ordering::Relaxed),
        }
    }
}

/// How lines written to a sink are delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Each line is its own message, no terminator.
    Datagram,
    /// Lines share a byte stream and each ends with `\n`.
    Stream,
}

/// Trait for the various backends that send StatsD lines somewhere.
///
/// The line handed to `emit` is already complete: lines for a sink whose
/// [`Framing`] is `Stream` carry their trailing newline, lines for a
/// `Datagram` sink don't. Examples of each metric type are given below.
///
/// ## Counter
///
/// ``` text
/// some.counter:123|c
/// ```
///
/// ## Timer
///
/// ``` text
/// some.timer:456|ms
/// ```
///
/// ## Gauge
///
/// ``` text
/// some.gauge:5|g
/// some.gauge:-2|g
/// ```
///
/// ## Histogram
///
/// ``` text
/// some.histogram:4|h
/// ```
///
/// ## Set
///
/// ``` text
/// some.set:2|s
/// ```
pub trait MetricSink {
    /// Send the line using this sink and return the number of bytes
    /// written or an I/O error.
    fn emit(&self, metric: &str) -> io::Result<usize>;

    /// Flush any buffered lines. Most sinks don't buffer, so by default
    /// this does nothing.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    /// Return I/O telemetry like bytes / packets sent or dropped. The
    /// default implementation returns zeros.
    fn stats(&self) -> SinkStats {
        SinkStats::default()
    }

    /// How lines sent to this sink must be delimited.
    fn framing(&self) -> Framing {
        Framing::Datagram
    }

    /// Release the underlying connection. Called when the client closes
    /// or replaces this sink.
    fn close(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Implementation of a `MetricSink` that discards all metrics.
///
/// Useful for disabling metric collection or unit tests.
#[derive(Debug, Clone)]
pub struct NopMetricSink;

impl MetricSink for NopMetricSink {
    fn emit(&self, _metric: &str) -> io::Result<usize> {
        Ok(0)
    }
}

/// Resolve an address, failing if it yields nothing at all.
pub(crate) fn resolve<A: ToSocketAddrs>(addr: A) -> io::Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = addr.to_socket_addrs()?.collect();
    if addrs.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "no socket addresses yielded"));
    }

    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use super::{resolve, Framing, MetricSink, NopMetricSink, SinkStats, SocketStats};
    use std::io;

    #[test]
    fn test_nop_metric_sink() {
        let sink = NopMetricSink;
        assert_eq!(0, sink.emit("baz:4|c").unwrap());
        assert_eq!(Framing::Datagram, sink.framing());
        assert!(sink.close().is_ok());
    }

    #[test]
    fn test_socket_stats_update() {
        let stats = SocketStats::default();
        assert_eq!(5, stats.update(Ok(5), 5).unwrap());
        assert!(stats.update(Err(io::Error::new(io::ErrorKind::Other, "boom")), 7).is_err());

        let expected = SinkStats {
            bytes_sent: 5,
            packets_sent: 1,
            bytes_dropped: 7,
            packets_dropped: 1,
        };
        assert_eq!(expected, SinkStats::from(&stats));
    }

    #[test]
    fn test_resolve_empty() {
        let empty: &[std::net::SocketAddr] = &[];
        assert_eq!(io::ErrorKind::InvalidInput, resolve(empty).unwrap_err().kind());
    }

    #[test]
    fn test_resolve_literal() {
        let addrs = resolve("127.0.0.1:8125").unwrap();
        assert_eq!(1, addrs.len());
        assert_eq!(8125, addrs[0].port());
    }
}
