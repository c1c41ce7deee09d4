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
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use crate::sinks::core::{resolve, MetricSink, SinkStats, SocketStats};

/// Implementation of a `MetricSink` that emits metrics over UDP.
///
/// Each metric is sent as its own datagram when `.emit()` is called, in
/// the thread of the caller. Delivery is not guaranteed.
#[derive(Debug)]
pub struct UdpMetricSink {
    addr: SocketAddr,
    socket: UdpSocket,
    stats: SocketStats,
}

impl UdpMetricSink {
    /// Resolve `addr`, bind an ephemeral local socket of the same address
    /// family and connect it to the collector.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use statline::{UdpMetricSink, DEFAULT_PORT};
    ///
    /// let sink = UdpMetricSink::connect(("metrics.example.com", DEFAULT_PORT)).unwrap();
    /// ```
    ///
    /// # Failures
    ///
    /// This method may fail if:
    ///
    /// * It is unable to resolve the hostname of the metric server.
    /// * The address yields no socket addresses.
    /// * A local socket can't be bound or connected.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<UdpMetricSink> {
        let addr = resolve(addr)?[0];
        let local = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local)?;
        Self::from(addr, socket)
    }

    /// Construct a sink from an already bound socket, connecting it to
    /// the first address `addr` resolves to.
    pub fn from<A: ToSocketAddrs>(addr: A, socket: UdpSocket) -> io::Result<UdpMetricSink> {
        let addr = resolve(addr)?[0];
        socket.connect(addr)?;

        Ok(UdpMetricSink {
            addr,
            socket,
            stats: SocketStats::default(),
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }
}

impl MetricSink for UdpMetricSink {
    fn emit(&self, metric: &str) -> io::Result<usize> {
        self.stats.update(self.socket.send(metric.as_bytes()), metric.len())
    }

    fn stats(&self) -> SinkStats {
        (&self.stats).into()
    }
}
