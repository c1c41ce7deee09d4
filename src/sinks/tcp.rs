// Statline - A StatsD client with a metrics-over-logging bridge
//
// Copyright 2026 Statline Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::sinks::core::{resolve, Framing, MetricSink, SinkStats, SocketStats};

/// Implementation of a `MetricSink` that writes newline terminated lines
/// to a TCP stream.
///
/// Writers are serialized so that concurrent lines never interleave.
#[derive(Debug)]
pub struct TcpMetricSink {
    addr: SocketAddr,
    stream: Mutex<TcpStream>,
    stats: SocketStats,
}

impl TcpMetricSink {
    /// Resolve `addr` and connect to each resulting address in turn until
    /// one succeeds. A zero `timeout` means a plain blocking connect.
    ///
    /// The error from the last address tried is returned if none of them
    /// accept the connection.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use statline::{TcpMetricSink, DEFAULT_PORT};
    ///
    /// let sink = TcpMetricSink::connect(("metrics.example.com", DEFAULT_PORT), Duration::from_secs(1)).unwrap();
    /// ```
    pub fn connect<A: ToSocketAddrs>(addr: A, timeout: Duration) -> io::Result<TcpMetricSink> {
        let mut last_err = None;

        for addr in resolve(addr)? {
            let res = if timeout.is_zero() {
                TcpStream::connect(addr)
            } else {
                TcpStream::connect_timeout(&addr, timeout)
            };

            match res {
                Ok(stream) => return Self::from(stream),
                Err(e) => last_err = Some(e),
            }
        }

        Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no socket addresses yielded")))
    }

    /// Construct a sink from an already connected stream.
    pub fn from(stream: TcpStream) -> io::Result<TcpMetricSink> {
        let addr = stream.peer_addr()?;
        stream.set_nodelay(true)?;

        Ok(TcpMetricSink {
            addr,
            stream: Mutex::new(stream),
            stats: SocketStats::default(),
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }
}

impl MetricSink for TcpMetricSink {
    fn emit(&self, metric: &str) -> io::Result<usize> {
        let mut stream = self.stream.lock().unwrap_or_else(PoisonError::into_inner);
        let res = stream.write_all(metric.as_bytes()).map(|_| metric.len());
        self.stats.update(res, metric.len())
    }

    fn flush(&self) -> io::Result<()> {
        let mut stream = self.stream.lock().unwrap_or_else(PoisonError::into_inner);
        stream.flush()
    }

    fn stats(&self) -> SinkStats {
        (&self.stats).into()
    }

    fn framing(&self) -> Framing {
        Framing::Stream
    }

    fn close(&self) -> io::Result<()> {
        let stream = self.stream.lock().unwrap_or_else(PoisonError::into_inner);
        match stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
            _ => Ok(()),
        }
    }
}
