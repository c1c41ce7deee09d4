// Statline - A StatsD client with a metrics-over-logging bridge
//
// Copyright 2026 Statline Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::sinks::core::{Framing, MetricSink};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use std::io::{self, ErrorKind};

/// `MetricSink` implementation that writes all metrics to the `Sender`
/// half of a channel while callers are given ownership of the `Receiver`
/// half.
///
/// This is not a general purpose sink, rather it's a sink meant for
/// verifying metrics written during the course of integration tests. By
/// default the channel is unbounded and behaves like a datagram socket.
/// Use [`SpyMetricSink::stream`] to receive newline terminated lines the
/// way a TCP connection would.
#[derive(Debug)]
pub struct SpyMetricSink {
    sender: Sender<Vec<u8>>,
    framing: Framing,
}

impl SpyMetricSink {
    pub fn new() -> (Receiver<Vec<u8>>, Self) {
        Self::with_options(None, Framing::Datagram)
    }

    pub fn stream() -> (Receiver<Vec<u8>>, Self) {
        Self::with_options(None, Framing::Stream)
    }

    pub fn with_capacity(queue: usize) -> (Receiver<Vec<u8>>, Self) {
        Self::with_options(Some(queue), Framing::Datagram)
    }

    fn with_options(queue: Option<usize>, framing: Framing) -> (Receiver<Vec<u8>>, Self) {
        let (tx, rx) = match queue {
            Some(sz) => bounded(sz),
            None => unbounded(),
        };

        (rx, SpyMetricSink { sender: tx, framing })
    }
}

impl MetricSink for SpyMetricSink {
    fn emit(&self, metric: &str) -> io::Result<usize> {
        match self.sender.try_send(metric.as_bytes().to_vec()) {
            Err(TrySendError::Disconnected(_)) => Err(io::Error::new(ErrorKind::Other, "channel disconnected")),
            Err(TrySendError::Full(_)) => Err(io::Error::new(ErrorKind::Other, "channel full")),
            Ok(_) => Ok(metric.len()),
        }
    }

    fn framing(&self) -> Framing {
        self.framing
    }
}

#[cfg(test)]
mod test {
    use super::{Framing, MetricSink, SpyMetricSink};

    #[test]
    fn test_spy_metric_sink() {
        let (rx, sink) = SpyMetricSink::new();
        sink.emit("buz:1|c").unwrap();

        let sent = rx.recv().unwrap();
        assert_eq!("buz:1|c".as_bytes(), sent.as_slice());
        assert_eq!(Framing::Datagram, sink.framing());
    }

    #[test]
    fn test_spy_metric_sink_stream() {
        let (_rx, sink) = SpyMetricSink::stream();
        assert_eq!(Framing::Stream, sink.framing());
    }

    #[test]
    fn test_spy_metric_sink_full() {
        let (_rx, sink) = SpyMetricSink::with_capacity(1);
        sink.emit("foo:1|c").unwrap();
        assert!(sink.emit("foo:2|c").is_err());
    }

    #[test]
    fn test_spy_metric_sink_disconnected() {
        let (rx, sink) = SpyMetricSink::new();
        drop(rx);
        assert!(sink.emit("foo:1|c").is_err());
    }
}
