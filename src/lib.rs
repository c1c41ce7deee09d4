// Statline - A StatsD client with a metrics-over-logging bridge
//
// Copyright 2026 Statline Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A StatsD client with tags, sampling and a metrics-over-logging bridge.
//!
//! Statline emits StatsD lines over UDP or TCP, and can pick metrics out of
//! structured log records so that logging a metric is enough to send it.
//!
//! ## Features
//!
//! * Support for emitting counters, timings, histograms, gauges, gauge
//!   deltas and sets to StatsD over UDP or TCP.
//! * Support for [Datadog](https://docs.datadoghq.com/developers/dogstatsd/)
//!   style metric tags.
//! * Client side sampling with the rate written on the line.
//! * Support for alternate backends via the `MetricSink` trait.
//! * A bridge that implements `io::Write`, turning log records that carry
//!   a `"statsd":` payload into metrics.
//! * A small tagged JSON logger with child loggers and tag based filtering.
//!
//! ## Usage
//!
//! ### Simple Use
//!
//! Create a client for some imaginary metrics server, open a connection
//! and send a few metrics.
//!
//! ```rust,no_run
//! use statline::prelude::*;
//! use statline::{StatsdClient, Tags};
//!
//! let client = StatsdClient::builder("metrics.example.com:8125")
//!     .with_prefix("my.metrics.")
//!     .build()
//!     .unwrap();
//! client.open_udp().unwrap();
//!
//! let mut tags = Tags::new();
//! tags.insert("region".to_owned(), "us-east".to_owned());
//!
//! client.increment("some.counter", 1, &tags).unwrap();
//! client.timing("some.method_call", 42, &tags).unwrap();
//! client.gauge("some.thing", 7, &tags).unwrap();
//! client.gauge_delta("some.thing", -2, &tags).unwrap();
//! ```
//!
//! Lines look like `my.metrics.some.counter:1|c|#region:us-east`. Over TCP
//! each line ends with a newline.
//!
//! ### Sampling
//!
//! The `_sampled` variants only send a metric with the given probability
//! and put the rate on the line so the server can scale the value back up.
//! Metrics that lose the draw aren't sent and report zero bytes written.
//!
//! ```rust,no_run
//! use statline::prelude::*;
//! use statline::{StatsdClient, Tags};
//!
//! let client = StatsdClient::builder("metrics.example.com:8125").build().unwrap();
//! client.open_tcp().unwrap();
//!
//! // sent one time in ten as "requests:1|c|@0.1\n"
//! client.counter_sampled("requests", 1, &Tags::new(), 0.1).unwrap();
//! ```
//!
//! ### Metrics Over Logging
//!
//! A [`StatsdBridge`] can be used as a log sink. Records without a
//! `"statsd":` key pass through untouched. Records with one are decoded
//! and sent through the client.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use statline::{decode, Logger, Meta, MetricKind, StatsdBridge, StatsdClient, Tags};
//! use tracing_subscriber::fmt::writer::MakeWriterExt;
//!
//! let client = Arc::new(StatsdClient::builder("metrics.example.com:8125").build().unwrap());
//! client.open_udp().unwrap();
//!
//! let bridge = StatsdBridge::with_decoder(client.clone(), decode::tracing_fields());
//! let logger = Logger::new(std::io::stdout.and(move || bridge.clone()));
//!
//! let mut meta = Meta::new();
//! meta.insert("statsd".to_owned(), client.field(MetricKind::Counter, "logins", 1, &Tags::new()));
//! logger.infom("user logged in", &meta, &["auth"]);
//! ```
//!
//! The same bridge works with any `tracing-subscriber` JSON formatter using
//! [`decode::tracing_fields`] and `.with_writer(move || bridge.clone())`.
//!
//! ### Custom Metric Sinks
//!
//! Anything implementing [`MetricSink`] can be installed on a client with
//! [`StatsdClient::open_sink`]. [`SpyMetricSink`] hands every line to a
//! channel, which is handy in tests.

#![forbid(unsafe_code)]

pub const DEFAULT_PORT: u16 = 8125;

pub use self::bridge::StatsdBridge;

pub use self::builder::SampleRate;

pub use self::client::{
    Counted, CountedExt, Gauged, Histogrammed, MetricClient, Setted, StatsdClient, StatsdClientBuilder, Timed,
};

pub use self::config::ClientConfig;

pub use self::decode::Decoder;

pub use self::logger::{level_tag, Logger, LoggerConfig, Meta, TagFilter};

pub use self::sampler::Sampler;

pub use self::sinks::{Framing, MetricSink, NopMetricSink, SinkStats, SpyMetricSink, TcpMetricSink, UdpMetricSink};

pub use self::types::{DecodeError, ErrorKind, MetricDescriptor, MetricError, MetricKind, MetricResult, Tags};

mod bridge;
mod builder;
mod client;
mod config;
pub mod decode;
mod logger;
pub mod prelude;
mod sampler;
mod sinks;
mod types;
