// Statline - A StatsD client with a metrics-over-logging bridge
//
// Copyright 2026 Statline Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Export the metric traits for easy glob imports
//!
//! # Example
//!
//! ```
//! use statline::prelude::*;
//! use statline::{NopMetricSink, StatsdClient, Tags};
//!
//! let client = StatsdClient::builder("127.0.0.1:8125").with_prefix("some.prefix.").build().unwrap();
//! client.open_sink(NopMetricSink);
//! let tags = Tags::new();
//!
//! client.counter("some.counter", 1, &tags).unwrap();
//! client.timing("some.timer", 23, &tags).unwrap();
//! client.gauge("some.gauge", 45, &tags).unwrap();
//! client.histogram("some.histogram", 89, &tags).unwrap();
//! client.set("some.set", 3, &tags).unwrap();
//! ```

pub use crate::client::{Counted, CountedExt, Gauged, Histogrammed, MetricClient, Setted, Timed};
