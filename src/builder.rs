// Statline - A StatsD client with a metrics-over-logging bridge
//
// Copyright 2026 Statline Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::sinks::Framing;
use crate::types::Tags;
use std::fmt::{self, Write};

mod sample_rate;

pub use self::sample_rate::SampleRate;

/// Type suffix of a StatsD line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MetricType {
    Counter,
    Timer,
    Gauge,
    Histogram,
    Set,
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricType::Counter => "c".fmt(f),
            MetricType::Timer => "ms".fmt(f),
            MetricType::Gauge => "g".fmt(f),
            MetricType::Histogram => "h".fmt(f),
            MetricType::Set => "s".fmt(f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MetricValue {
    Signed(i64),
    /// Relative gauge change, always written with an explicit sign.
    Delta(i64),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricValue::Signed(v) => v.fmt(f),
            MetricValue::Delta(v) if v < 0 => write!(f, "-{}", v.unsigned_abs()),
            MetricValue::Delta(v) => write!(f, "+{}", v),
        }
    }
}

/// Renders a single metric as a StatsD line.
///
/// `<prefix><key>:<value>|<type>[|@<rate>][|#k:v,...]` followed by a
/// newline when the line is headed for a stream socket.
#[derive(Debug, Clone)]
pub(crate) struct MetricFormatter<'a> {
    prefix: &'a str,
    key: &'a str,
    val: MetricValue,
    type_: MetricType,
    sample_rate: Option<SampleRate>,
    tags: Option<&'a Tags>,
    framing: Framing,
}

impl<'a> MetricFormatter<'a> {
    const TAG_PREFIX: &'static str = "|#";

    pub(crate) fn counter(prefix: &'a str, key: &'a str, val: i64) -> Self {
        Self::from_val(prefix, key, MetricValue::Signed(val), MetricType::Counter)
    }

    pub(crate) fn timer(prefix: &'a str, key: &'a str, val: i64) -> Self {
        Self::from_val(prefix, key, MetricValue::Signed(val), MetricType::Timer)
    }

    pub(crate) fn gauge(prefix: &'a str, key: &'a str, val: i64) -> Self {
        Self::from_val(prefix, key, MetricValue::Signed(val), MetricType::Gauge)
    }

    pub(crate) fn gauge_delta(prefix: &'a str, key: &'a str, val: i64) -> Self {
        Self::from_val(prefix, key, MetricValue::Delta(val), MetricType::Gauge)
    }

    pub(crate) fn histogram(prefix: &'a str, key: &'a str, val: i64) -> Self {
        Self::from_val(prefix, key, MetricValue::Signed(val), MetricType::Histogram)
    }

    pub(crate) fn set(prefix: &'a str, key: &'a str, val: i64) -> Self {
        Self::from_val(prefix, key, MetricValue::Signed(val), MetricType::Set)
    }

    fn from_val(prefix: &'a str, key: &'a str, val: MetricValue, type_: MetricType) -> Self {
        MetricFormatter {
            prefix,
            key,
            val,
            type_,
            sample_rate: None,
            tags: None,
            framing: Framing::Datagram,
        }
    }

    pub(crate) fn with_sample_rate(&mut self, rate: SampleRate) -> &mut Self {
        self.sample_rate = Some(rate);
        self
    }

    pub(crate) fn with_tags(&mut self, tags: &'a Tags) -> &mut Self {
        self.tags = Some(tags);
        self
    }

    pub(crate) fn with_framing(&mut self, framing: Framing) -> &mut Self {
        self.framing = framing;
        self
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        let _ = write!(out, "{}{}:{}|{}", self.prefix, self.key, self.val, self.type_);

        if let Some(rate) = self.sample_rate {
            rate.write_suffix(out);
        }
        if let Some(tags) = self.tags {
            write_tags(out, tags);
        }
        if self.framing == Framing::Stream {
            out.push('\n');
        }
    }

    #[cfg(test)]
    pub(crate) fn format(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }
}

/// Append `|#k1:v1,k2:v2` for the given tags, or nothing when there are none.
///
/// Keys and values are written as is. Callers are responsible for keeping
/// `:`, `,` and `|` out of them.
pub(crate) fn write_tags<I, K, V>(out: &mut String, tags: I)
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    for (i, (key, value)) in tags.into_iter().enumerate() {
        out.push_str(if i == 0 { MetricFormatter::TAG_PREFIX } else { "," });
        out.push_str(key.as_ref());
        out.push(':');
        out.push_str(value.as_ref());
    }
}
