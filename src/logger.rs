// Statline - A StatsD client with a metrics-over-logging bridge
//
// Copyright 2026 Statline Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tagged JSON logger whose records can carry metrics.
//!
//! Records are `tracing` events written by the `tracing-subscriber` JSON
//! formatter, one flattened object per line:
//!
//! ``` text
//! {"level":"INFO","message":"hello","tags":"[\"level:info\",\"api\"]","meta":"{\"key\":\"val\"}"}
//! ```
//!
//! Tags drive filtering through a [`TagFilter`] layer. A record carrying
//! one of the configured important tags is always written, otherwise a
//! record carrying a blacklisted tag is dropped, otherwise it is subject to
//! the logger's sample rate.
//!
//! A `statsd` entry in the meta map is recorded as its own `statsd` field.
//! Adding a [`StatsdBridge`](crate::StatsdBridge) using the
//! [`tracing_fields`](crate::decode::tracing_fields) decoder to the writers
//! turns such a record into a StatsD line as well.

use crate::decode::PAYLOAD_KEY;
use crate::sampler::Sampler;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt;
use std::io;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{dispatcher, event, Dispatch, Event, Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::Registry;

/// Structured data attached to a record under the `meta` field.
pub type Meta = Map<String, Value>;

const TAGS_FIELD: &str = "tags";

/// Tag added to every record of a level, such as `level:info`.
pub fn level_tag(level: Level) -> String {
    format!("level:{}", level.as_str().to_ascii_lowercase())
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfig {
    /// Records with any of these tags are always written.
    pub important_tags: Vec<String>,
    /// Records with any of these tags are dropped, unless important.
    pub blacklisted_tags: Vec<String>,
    /// Fraction of the remaining records that get written.
    pub sample_rate: f32,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            important_tags: Vec::new(),
            blacklisted_tags: Vec::new(),
            sample_rate: 1.0,
        }
    }
}

/// `tracing-subscriber` layer deciding from an event's `tags` field whether
/// it gets written at all.
///
/// The field holds a JSON array of strings, the way [`Logger`] records it.
/// Events without one are only subject to the sample rate.
#[derive(Debug)]
pub struct TagFilter {
    config: Arc<LoggerConfig>,
    sampler: Sampler,
}

impl TagFilter {
    pub fn new(config: LoggerConfig) -> Self {
        Self::with_sampler(config, Sampler::new())
    }

    pub fn with_sampler(config: LoggerConfig, sampler: Sampler) -> Self {
        TagFilter {
            config: Arc::new(config),
            sampler,
        }
    }

    /// Whether a record carrying `tags` is written.
    pub fn allows<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        let has_any = |wanted: &[String]| {
            wanted
                .iter()
                .any(|w| tags.iter().any(|t| AsRef::<str>::as_ref(t) == w.as_str()))
        };

        if has_any(&self.config.important_tags) {
            return true;
        }
        if has_any(&self.config.blacklisted_tags) {
            return false;
        }

        self.sampler.should_send(self.config.sample_rate)
    }
}

impl<S: Subscriber> Layer<S> for TagFilter {
    fn event_enabled(&self, event: &Event<'_>, _ctx: Context<'_, S>) -> bool {
        let mut visitor = TagsVisitor::default();
        event.record(&mut visitor);
        self.allows(&visitor.0)
    }
}

#[derive(Default)]
struct TagsVisitor(Vec<String>);

impl Visit for TagsVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == TAGS_FIELD {
            self.0 = serde_json::from_str(value).unwrap_or_default();
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn fmt::Debug) {}
}

struct Root {
    config: Arc<LoggerConfig>,
    dispatch: Dispatch,
}

enum Node<'p> {
    Root(Root),
    Child(&'p Logger<'p>),
}

/// Logger writing tagged JSON records to a `tracing-subscriber` writer.
///
/// The root logger owns the configuration and a private `tracing`
/// dispatcher, so it doesn't touch the global subscriber. Children created
/// with [`Logger::with`] only hold their own tags and borrow their parent,
/// so a child can't outlive the logger it came from.
///
/// Several writers are combined with
/// [`MakeWriterExt::and`](tracing_subscriber::fmt::writer::MakeWriterExt::and).
/// Each record is handed to every one of them, even when an earlier one
/// fails.
///
/// # Example
///
/// ```
/// use statline::Logger;
///
/// let root = Logger::new(std::io::sink);
/// let api = root.with(["api"]);
/// let handler = api.with(["users"]);
///
/// handler.info("listing users", &["v2"]);
/// ```
pub struct Logger<'p> {
    node: Node<'p>,
    tags: Vec<String>,
}

impl Logger<'static> {
    /// Create a root logger with the default configuration.
    pub fn new<W>(writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        Self::with_config(LoggerConfig::default(), writer)
    }

    pub fn with_config<W>(config: LoggerConfig, writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        Self::from_parts(config, Sampler::new(), writer)
    }

    /// Create a root logger drawing from `sampler` for its sample rate.
    pub fn from_parts<W>(config: LoggerConfig, sampler: Sampler, writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let config = Arc::new(config);
        let filter = TagFilter {
            config: config.clone(),
            sampler,
        };

        let format = tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .without_time()
            .with_target(false)
            .with_writer(writer);

        let subscriber = Registry::default().with(filter).with(format);

        Logger {
            node: Node::Root(Root {
                config,
                dispatch: Dispatch::new(subscriber),
            }),
            tags: Vec::new(),
        }
    }
}

impl Default for Logger<'static> {
    /// Root logger writing to stdout.
    fn default() -> Self {
        Self::new(io::stdout)
    }
}

impl<'p> Logger<'p> {
    /// Create a child logger adding `tags` to every record it writes.
    pub fn with<I, S>(&self, tags: I) -> Logger<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Logger {
            node: Node::Child(self),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.root().config
    }

    /// Tags this logger adds to records, its ancestors' first.
    pub fn tags(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_tags(&mut out);
        out
    }

    pub fn log(&self, level: Level, msg: &str, tags: &[&str]) {
        self.write_record(level, None, msg, None, tags)
    }

    pub fn logm(&self, level: Level, msg: &str, meta: &Meta, tags: &[&str]) {
        self.write_record(level, None, msg, Some(meta), tags)
    }

    pub fn debug(&self, msg: &str, tags: &[&str]) {
        self.log(Level::DEBUG, msg, tags)
    }

    pub fn debugm(&self, msg: &str, meta: &Meta, tags: &[&str]) {
        self.logm(Level::DEBUG, msg, meta, tags)
    }

    pub fn info(&self, msg: &str, tags: &[&str]) {
        self.log(Level::INFO, msg, tags)
    }

    pub fn infom(&self, msg: &str, meta: &Meta, tags: &[&str]) {
        self.logm(Level::INFO, msg, meta, tags)
    }

    pub fn warn(&self, msg: &str, tags: &[&str]) {
        self.log(Level::WARN, msg, tags)
    }

    pub fn warnm(&self, msg: &str, meta: &Meta, tags: &[&str]) {
        self.logm(Level::WARN, msg, meta, tags)
    }

    /// Write an error level record with `err` under the `error` field.
    pub fn error(&self, err: &dyn Error, msg: &str, tags: &[&str]) {
        self.write_record(Level::ERROR, Some(err), msg, None, tags)
    }

    pub fn errorm(&self, err: &dyn Error, msg: &str, meta: &Meta, tags: &[&str]) {
        self.write_record(Level::ERROR, Some(err), msg, Some(meta), tags)
    }

    fn root(&self) -> &Root {
        match &self.node {
            Node::Root(root) => root,
            Node::Child(parent) => parent.root(),
        }
    }

    fn collect_tags(&self, out: &mut Vec<String>) {
        if let Node::Child(parent) = &self.node {
            parent.collect_tags(out);
        }
        out.extend(self.tags.iter().cloned());
    }

    fn write_record(&self, level: Level, err: Option<&dyn Error>, msg: &str, meta: Option<&Meta>, tags: &[&str]) {
        let mut all_tags = vec![level_tag(level)];
        self.collect_tags(&mut all_tags);
        all_tags.extend(tags.iter().map(|t| t.to_string()));

        let (meta, statsd) = split_meta(meta);
        let record = Record {
            tags: Value::from(all_tags).to_string(),
            meta: meta.map(|m| Value::Object(m).to_string()),
            statsd: statsd.map(Value::to_string),
            error: err.map(|e| e.to_string()),
        };

        dispatcher::with_default(&self.root().dispatch, || record.emit(level, msg));
    }
}

impl fmt::Debug for Logger<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("config", self.config())
            .field("tags", &self.tags())
            .finish()
    }
}

/// Field values of one record, already serialized.
struct Record {
    tags: String,
    meta: Option<String>,
    statsd: Option<String>,
    error: Option<String>,
}

macro_rules! record_event {
    ($level:expr, $record:expr, $msg:expr) => {
        event!(
            $level,
            tags = $record.tags.as_str(),
            meta = $record.meta.as_deref(),
            statsd = $record.statsd.as_deref(),
            error = $record.error.as_deref(),
            "{}",
            $msg
        )
    };
}

impl Record {
    // event! needs a constant level
    fn emit(&self, level: Level, msg: &str) {
        if level == Level::ERROR {
            record_event!(Level::ERROR, self, msg)
        } else if level == Level::WARN {
            record_event!(Level::WARN, self, msg)
        } else if level == Level::INFO {
            record_event!(Level::INFO, self, msg)
        } else if level == Level::DEBUG {
            record_event!(Level::DEBUG, self, msg)
        } else {
            record_event!(Level::TRACE, self, msg)
        }
    }
}

/// Separate the metric payload from the rest of the meta map. An empty
/// remainder is dropped.
fn split_meta(meta: Option<&Meta>) -> (Option<Meta>, Option<&Value>) {
    let meta = match meta {
        Some(meta) => meta,
        None => return (None, None),
    };

    let rest: Meta = meta
        .iter()
        .filter(|(key, _)| key.as_str() != PAYLOAD_KEY)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    (Some(rest).filter(|m| !m.is_empty()), meta.get(PAYLOAD_KEY))
}
