use criterion::{criterion_group, criterion_main, Criterion};
use statline::prelude::*;
use statline::{decode, MetricDescriptor, MetricKind, NopMetricSink, StatsdBridge, StatsdClient, Tags};
use std::io::Write;
use std::sync::Arc;

fn new_nop_client() -> StatsdClient {
    let client = StatsdClient::builder("127.0.0.1:8125")
        .with_prefix("client.bench.")
        .build()
        .unwrap();
    client.open_sink(NopMetricSink);
    client
}

fn benchmark_statsdclient_nop(c: &mut Criterion) {
    let client = new_nop_client();
    let empty = Tags::new();
    let mut tags = Tags::new();
    tags.insert("region".to_owned(), "us-east".to_owned());
    tags.insert("host".to_owned(), "web01".to_owned());

    // counters stand in for every metric type, formatting cost is the same
    c.bench_function("statsdclient_nop_counter", |b| {
        b.iter(|| client.counter("some.counter", 123, &empty))
    });

    c.bench_function("statsdclient_nop_counter_tags", |b| {
        b.iter(|| client.counter("some.counter", 123, &tags))
    });

    c.bench_function("statsdclient_nop_counter_sampled", |b| {
        b.iter(|| client.counter_sampled("some.counter", 123, &tags, 0.5))
    });

    c.bench_function("statsdclient_nop_gauge_delta", |b| {
        b.iter(|| client.gauge_delta("some.gauge", -7, &tags))
    });
}

fn benchmark_bridge_nop(c: &mut Criterion) {
    let bridge = StatsdBridge::with_decoder(Arc::new(new_nop_client()), decode::direct());
    let plain = br#"{"level":"info","tags":["level:info"],"message":"request served"}"#;
    let desc = MetricDescriptor::new(MetricKind::Timing, "request.latency", 42, Tags::new());
    let with_metric = format!(r#"{{"level":"info","statsd":{},"message":"request served"}}"#, desc);

    c.bench_function("bridge_nop_write_plain", |b| {
        b.iter(|| (&bridge).write(plain))
    });

    c.bench_function("bridge_nop_write_metric", |b| {
        b.iter(|| (&bridge).write(with_metric.as_bytes()))
    });
}

criterion_group!(benches, benchmark_statsdclient_nop, benchmark_bridge_nop);

criterion_main!(benches);
