//! End-to-end tests for the collector metric catalogue.

use std::thread;

use clap::Parser;
use tracewell_collector::{Args, CollectorMetrics};
use tracewell_metrics::prometheus::Registry;
use tracewell_metrics::{encode_text, new_shared_cache, Factory};

fn catalogue(args: &[&str]) -> (String, CollectorMetrics, Registry) {
    let argv = std::iter::once("tracewell-collector").chain(args.iter().copied());
    let args = Args::try_parse_from(argv).unwrap();
    let config = args.into_config().unwrap();

    let registry = config.metrics.build_registry().unwrap();
    let factory = Factory::from_config(new_shared_cache(registry.clone()), &config.metrics);
    let metrics = CollectorMetrics::new(&factory).unwrap();

    (encode_text(&registry).unwrap(), metrics, registry)
}

#[test]
fn test_catalogue_uses_namespace_and_const_labels() {
    let (text, _metrics, _registry) = catalogue(&[
        "--namespace",
        "edge",
        "--const-label",
        "host=node-1",
    ]);

    assert!(text.contains("# TYPE edge_spans_received_total counter"));
    let otlp = text
        .lines()
        .find(|line| {
            line.starts_with("edge_spans_received_total{") && line.contains(r#"format="otlp""#)
        })
        .unwrap();
    assert!(otlp.contains(r#"host="node-1""#));
    assert!(otlp.ends_with(" 0"));
    assert!(text.contains("# TYPE edge_spans_queue_length gauge"));
    assert!(text.contains("# TYPE edge_spans_save_latency_seconds histogram"));
}

#[test]
fn test_catalogue_uses_configured_buckets() {
    let (text, _metrics, _registry) = catalogue(&["--buckets", "0.5,5"]);

    assert!(text.contains(r#"tracewell_collector_spans_save_latency_seconds_bucket{le="0.5"} 0"#));
    assert!(text.contains(r#"tracewell_collector_spans_save_latency_seconds_bucket{le="5"} 0"#));
}

#[test]
fn test_concurrent_handlers_share_counters() {
    let (_text, metrics, registry) = catalogue(&[]);

    thread::scope(|scope| {
        for _ in 0..8 {
            let metrics = metrics.clone();
            scope.spawn(move || {
                for _ in 0..100 {
                    metrics.received("jaeger").unwrap().inc();
                }
            });
        }
    });

    assert_eq!(metrics.received("jaeger").unwrap().get(), 800.0);
    let text = encode_text(&registry).unwrap();
    assert!(text.contains(r#"tracewell_collector_spans_received_total{format="jaeger"} 800"#));
}
