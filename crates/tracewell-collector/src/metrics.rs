//! Collector instrumentation.

use tracewell_metrics::prometheus::{Counter, Gauge};
use tracewell_metrics::{Factory, Options, Result, Tags, Timer, TimerOptions};

/// Span formats the collector accepts.
pub const SPAN_FORMATS: &[&str] = &["jaeger", "zipkin", "otlp"];

/// Instruments owned by the collector.
///
/// Per-format counters are resolved through the factory on each call, so any
/// number of handlers can ask for them without registering anything twice.
#[derive(Clone)]
pub struct CollectorMetrics {
    factory: Factory,
    queue_length: Gauge,
    save_latency: Timer,
}

impl CollectorMetrics {
    /// Declare the collector's instruments under the `spans` scope of `factory`.
    pub fn new(factory: &Factory) -> Result<Self> {
        let factory = factory.namespace("spans", &Tags::new());

        let queue_length = factory.gauge(
            Options::new("queue_length").help("Spans waiting to be saved"),
        )?;
        let save_latency = factory.timer(TimerOptions::new(
            Options::new("save_latency_seconds").help("Time spent saving a span"),
        ))?;

        let metrics = Self {
            factory,
            queue_length,
            save_latency,
        };

        // Pre-create one series per known format so they export as zero.
        for format in SPAN_FORMATS {
            metrics.received(format)?;
            metrics.rejected(format)?;
        }

        tracing::debug!(scope = metrics.factory.scope(), "collector metrics declared");
        Ok(metrics)
    }

    /// Counter of spans received in `format`.
    pub fn received(&self, format: &str) -> Result<Counter> {
        self.factory.counter(
            Options::new("received_total")
                .help("Spans received by format")
                .tag("format", format),
        )
    }

    /// Counter of spans rejected in `format`.
    pub fn rejected(&self, format: &str) -> Result<Counter> {
        self.factory.counter(
            Options::new("rejected_total")
                .help("Spans rejected by format")
                .tag("format", format),
        )
    }

    /// Gauge of spans waiting in the processing queue.
    pub fn queue_length(&self) -> &Gauge {
        &self.queue_length
    }

    /// Timer for span persistence.
    pub fn save_latency(&self) -> &Timer {
        &self.save_latency
    }
}
