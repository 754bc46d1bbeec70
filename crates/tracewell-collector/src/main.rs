//! Tracewell Collector - prints the collector's metric catalogue.

use std::io::Write;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tracewell_collector::{Args, CollectorMetrics, Error};
use tracewell_metrics::{encode_text, new_shared_cache, Factory};

fn main() -> Result<(), Error> {
    let args = Args::parse();
    let config = args.into_config()?;

    // Logs go to stderr so stdout carries only the exposition.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        namespace = ?config.metrics.namespace,
        const_labels = ?config.metrics.const_labels,
        buckets = ?config.metrics.default_buckets,
        "configuration loaded"
    );

    let registry = config.metrics.build_registry()?;
    let cache = new_shared_cache(registry.clone());
    let factory = Factory::from_config(cache.clone(), &config.metrics);

    let _metrics = CollectorMetrics::new(&factory).map_err(|e| {
        tracing::error!(error = %e, "failed to declare collector metrics");
        e
    })?;
    tracing::info!(instruments = cache.len(), "collector metrics registered");

    let text = encode_text(&registry)?;
    std::io::stdout().write_all(text.as_bytes())?;

    Ok(())
}
