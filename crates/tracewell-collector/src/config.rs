//! Collector configuration.

use clap::Parser;
use tracewell_metrics::MetricsConfig;

use crate::error::Error;

/// Default metrics namespace for collector instruments.
pub const DEFAULT_NAMESPACE: &str = "tracewell_collector";

/// Default log filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "tracewell_collector=info,tracewell_metrics=info";

/// Collector configuration.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Metrics settings.
    pub metrics: MetricsConfig,

    /// Log filter directive used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl CollectorConfig {
    /// Create a configuration with the default namespace.
    pub fn new() -> Self {
        Self {
            metrics: MetricsConfig::new().with_namespace(DEFAULT_NAMESPACE),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }

    /// Replace the metrics settings.
    pub fn with_metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = metrics;
        self
    }

    /// Set the log filter.
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Command-line arguments for the collector.
#[derive(Parser, Debug)]
#[command(name = "tracewell-collector")]
#[command(version, about = "Tracewell collector metric catalogue", long_about = None)]
pub struct Args {
    /// Namespace prepended to every collector metric. Empty disables it.
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Constant label attached to every sample (repeatable).
    #[arg(long = "const-label", value_name = "KEY=VALUE")]
    pub const_labels: Vec<String>,

    /// Default histogram buckets in seconds, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub buckets: Vec<f64>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

impl Args {
    /// Convert command-line arguments to collector configuration.
    pub fn into_config(self) -> Result<CollectorConfig, Error> {
        let mut metrics = MetricsConfig::new();
        if !self.namespace.is_empty() {
            metrics = metrics.with_namespace(self.namespace);
        }

        for pair in &self.const_labels {
            let (key, value) = parse_label(pair)?;
            metrics = metrics.with_const_label(key, value);
        }

        if !self.buckets.is_empty() {
            metrics = metrics.with_default_buckets(self.buckets);
        }
        metrics.validate()?;

        Ok(CollectorConfig {
            metrics,
            log_filter: self.log_filter,
        })
    }
}

fn parse_label(pair: &str) -> Result<(&str, &str), Error> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(Error::Config(format!(
            "invalid const label {pair:?}, expected KEY=VALUE"
        ))),
    }
}
