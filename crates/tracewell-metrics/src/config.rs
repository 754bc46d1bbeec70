//! Metrics configuration.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use prometheus::Registry;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn default_buckets() -> Vec<f64> {
    prometheus::DEFAULT_BUCKETS.to_vec()
}

/// Settings shared by every instrument a process creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Root scope prepended to every metric name by the factory.
    pub namespace: Option<String>,

    /// Labels attached by the registry to every exported sample.
    pub const_labels: BTreeMap<String, String>,

    /// Histogram buckets used when a histogram is requested without any.
    #[serde(default = "default_buckets")]
    pub default_buckets: Vec<f64>,
}

impl MetricsConfig {
    /// Create a configuration with no namespace and the Prometheus default buckets.
    pub fn new() -> Self {
        Self {
            namespace: None,
            const_labels: BTreeMap::new(),
            default_buckets: default_buckets(),
        }
    }

    /// Set the root namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Add a registry-wide constant label.
    pub fn with_const_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.const_labels.insert(name.into(), value.into());
        self
    }

    /// Set the default histogram buckets.
    pub fn with_default_buckets(mut self, buckets: Vec<f64>) -> Self {
        self.default_buckets = buckets;
        self
    }

    /// Check that the default buckets are non-empty and strictly increasing.
    pub fn validate(&self) -> Result<()> {
        if self.default_buckets.is_empty() {
            return Err(Error::Config("default buckets must not be empty".into()));
        }
        for pair in self.default_buckets.windows(2) {
            if pair[0].partial_cmp(&pair[1]) != Some(Ordering::Less) {
                return Err(Error::Config(format!(
                    "default buckets must be strictly increasing, got {} before {}",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(())
    }

    /// Build the registry instruments are registered with.
    pub fn build_registry(&self) -> Result<Registry> {
        self.validate()?;

        let labels = if self.const_labels.is_empty() {
            None
        } else {
            Some(
                self.const_labels
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<HashMap<_, _>>(),
            )
        };

        Registry::new_custom(None, labels).map_err(|source| Error::InvalidOptions {
            name: "registry".to_string(),
            source,
        })
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{IntCounter, Opts};

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(config.namespace.is_none());
        assert!(config.const_labels.is_empty());
        assert_eq!(config.default_buckets, prometheus::DEFAULT_BUCKETS.to_vec());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = MetricsConfig::new()
            .with_namespace("collector")
            .with_const_label("host", "node-1")
            .with_default_buckets(vec![0.5, 1.0, 2.0]);

        assert_eq!(config.namespace.as_deref(), Some("collector"));
        assert_eq!(config.const_labels.get("host").map(String::as_str), Some("node-1"));
        assert_eq!(config.default_buckets, vec![0.5, 1.0, 2.0]);
    }

    #[test]
    fn test_from_json() {
        let config: MetricsConfig = serde_json::from_str(
            r#"{"namespace": "query", "const_labels": {"zone": "eu-1"}}"#,
        )
        .unwrap();

        assert_eq!(config.namespace.as_deref(), Some("query"));
        assert_eq!(config.const_labels.get("zone").map(String::as_str), Some("eu-1"));
        assert_eq!(config.default_buckets, prometheus::DEFAULT_BUCKETS.to_vec());
    }

    #[test]
    fn test_rejects_unsorted_buckets() {
        let config = MetricsConfig::new().with_default_buckets(vec![1.0, 0.5]);
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = MetricsConfig::new().with_default_buckets(vec![]);
        assert!(matches!(config.build_registry(), Err(Error::Config(_))));
    }

    #[test]
    fn test_registry_applies_const_labels() {
        let registry = MetricsConfig::new()
            .with_const_label("host", "node-1")
            .build_registry()
            .unwrap();

        let counter = IntCounter::with_opts(Opts::new("events_total", "Events")).unwrap();
        registry.register(Box::new(counter.clone())).unwrap();
        counter.inc();

        let families = registry.gather();
        let labels = families[0].get_metric()[0].get_label();
        assert_eq!(labels[0].get_name(), "host");
        assert_eq!(labels[0].get_value(), "node-1");
    }
}
