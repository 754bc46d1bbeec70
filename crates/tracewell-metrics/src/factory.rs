//! Scoped metrics factory.
//!
//! Call sites describe instruments with a name and a map of tags. The factory
//! prefixes the name with its scope, normalizes it, turns the tags into an
//! ordered set of label names, and returns an instrument already bound to the
//! tag values. Vectors come from the shared [`VectorCache`], so two call sites
//! describing the same metric get the same underlying vector.

use std::collections::BTreeMap;
use std::time::Duration;

use prometheus::{Counter, Gauge, Histogram, HistogramOpts, HistogramTimer, Opts};

use crate::cache::{SharedVectorCache, VectorCache};
use crate::config::MetricsConfig;
use crate::error::{Error, Result};

/// Separator between scope segments and the metric name.
pub const SCOPE_SEPARATOR: &str = "_";

/// Tag map attached to an instrument.
pub type Tags = BTreeMap<String, String>;

/// Description of a counter or gauge.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Metric name, relative to the factory scope.
    pub name: String,
    /// Help text. Defaults to the full metric name.
    pub help: String,
    /// Tags, merged over the factory's own tags.
    pub tags: Tags,
}

impl Options {
    /// Describe a metric called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the help text.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Add a tag.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Description of a histogram.
#[derive(Debug, Clone, Default)]
pub struct HistogramOptions {
    /// Name, help and tags.
    pub options: Options,
    /// Bucket upper bounds. Empty means the factory default.
    pub buckets: Vec<f64>,
}

impl HistogramOptions {
    /// Describe a histogram with the factory's default buckets.
    pub fn new(options: Options) -> Self {
        Self {
            options,
            buckets: Vec::new(),
        }
    }

    /// Set the bucket upper bounds.
    pub fn buckets(mut self, buckets: Vec<f64>) -> Self {
        self.buckets = buckets;
        self
    }
}

/// Description of a timer: a histogram of durations in seconds.
#[derive(Debug, Clone, Default)]
pub struct TimerOptions {
    /// Name, help and tags.
    pub options: Options,
    /// Bucket upper bounds. Empty means the factory default.
    pub buckets: Vec<Duration>,
}

impl TimerOptions {
    /// Describe a timer with the factory's default buckets.
    pub fn new(options: Options) -> Self {
        Self {
            options,
            buckets: Vec::new(),
        }
    }

    /// Set the bucket upper bounds.
    pub fn buckets(mut self, buckets: Vec<Duration>) -> Self {
        self.buckets = buckets;
        self
    }
}

/// Histogram that records durations in seconds.
#[derive(Clone)]
pub struct Timer {
    histogram: Histogram,
}

impl Timer {
    /// Record an elapsed duration.
    pub fn record(&self, elapsed: Duration) {
        self.histogram.observe(elapsed.as_secs_f64());
    }

    /// Start a timer that records when dropped.
    pub fn start(&self) -> HistogramTimer {
        self.histogram.start_timer()
    }

    /// The underlying histogram.
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }
}

/// Creates scoped, tagged instruments through a shared [`VectorCache`].
#[derive(Debug, Clone)]
pub struct Factory {
    cache: SharedVectorCache,
    scope: String,
    tags: Tags,
    default_buckets: Vec<f64>,
}

impl Factory {
    /// Root factory with no scope, no tags and the Prometheus default buckets.
    pub fn new(cache: SharedVectorCache) -> Self {
        Self {
            cache,
            scope: String::new(),
            tags: Tags::new(),
            default_buckets: prometheus::DEFAULT_BUCKETS.to_vec(),
        }
    }

    /// Root factory scoped to the configured namespace.
    pub fn from_config(cache: SharedVectorCache, config: &MetricsConfig) -> Self {
        Self {
            cache,
            scope: config.namespace.clone().unwrap_or_default(),
            tags: Tags::new(),
            default_buckets: config.default_buckets.clone(),
        }
    }

    /// Child factory under `scope`, sharing this factory's cache.
    ///
    /// `tags` are merged over this factory's tags.
    pub fn namespace(&self, scope: &str, tags: &Tags) -> Self {
        let mut merged = self.tags.clone();
        merged.extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));

        Self {
            cache: self.cache.clone(),
            scope: join_scope(&self.scope, scope),
            tags: merged,
            default_buckets: self.default_buckets.clone(),
        }
    }

    /// The cache backing this factory.
    pub fn cache(&self) -> &VectorCache {
        &self.cache
    }

    /// Scope prepended to metric names.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Create or reuse a counter.
    pub fn counter(&self, options: Options) -> Result<Counter> {
        let metric = self.describe(&options)?;
        let opts = Opts::new(&metric.name, metric.help.as_str());
        let vector = self
            .cache
            .get_or_make_counter_vec(opts, &metric.label_names())?;

        vector
            .get_metric_with_label_values(&metric.label_values())
            .map_err(|source| Error::LabelMismatch {
                name: metric.name.clone(),
                source,
            })
    }

    /// Create or reuse a gauge.
    pub fn gauge(&self, options: Options) -> Result<Gauge> {
        let metric = self.describe(&options)?;
        let opts = Opts::new(&metric.name, metric.help.as_str());
        let vector = self
            .cache
            .get_or_make_gauge_vec(opts, &metric.label_names())?;

        vector
            .get_metric_with_label_values(&metric.label_values())
            .map_err(|source| Error::LabelMismatch {
                name: metric.name.clone(),
                source,
            })
    }

    /// Create or reuse a histogram.
    pub fn histogram(&self, options: HistogramOptions) -> Result<Histogram> {
        let buckets = if options.buckets.is_empty() {
            self.default_buckets.clone()
        } else {
            options.buckets
        };
        self.make_histogram(&options.options, buckets)
    }

    /// Create or reuse a timer.
    pub fn timer(&self, options: TimerOptions) -> Result<Timer> {
        let buckets = if options.buckets.is_empty() {
            self.default_buckets.clone()
        } else {
            options.buckets.iter().map(Duration::as_secs_f64).collect()
        };
        let histogram = self.make_histogram(&options.options, buckets)?;
        Ok(Timer { histogram })
    }

    fn make_histogram(&self, options: &Options, buckets: Vec<f64>) -> Result<Histogram> {
        let metric = self.describe(options)?;
        let opts = HistogramOpts::new(&metric.name, metric.help.as_str()).buckets(buckets);
        let vector = self
            .cache
            .get_or_make_histogram_vec(opts, &metric.label_names())?;

        vector
            .get_metric_with_label_values(&metric.label_values())
            .map_err(|source| Error::LabelMismatch {
                name: metric.name.clone(),
                source,
            })
    }

    fn describe(&self, options: &Options) -> Result<Described> {
        let name = normalize_metric_name(&join_scope(&self.scope, &options.name));
        let help = if options.help.is_empty() {
            name.clone()
        } else {
            options.help.clone()
        };

        // BTreeMap iteration keeps label names sorted.
        let mut labels = BTreeMap::new();
        let mut origins: BTreeMap<String, &str> = BTreeMap::new();
        for (key, value) in self.tags.iter().chain(options.tags.iter()) {
            let label = normalize_label_name(key);
            // An identical key is an override; a different key is a collision.
            if let Some(first) = origins.insert(label.clone(), key) {
                if first != key.as_str() {
                    return Err(Error::TagCollision {
                        name,
                        label,
                        first: first.to_string(),
                        second: key.clone(),
                    });
                }
            }
            labels.insert(label, value.clone());
        }

        Ok(Described { name, help, labels })
    }
}

struct Described {
    name: String,
    help: String,
    labels: BTreeMap<String, String>,
}

impl Described {
    fn label_names(&self) -> Vec<&str> {
        self.labels.keys().map(String::as_str).collect()
    }

    fn label_values(&self) -> Vec<&str> {
        self.labels.values().map(String::as_str).collect()
    }
}

fn join_scope(parent: &str, child: &str) -> String {
    match (parent.is_empty(), child.is_empty()) {
        (true, _) => child.to_string(),
        (false, true) => parent.to_string(),
        (false, false) => format!("{parent}{SCOPE_SEPARATOR}{child}"),
    }
}

fn normalize_metric_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == ':' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn normalize_label_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
