//! Deduplicating cache of registered instrument vectors.
//!
//! Instrumentation call sites ask for the same counter, gauge or histogram
//! vector over and over. The cache constructs and registers each identity
//! once and hands every later caller the same vector.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use prometheus::core::Collector;
use prometheus::{CounterVec, GaugeVec, HistogramOpts, HistogramVec, Opts};

use crate::error::{Error, Result};
use crate::key::CacheKey;
use crate::registry::Registerer;

/// Instrument kind, one cache partition each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    /// Monotonic counter vector.
    Counter,
    /// Gauge vector that can go up and down.
    Gauge,
    /// Histogram vector with fixed buckets.
    Histogram,
}

impl InstrumentKind {
    /// Lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentKind::Counter => "counter",
            InstrumentKind::Gauge => "gauge",
            InstrumentKind::Histogram => "histogram",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Default)]
struct Partitions {
    counters: HashMap<CacheKey, Arc<CounterVec>>,
    gauges: HashMap<CacheKey, Arc<GaugeVec>>,
    histograms: HashMap<CacheKey, Arc<HistogramVec>>,
}

impl Partitions {
    fn len(&self) -> usize {
        self.counters.len() + self.gauges.len() + self.histograms.len()
    }
}

/// A vector type the cache knows how to build and file.
trait InstrumentVec: Collector + Clone + 'static {
    type Opts;

    const KIND: InstrumentKind;

    fn metric_name(opts: &Self::Opts) -> &str;

    fn build(opts: Self::Opts, label_names: &[&str]) -> prometheus::Result<Self>;

    fn entries(partitions: &mut Partitions) -> &mut HashMap<CacheKey, Arc<Self>>;
}

impl InstrumentVec for CounterVec {
    type Opts = Opts;

    const KIND: InstrumentKind = InstrumentKind::Counter;

    fn metric_name(opts: &Opts) -> &str {
        &opts.name
    }

    fn build(opts: Opts, label_names: &[&str]) -> prometheus::Result<Self> {
        CounterVec::new(opts, label_names)
    }

    fn entries(partitions: &mut Partitions) -> &mut HashMap<CacheKey, Arc<Self>> {
        &mut partitions.counters
    }
}

impl InstrumentVec for GaugeVec {
    type Opts = Opts;

    const KIND: InstrumentKind = InstrumentKind::Gauge;

    fn metric_name(opts: &Opts) -> &str {
        &opts.name
    }

    fn build(opts: Opts, label_names: &[&str]) -> prometheus::Result<Self> {
        GaugeVec::new(opts, label_names)
    }

    fn entries(partitions: &mut Partitions) -> &mut HashMap<CacheKey, Arc<Self>> {
        &mut partitions.gauges
    }
}

impl InstrumentVec for HistogramVec {
    type Opts = HistogramOpts;

    const KIND: InstrumentKind = InstrumentKind::Histogram;

    fn metric_name(opts: &HistogramOpts) -> &str {
        &opts.common_opts.name
    }

    fn build(opts: HistogramOpts, label_names: &[&str]) -> prometheus::Result<Self> {
        HistogramVec::new(opts, label_names)
    }

    fn entries(partitions: &mut Partitions) -> &mut HashMap<CacheKey, Arc<Self>> {
        &mut partitions.histograms
    }
}

/// Cache of counter, gauge and histogram vectors bound to one registry.
///
/// Every lookup holds a single lock across all three kinds for the whole
/// call, including construction and registration on a miss. At most one
/// vector is ever built and registered per identity, and no caller can
/// observe an entry before its registration has succeeded.
///
/// Only the metric name and label names select an entry. Other options
/// (help, const labels, buckets) are taken from the first request and
/// ignored afterwards.
pub struct VectorCache {
    registerer: Box<dyn Registerer>,
    partitions: Mutex<Partitions>,
}

impl VectorCache {
    /// Create an empty cache that registers into `registerer`.
    pub fn new(registerer: impl Registerer + 'static) -> Self {
        Self {
            registerer: Box::new(registerer),
            partitions: Mutex::new(Partitions::default()),
        }
    }

    /// Get the counter vector for `opts.name` and `label_names`, creating and
    /// registering it on first use.
    pub fn get_or_make_counter_vec(
        &self,
        opts: Opts,
        label_names: &[&str],
    ) -> Result<Arc<CounterVec>> {
        self.get_or_make(opts, label_names)
    }

    /// Get the gauge vector for `opts.name` and `label_names`, creating and
    /// registering it on first use.
    pub fn get_or_make_gauge_vec(&self, opts: Opts, label_names: &[&str]) -> Result<Arc<GaugeVec>> {
        self.get_or_make(opts, label_names)
    }

    /// Get the histogram vector for `opts.common_opts.name` and `label_names`,
    /// creating and registering it on first use.
    pub fn get_or_make_histogram_vec(
        &self,
        opts: HistogramOpts,
        label_names: &[&str],
    ) -> Result<Arc<HistogramVec>> {
        self.get_or_make(opts, label_names)
    }

    /// Number of cached vectors across all kinds.
    pub fn len(&self) -> usize {
        self.partitions.lock().len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_or_make<V: InstrumentVec>(&self, opts: V::Opts, label_names: &[&str]) -> Result<Arc<V>> {
        let mut partitions = self.partitions.lock();

        let key = CacheKey::new(V::metric_name(&opts), label_names);
        if let Some(existing) = V::entries(&mut partitions).get(&key) {
            return Ok(Arc::clone(existing));
        }

        let name = V::metric_name(&opts).to_owned();
        let vector = V::build(opts, label_names).map_err(|source| Error::InvalidOptions {
            name: name.clone(),
            source,
        })?;

        // A failed registration must leave the key absent.
        if let Err(source) = self.registerer.register(Box::new(vector.clone())) {
            tracing::warn!(
                metric = %name,
                kind = %V::KIND,
                error = %source,
                "metric registration rejected"
            );
            return Err(Error::RegistrationConflict { name, source });
        }

        tracing::debug!(
            metric = %name,
            kind = %V::KIND,
            labels = ?label_names,
            "registered metric vector"
        );

        let vector = Arc::new(vector);
        V::entries(&mut partitions).insert(key, Arc::clone(&vector));
        Ok(vector)
    }
}

impl fmt::Debug for VectorCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let partitions = self.partitions.lock();
        f.debug_struct("VectorCache")
            .field("counters", &partitions.counters.len())
            .field("gauges", &partitions.gauges.len())
            .field("histograms", &partitions.histograms.len())
            .finish_non_exhaustive()
    }
}

/// Shared instrument cache handle.
pub type SharedVectorCache = Arc<VectorCache>;

/// Create a shared cache bound to `registerer`.
pub fn new_shared_cache(registerer: impl Registerer + 'static) -> SharedVectorCache {
    Arc::new(VectorCache::new(registerer))
}
