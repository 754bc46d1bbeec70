//! Tracewell Metrics - Prometheus instrument cache and factory.
//!
//! Instruments are identified by a metric name and an ordered list of label
//! names. [`VectorCache`] builds and registers each identity exactly once,
//! even under concurrent first use, and returns the same vector to every
//! caller afterwards. [`Factory`] sits on top of the cache and gives call
//! sites scoped, tag-based instruments.
//!
//! # Usage
//!
//! ```ignore
//! use tracewell_metrics::{new_shared_cache, Factory, Options};
//!
//! let registry = prometheus::Registry::new();
//! let cache = new_shared_cache(registry.clone());
//! let factory = Factory::new(cache);
//!
//! let received = factory.counter(Options::new("spans_received_total").tag("format", "jaeger"))?;
//! received.inc();
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod factory;
pub mod key;
pub mod registry;

pub use cache::{new_shared_cache, InstrumentKind, SharedVectorCache, VectorCache};
pub use config::MetricsConfig;
pub use error::{Error, Result};
pub use factory::{Factory, HistogramOptions, Options, Tags, Timer, TimerOptions};
pub use key::CacheKey;
pub use registry::Registerer;

/// Re-export of the backing metrics library.
pub use prometheus;

/// Render everything registered in `registry` in the Prometheus text format.
pub fn encode_text(registry: &prometheus::Registry) -> Result<String> {
    prometheus::TextEncoder::new()
        .encode_to_string(&registry.gather())
        .map_err(Error::Encode)
}
