//! Registry capability consumed by the instrument cache.

use std::sync::Arc;

use prometheus::core::Collector;

/// Something instruments can be registered with.
///
/// Implementations must reject a collector whose identity conflicts with one
/// already registered.
pub trait Registerer: Send + Sync {
    /// Register a collector.
    fn register(&self, collector: Box<dyn Collector>) -> prometheus::Result<()>;
}

impl Registerer for prometheus::Registry {
    fn register(&self, collector: Box<dyn Collector>) -> prometheus::Result<()> {
        prometheus::Registry::register(self, collector)
    }
}

impl<T: Registerer + ?Sized> Registerer for Arc<T> {
    fn register(&self, collector: Box<dyn Collector>) -> prometheus::Result<()> {
        (**self).register(collector)
    }
}
