//! Tracewell Collector library.
//!
//! Configuration and instrumentation for the collector. The binary builds a
//! metrics registry from [`CollectorConfig`], declares the collector's
//! instruments through [`CollectorMetrics`], and prints the catalogue.

pub mod config;
pub mod error;
pub mod metrics;

pub use config::{Args, CollectorConfig};
pub use error::{Error, Result};
pub use metrics::CollectorMetrics;
