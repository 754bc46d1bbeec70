//! Collector error types.

use thiserror::Error;

/// Collector errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Metrics error.
    #[error("metrics error: {0}")]
    Metrics(#[from] tracewell_metrics::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for collector operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn print_to(out: &mut impl Write, text: &str) -> Result<()> {
        out.write_all(text.as_bytes())?;
        Ok(())
    }

    #[test]
    fn test_write_failure_is_io_error() {
        let err = print_to(&mut ClosedPipe, "# TYPE spans_received_total counter\n").unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert_eq!(err.to_string(), "io error: closed");
    }

    #[test]
    fn test_metrics_error_converts() {
        let err: Error = tracewell_metrics::Error::Config("empty buckets".into()).into();
        assert!(matches!(err, Error::Metrics(_)));
    }
}
