//! Trace error types.
//!
//! Only [`TraceError::Oversized`] can come out of a traversal; the other
//! variants belong to configuration loading. The batch runner converts trace
//! errors into per-site "no result" markers, so none of these abort a run.

use flowtrace_core::Direction;

/// Errors produced by tracing and trace configuration.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// A single trace visited more reaches than the configured ceiling.
    #[error("{direction} trace visited {visited} reaches, exceeding the limit of {limit}")]
    Oversized {
        direction: Direction,
        visited: usize,
        limit: usize,
    },

    /// The trace configuration could not be parsed.
    #[error("invalid trace configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The trace configuration file could not be read.
    #[error("failed to read trace configuration: {0}")]
    Io(#[from] std::io::Error),
}
