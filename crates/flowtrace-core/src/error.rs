//! Core error types for flowtrace-core.
//!
//! Uses `thiserror` for structured, matchable variants. The graph builder
//! never returns these for individual rows; malformed rows are counted and
//! skipped, and the error value only feeds diagnostics.

use thiserror::Error;

use crate::id::ReachId;

/// Core errors produced by the flowtrace-core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A flow-table row was missing its source or target identifier.
    #[error("malformed flow row: from={from:?}, to={to:?}")]
    MalformedEdgeRow {
        from: Option<ReachId>,
        to: Option<ReachId>,
    },
}
