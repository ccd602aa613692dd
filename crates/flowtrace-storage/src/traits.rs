//! The [`FlowTableSource`] trait: the read contract for flow tables.
//!
//! Backends stream rows instead of returning a `Vec` so a continental flow
//! table never has to sit in memory twice (once as rows, once as the index).

use flowtrace_core::FlowRow;

use crate::error::StorageError;

/// A readable flow table.
pub trait FlowTableSource {
    /// Short human-readable name of the source, used in log lines.
    fn describe(&self) -> String;

    /// Calls `f` once per row, in source order, and returns the number of
    /// rows read.
    ///
    /// Cells that cannot be read as a reach id arrive as `None`. Errors are
    /// reserved for failures of the source itself.
    fn for_each_row(&self, f: &mut dyn FnMut(FlowRow)) -> Result<u64, StorageError>;
}
