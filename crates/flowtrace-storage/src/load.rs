//! Builds a [`FlowGraphIndex`] from any [`FlowTableSource`].

use tracing::info;

use flowtrace_core::{FlowGraphBuilder, FlowGraphIndex, ReachId};

use crate::error::StorageError;
use crate::traits::FlowTableSource;

/// Streams every row of `source` into a new index.
///
/// A failing source aborts the load. Malformed rows do not; they are counted
/// in the index's build stats.
pub fn load_flow_graph<S>(source: &S, terminal: ReachId) -> Result<FlowGraphIndex, StorageError>
where
    S: FlowTableSource + ?Sized,
{
    let description = source.describe();
    info!(source = %description, %terminal, "loading flow table");

    let mut builder = FlowGraphBuilder::new(terminal);
    let rows = source.for_each_row(&mut |row| builder.push(row))?;
    let graph = builder.finish();

    info!(
        source = %description,
        rows,
        reaches = graph.node_count(),
        edges = graph.edge_count(),
        skipped_rows = graph.stats().skipped_rows,
        "flow table loaded"
    );
    Ok(graph)
}
