//! FlowGraphIndex: the directed adjacency index over a flow-relationship
//! table.
//!
//! The index is built once per run from the full flow table and is read-only
//! afterwards. It answers two questions in expected O(1) time:
//! - which reaches does water flow *into* from here (successors, downstream)
//! - which reaches flow *into* this one (predecessors, upstream)
//!
//! Storage is a petgraph `DiGraphMap` keyed directly by [`ReachId`], which
//! keeps both directions of every edge, collapses duplicate edges, and allows
//! self-loops. Unknown ids simply have no neighbors.
//!
//! # Terminal rows
//!
//! A row whose `to` equals the terminal sentinel marks an outlet ("no
//! downstream successor") and creates no edge; its `from` reach is still
//! registered as a node so the index knows the reach exists. The sentinel is
//! only special on the `to` side: a row `(terminal, x)` is an ordinary edge.

use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::edge::{Direction, FlowEdge, FlowRow};
use crate::id::ReachId;

/// Neighbor lookup seam shared by the full index and restricted views of it.
///
/// Tracers are written against this trait so the same traversal can run over
/// the whole network or over a buffer-local subset.
pub trait Adjacency {
    /// Neighbors of `id` in `direction`. Unknown ids yield nothing.
    fn neighbors(&self, id: ReachId, direction: Direction) -> impl Iterator<Item = ReachId> + '_;
}

/// Counters collected while building a [`FlowGraphIndex`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Rows handed to the builder, including malformed ones.
    pub rows_read: u64,
    /// Distinct edges inserted into the index.
    pub edges_inserted: u64,
    /// Rows repeating an edge that was already present.
    pub duplicate_edges: u64,
    /// Rows whose target was the terminal sentinel (outlets).
    pub terminal_rows: u64,
    /// Rows skipped because a cell was missing.
    pub skipped_rows: u64,
    /// Distinct self-loop edges inserted.
    pub self_loops: u64,
}

/// Incremental builder for [`FlowGraphIndex`].
///
/// Flow-table readers stream rows into [`push`](Self::push) so the full table
/// never has to be materialized twice.
#[derive(Debug)]
pub struct FlowGraphBuilder {
    graph: DiGraphMap<ReachId, ()>,
    terminal: ReachId,
    stats: BuildStats,
}

impl FlowGraphBuilder {
    /// Creates a builder using the given terminal sentinel.
    pub fn new(terminal: ReachId) -> Self {
        FlowGraphBuilder {
            graph: DiGraphMap::new(),
            terminal,
            stats: BuildStats::default(),
        }
    }

    /// Adds one raw row. Malformed rows are counted and skipped.
    pub fn push(&mut self, row: FlowRow) {
        self.stats.rows_read += 1;

        let edge = match FlowEdge::try_from(row) {
            Ok(edge) => edge,
            Err(err) => {
                self.stats.skipped_rows += 1;
                debug!(row = self.stats.rows_read, %err, "skipping flow row");
                return;
            }
        };

        if edge.to == self.terminal {
            self.stats.terminal_rows += 1;
            if edge.from != self.terminal {
                self.graph.add_node(edge.from);
            }
            return;
        }

        if self.graph.add_edge(edge.from, edge.to, ()).is_some() {
            self.stats.duplicate_edges += 1;
        } else {
            self.stats.edges_inserted += 1;
            if edge.is_self_loop() {
                self.stats.self_loops += 1;
            }
        }
    }

    /// Counters so far.
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Freezes the builder into a read-only index.
    ///
    /// Reports the skipped-row count once, at warning level, if any rows were
    /// malformed.
    pub fn finish(self) -> FlowGraphIndex {
        let stats = self.stats;
        if stats.skipped_rows > 0 {
            warn!(
                skipped_rows = stats.skipped_rows,
                rows_read = stats.rows_read,
                "skipped malformed flow rows while building the index"
            );
        }
        info!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            terminal_rows = stats.terminal_rows,
            duplicate_edges = stats.duplicate_edges,
            "flow graph index built"
        );

        FlowGraphIndex {
            graph: self.graph,
            terminal: self.terminal,
            stats,
        }
    }
}

/// Read-only adjacency index over the flow network.
///
/// Invariant: for every inserted edge `(a, b)`, `b` is a successor of `a` and
/// `a` is a predecessor of `b`. No edge ever points at the terminal sentinel.
#[derive(Debug, Clone)]
pub struct FlowGraphIndex {
    graph: DiGraphMap<ReachId, ()>,
    terminal: ReachId,
    stats: BuildStats,
}

impl FlowGraphIndex {
    /// Builds the index from raw rows using the default terminal sentinel
    /// ([`ReachId::TERMINAL`]).
    pub fn build<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = FlowRow>,
    {
        Self::build_with_terminal(rows, ReachId::TERMINAL)
    }

    /// Builds the index from raw rows using a custom terminal sentinel.
    pub fn build_with_terminal<I>(rows: I, terminal: ReachId) -> Self
    where
        I: IntoIterator<Item = FlowRow>,
    {
        let mut builder = FlowGraphBuilder::new(terminal);
        for row in rows {
            builder.push(row);
        }
        builder.finish()
    }

    /// Builds the index from well-formed edges (default terminal sentinel).
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = FlowEdge>,
    {
        Self::build(edges.into_iter().map(FlowRow::from))
    }

    /// Builds the index from raw `(from, to)` pairs (default terminal
    /// sentinel).
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        Self::build(pairs.into_iter().map(FlowRow::from))
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Reaches immediately downstream of `id`. Empty for unknown ids.
    pub fn successors(&self, id: ReachId) -> impl Iterator<Item = ReachId> + '_ {
        self.graph.neighbors_directed(id, petgraph::Direction::Outgoing)
    }

    /// Reaches immediately upstream of `id`. Empty for unknown ids.
    pub fn predecessors(&self, id: ReachId) -> impl Iterator<Item = ReachId> + '_ {
        self.graph.neighbors_directed(id, petgraph::Direction::Incoming)
    }

    /// Returns `true` if the reach appears in the table (as an edge endpoint
    /// or an outlet).
    pub fn contains(&self, id: ReachId) -> bool {
        self.graph.contains_node(id)
    }

    /// Returns `true` if the edge `from -> to` was inserted.
    pub fn contains_edge(&self, from: ReachId, to: ReachId) -> bool {
        self.graph.contains_edge(from, to)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The terminal sentinel this index was built with.
    pub fn terminal(&self) -> ReachId {
        self.terminal
    }

    /// Counters from the build.
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// All known reaches, in first-seen order.
    pub fn reaches(&self) -> impl Iterator<Item = ReachId> + '_ {
        self.graph.nodes()
    }

    /// All inserted edges.
    pub fn edges(&self) -> impl Iterator<Item = FlowEdge> + '_ {
        self.graph
            .all_edges()
            .map(|(from, to, _)| FlowEdge::new(from, to))
    }

    /// An index over the reversed edge set: every `(a, b)` becomes `(b, a)`.
    ///
    /// Reaches without edges are carried over. Downstream traversal on the
    /// reversed index visits what upstream traversal visits on this one.
    pub fn reversed(&self) -> FlowGraphIndex {
        let mut graph = DiGraphMap::with_capacity(self.node_count(), self.edge_count());
        for id in self.graph.nodes() {
            graph.add_node(id);
        }
        for (from, to, _) in self.graph.all_edges() {
            graph.add_edge(to, from, ());
        }

        let stats = BuildStats {
            rows_read: self.edge_count() as u64,
            edges_inserted: self.edge_count() as u64,
            self_loops: self.stats.self_loops,
            ..BuildStats::default()
        };

        FlowGraphIndex {
            graph,
            terminal: self.terminal,
            stats,
        }
    }
}

impl Adjacency for FlowGraphIndex {
    fn neighbors(&self, id: ReachId, direction: Direction) -> impl Iterator<Item = ReachId> + '_ {
        self.graph.neighbors_directed(id, direction.into())
    }
}
