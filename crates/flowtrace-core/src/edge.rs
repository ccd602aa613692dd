//! Flow-table rows, directed flow edges and traversal direction.
//!
//! A [`FlowRow`] is what a flow-table reader hands us: two cells that may be
//! missing. A [`FlowEdge`] is a row with both endpoints present. Whether an
//! edge is a real connection or a terminal marker is decided by the graph
//! builder, which knows the sentinel in use.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::ReachId;

// ---------------------------------------------------------------------------
// Rows and edges
// ---------------------------------------------------------------------------

/// One raw row of a flow-relationship table (`FROMCOMID`, `TOCOMID`).
///
/// Either cell may be absent (NULL, empty, unparseable). Such rows are
/// malformed and skipped by the graph builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowRow {
    pub from: Option<ReachId>,
    pub to: Option<ReachId>,
}

impl FlowRow {
    /// A row with both cells present.
    pub fn new(from: ReachId, to: ReachId) -> Self {
        FlowRow {
            from: Some(from),
            to: Some(to),
        }
    }
}

impl From<(u64, u64)> for FlowRow {
    fn from((from, to): (u64, u64)) -> Self {
        FlowRow::new(ReachId(from), ReachId(to))
    }
}

impl From<FlowEdge> for FlowRow {
    fn from(edge: FlowEdge) -> Self {
        FlowRow::new(edge.from, edge.to)
    }
}

/// A directed flow relationship: water leaves `from` and enters `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlowEdge {
    pub from: ReachId,
    pub to: ReachId,
}

impl FlowEdge {
    pub fn new(from: ReachId, to: ReachId) -> Self {
        FlowEdge { from, to }
    }

    /// The same relationship with the endpoints swapped.
    pub fn reversed(self) -> Self {
        FlowEdge {
            from: self.to,
            to: self.from,
        }
    }

    /// Returns `true` if the edge starts and ends on the same reach.
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

impl TryFrom<FlowRow> for FlowEdge {
    type Error = CoreError;

    fn try_from(row: FlowRow) -> Result<Self, Self::Error> {
        match (row.from, row.to) {
            (Some(from), Some(to)) => Ok(FlowEdge { from, to }),
            (from, to) => Err(CoreError::MalformedEdgeRow { from, to }),
        }
    }
}

impl From<(u64, u64)> for FlowEdge {
    fn from((from, to): (u64, u64)) -> Self {
        FlowEdge::new(ReachId(from), ReachId(to))
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Traversal direction over the flow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Follow edges in the direction of flow (successors).
    #[default]
    Downstream,
    /// Follow edges against the direction of flow (predecessors).
    Upstream,
}

impl Direction {
    /// The opposite traversal direction.
    pub fn opposite(self) -> Self {
        match self {
            Direction::Downstream => Direction::Upstream,
            Direction::Upstream => Direction::Downstream,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Downstream => write!(f, "downstream"),
            Direction::Upstream => write!(f, "upstream"),
        }
    }
}

// Bridge to petgraph's edge direction.

impl From<Direction> for petgraph::Direction {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Downstream => petgraph::Direction::Outgoing,
            Direction::Upstream => petgraph::Direction::Incoming,
        }
    }
}
