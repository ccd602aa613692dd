//! Reach identifiers for the flow network.
//!
//! A [`ReachId`] is an opaque key for one catchment or flowline segment. In
//! NHDPlus-style tables this is the COMID / FEATUREID column, so the inner
//! value is a `u64`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a catchment / reach in the flow network.
///
/// Ordered and hashable so it can key both hash maps and the graph index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReachId(pub u64);

impl ReachId {
    /// Default terminal sentinel: a `to` value of 0 means "no downstream
    /// successor", and a `from` value of 0 means "no upstream predecessor".
    pub const TERMINAL: ReachId = ReachId(0);

    /// Returns `true` if this id equals the default terminal sentinel.
    pub fn is_terminal(self) -> bool {
        self == Self::TERMINAL
    }
}

impl fmt::Display for ReachId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ReachId {
    fn from(raw: u64) -> Self {
        ReachId(raw)
    }
}

impl From<ReachId> for u64 {
    fn from(id: ReachId) -> Self {
        id.0
    }
}
