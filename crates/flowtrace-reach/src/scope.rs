//! Buffer-scoped selection: which reaches inside a site's buffer are
//! hydrologically downstream (or upstream) of the site.
//!
//! Per restoration site the caller supplies:
//! - `site_seeds`: catchments the site geometry overlaps
//! - `local_candidates`: catchments intersecting the fixed-radius buffer
//!
//! The selector traces from the seeds and keeps only candidates. With
//! [`ScopeMode::LocalView`] the trace itself is restricted: only candidates
//! (and the seeds themselves) are expanded, so the walk stops one hop past
//! the buffer edge. With [`ScopeMode::FullGraphClip`] the whole network is
//! traced and clipped afterwards. The final intersection with the candidates
//! runs in both modes; candidate sets come from geometry and do not always
//! line up with graph ids at the buffer edge.

use std::collections::HashSet;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::warn;

use flowtrace_core::{Adjacency, Direction, FlowGraphIndex, ReachId};

use crate::config::{ScopeMode, TraceConfig};
use crate::error::TraceError;
use crate::tracer::{ReachabilityTracer, TraceStats};

/// Outcome classification for one scoped selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeStatus {
    /// At least one traced reach lies inside the scope.
    Resolved,
    /// The site overlapped no catchment; nothing was traced.
    NoSeeds,
    /// The trace reached no candidate. The site's result is not restricted
    /// by connectivity.
    NothingInScope,
}

/// The in-scope reach set for one site.
#[derive(Debug, Clone, Serialize)]
pub struct ScopedSelection {
    /// Traced reaches that are also candidates, in discovery order.
    pub ids: IndexSet<ReachId>,
    pub status: ScopeStatus,
    pub mode: ScopeMode,
    pub trace: TraceStats,
}

impl ScopedSelection {
    fn unresolved(status: ScopeStatus, mode: ScopeMode, trace: TraceStats) -> Self {
        ScopedSelection {
            ids: IndexSet::new(),
            status,
            mode,
            trace,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected reaches in ascending id order.
    pub fn sorted_ids(&self) -> Vec<ReachId> {
        let mut ids: Vec<ReachId> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// A view of the index that only expands candidates and seeds.
///
/// Any other reach is a dead end: it can be visited, but its neighbors are
/// not looked up.
#[derive(Debug, Clone, Copy)]
pub struct LocalView<'a> {
    graph: &'a FlowGraphIndex,
    candidates: &'a HashSet<ReachId>,
    seeds: &'a HashSet<ReachId>,
}

impl<'a> LocalView<'a> {
    pub fn new(
        graph: &'a FlowGraphIndex,
        candidates: &'a HashSet<ReachId>,
        seeds: &'a HashSet<ReachId>,
    ) -> Self {
        LocalView {
            graph,
            candidates,
            seeds,
        }
    }

    fn expands(&self, id: ReachId) -> bool {
        self.candidates.contains(&id) || self.seeds.contains(&id)
    }
}

impl Adjacency for LocalView<'_> {
    fn neighbors(&self, id: ReachId, direction: Direction) -> impl Iterator<Item = ReachId> + '_ {
        let expand = self.expands(id);
        self.graph
            .neighbors(id, direction)
            .filter(move |_| expand)
    }
}

/// Per-site selector over a shared, read-only [`FlowGraphIndex`].
#[derive(Debug, Clone)]
pub struct ScopedDownstreamSelector<'g> {
    graph: &'g FlowGraphIndex,
    tracer: ReachabilityTracer,
}

impl<'g> ScopedDownstreamSelector<'g> {
    pub fn new(graph: &'g FlowGraphIndex, config: TraceConfig) -> Self {
        ScopedDownstreamSelector {
            graph,
            tracer: ReachabilityTracer::new(config),
        }
    }

    pub fn graph(&self) -> &'g FlowGraphIndex {
        self.graph
    }

    pub fn config(&self) -> &TraceConfig {
        self.tracer.config()
    }

    /// Selects the candidates reachable from the site's seeds.
    ///
    /// Empty seeds or an empty intersection are not errors: the selection is
    /// empty, its status says why, and a warning is logged. Fails only when
    /// the trace exceeds `max_visited`.
    pub fn select_in_scope(
        &self,
        site_seeds: &HashSet<ReachId>,
        local_candidates: &HashSet<ReachId>,
        direction: Direction,
    ) -> Result<ScopedSelection, TraceError> {
        let mode = self.config().scope_mode;

        if site_seeds.is_empty() {
            warn!(%direction, "site overlaps no catchment; result not limited by connectivity");
            return Ok(ScopedSelection::unresolved(
                ScopeStatus::NoSeeds,
                mode,
                TraceStats::default(),
            ));
        }

        // Sorted so discovery order does not depend on hash iteration.
        let mut seeds: Vec<ReachId> = site_seeds.iter().copied().collect();
        seeds.sort_unstable();

        let reachable = match mode {
            ScopeMode::LocalView => {
                let view = LocalView::new(self.graph, local_candidates, site_seeds);
                self.tracer.trace(&view, seeds, direction)?
            }
            ScopeMode::FullGraphClip => self.tracer.trace(self.graph, seeds, direction)?,
        };

        let ids: IndexSet<ReachId> = reachable
            .iter()
            .filter(|id| local_candidates.contains(id))
            .collect();

        if ids.is_empty() {
            warn!(
                %direction,
                seeds = site_seeds.len(),
                candidates = local_candidates.len(),
                "no traced reach falls inside the local scope; result not limited by connectivity"
            );
            return Ok(ScopedSelection::unresolved(
                ScopeStatus::NothingInScope,
                mode,
                *reachable.stats(),
            ));
        }

        Ok(ScopedSelection {
            ids,
            status: ScopeStatus::Resolved,
            mode,
            trace: *reachable.stats(),
        })
    }
}

/// One-off scoped selection with the default configuration.
pub fn select_in_scope(
    graph: &FlowGraphIndex,
    site_seeds: &HashSet<ReachId>,
    local_candidates: &HashSet<ReachId>,
    direction: Direction,
) -> Result<ScopedSelection, TraceError> {
    ScopedDownstreamSelector::new(graph, TraceConfig::default()).select_in_scope(
        site_seeds,
        local_candidates,
        direction,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> HashSet<ReachId> {
        raw.iter().copied().map(ReachId).collect()
    }

    fn selected(selection: &ScopedSelection) -> HashSet<ReachId> {
        selection.ids.iter().copied().collect()
    }

    #[test]
    fn local_view_expands_candidates_and_seeds_only() {
        let graph = FlowGraphIndex::from_pairs([(1, 2), (2, 3), (3, 9), (9, 10)]);
        let candidates = ids(&[2, 3]);
        let seeds = ids(&[1]);
        let view = LocalView::new(&graph, &candidates, &seeds);

        assert_eq!(view.neighbors(ReachId(1), Direction::Downstream).count(), 1);
        assert_eq!(view.neighbors(ReachId(3), Direction::Downstream).count(), 1);
        assert_eq!(view.neighbors(ReachId(9), Direction::Downstream).count(), 0);
    }

    #[test]
    fn seed_outside_candidates_still_expands() {
        let graph = FlowGraphIndex::from_pairs([(1, 2), (2, 3), (3, 9)]);

        let selection =
            select_in_scope(&graph, &ids(&[1]), &ids(&[2, 3]), Direction::Downstream).unwrap();
        assert_eq!(selection.status, ScopeStatus::Resolved);
        assert_eq!(selected(&selection), ids(&[2, 3]));
        assert_eq!(selection.sorted_ids(), vec![ReachId(2), ReachId(3)]);
    }

    #[test]
    fn local_view_stops_one_hop_past_the_buffer() {
        // 3 -> 9 leaves the buffer, 9 -> 4 re-enters it.
        let graph = FlowGraphIndex::from_pairs([(1, 2), (2, 3), (3, 9), (9, 4)]);
        let candidates = ids(&[1, 2, 3, 4]);

        let local = ScopedDownstreamSelector::new(&graph, TraceConfig::default())
            .select_in_scope(&ids(&[1]), &candidates, Direction::Downstream)
            .unwrap();
        assert_eq!(selected(&local), ids(&[1, 2, 3]));
        assert_eq!(local.mode, ScopeMode::LocalView);

        let full = ScopedDownstreamSelector::new(
            &graph,
            TraceConfig::default().with_scope_mode(ScopeMode::FullGraphClip),
        )
        .select_in_scope(&ids(&[1]), &candidates, Direction::Downstream)
        .unwrap();
        assert_eq!(selected(&full), ids(&[1, 2, 3, 4]));
        assert_eq!(full.mode, ScopeMode::FullGraphClip);
    }

    #[test]
    fn empty_seeds_are_reported() {
        let graph = FlowGraphIndex::from_pairs([(1, 2)]);

        let selection =
            select_in_scope(&graph, &ids(&[]), &ids(&[1, 2]), Direction::Downstream).unwrap();
        assert!(selection.is_empty());
        assert_eq!(selection.status, ScopeStatus::NoSeeds);
    }

    #[test]
    fn disconnected_seed_is_nothing_in_scope() {
        let graph = FlowGraphIndex::from_pairs([(1, 2), (2, 3), (7, 8)]);

        let selection =
            select_in_scope(&graph, &ids(&[7]), &ids(&[2, 3]), Direction::Downstream).unwrap();
        assert!(selection.is_empty());
        assert_eq!(selection.status, ScopeStatus::NothingInScope);
        assert_eq!(selection.trace.visited, 2);
    }

    #[test]
    fn upstream_scope() {
        let graph = FlowGraphIndex::from_pairs([(1, 2), (2, 3), (4, 3)]);

        let selection =
            select_in_scope(&graph, &ids(&[3]), &ids(&[1, 2, 3]), Direction::Upstream).unwrap();
        assert_eq!(selected(&selection), ids(&[1, 2, 3]));
    }

    #[test]
    fn oversized_trace_propagates() {
        let graph = FlowGraphIndex::from_pairs([(1, 2), (2, 3), (3, 4)]);
        let selector = ScopedDownstreamSelector::new(
            &graph,
            TraceConfig::default()
                .with_scope_mode(ScopeMode::FullGraphClip)
                .with_max_visited(Some(2)),
        );

        let err = selector
            .select_in_scope(&ids(&[1]), &ids(&[1, 2]), Direction::Downstream)
            .unwrap_err();
        assert!(matches!(err, TraceError::Oversized { limit: 2, .. }));
    }
}
