//! Breadth-first reachability over the flow network.
//!
//! [`ReachabilityTracer`] walks any [`Adjacency`] (the full index or a
//! restricted view) from a set of seeds in one direction and returns every
//! reach visited, seeds included. A reach enters the work queue at most once,
//! so cycles and self-loops cannot keep the walk alive.
//!
//! Size control comes from [`TraceConfig`]:
//! - `warn_threshold`: log a warning once when the visited set grows past it,
//!   then keep going.
//! - `max_visited`: stop and return [`TraceError::Oversized`] instead of
//!   silently truncating.

use std::collections::{HashSet, VecDeque};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use flowtrace_core::{Adjacency, Direction, ReachId};

use crate::config::TraceConfig;
use crate::error::TraceError;

/// Counters from one trace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStats {
    /// Distinct seeds the trace started from.
    pub seeds: usize,
    /// Reaches visited, seeds included.
    pub visited: usize,
    /// Reaches whose neighbors were looked up.
    pub expanded: usize,
    /// Longest hop count from a seed to a visited reach.
    pub max_depth: usize,
    /// The visited count went past `warn_threshold`. Callers may escalate.
    pub warn_threshold_exceeded: bool,
}

/// The reaches visited by one trace.
///
/// Iteration follows discovery order: seeds first, then breadth-first by hop
/// count. Equality is set equality and ignores that order.
#[derive(Debug, Clone)]
pub struct ReachableSet {
    ids: IndexSet<ReachId>,
    seed_count: usize,
    direction: Direction,
    stats: TraceStats,
}

impl ReachableSet {
    /// An empty result (no seeds).
    pub fn empty(direction: Direction) -> Self {
        ReachableSet {
            ids: IndexSet::new(),
            seed_count: 0,
            direction,
            stats: TraceStats::default(),
        }
    }

    pub fn contains(&self, id: ReachId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// All visited reaches in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = ReachId> + '_ {
        self.ids.iter().copied()
    }

    /// The distinct seeds, in the order they were given.
    pub fn seeds(&self) -> impl Iterator<Item = ReachId> + '_ {
        self.ids.iter().take(self.seed_count).copied()
    }

    /// Visited reaches excluding the seeds ("strictly downstream/upstream").
    pub fn without_seeds(&self) -> impl Iterator<Item = ReachId> + '_ {
        self.ids.iter().skip(self.seed_count).copied()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn stats(&self) -> &TraceStats {
        &self.stats
    }

    /// Returns `true` if every reach in `self` is also in `other`.
    pub fn is_subset(&self, other: &ReachableSet) -> bool {
        self.ids.is_subset(&other.ids)
    }

    /// Visited reaches in ascending id order.
    pub fn sorted(&self) -> Vec<ReachId> {
        let mut ids: Vec<ReachId> = self.iter().collect();
        ids.sort_unstable();
        ids
    }

    pub fn to_hash_set(&self) -> HashSet<ReachId> {
        self.iter().collect()
    }

    pub fn into_ids(self) -> IndexSet<ReachId> {
        self.ids
    }
}

impl PartialEq for ReachableSet {
    fn eq(&self, other: &Self) -> bool {
        self.ids == other.ids
    }
}

impl Eq for ReachableSet {}

/// Seeded breadth-first tracer.
#[derive(Debug, Clone, Default)]
pub struct ReachabilityTracer {
    config: TraceConfig,
}

impl ReachabilityTracer {
    pub fn new(config: TraceConfig) -> Self {
        ReachabilityTracer { config }
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Traces from every seed at once and returns all reaches visited.
    ///
    /// An empty seed set yields an empty result. Fails only when
    /// `max_visited` is configured and exceeded.
    pub fn trace<G, I>(
        &self,
        graph: &G,
        seeds: I,
        direction: Direction,
    ) -> Result<ReachableSet, TraceError>
    where
        G: Adjacency,
        I: IntoIterator<Item = ReachId>,
    {
        let mut visited: IndexSet<ReachId> = seeds.into_iter().collect();
        let seed_count = visited.len();
        if seed_count == 0 {
            return Ok(ReachableSet::empty(direction));
        }

        let mut stats = TraceStats {
            seeds: seed_count,
            ..TraceStats::default()
        };
        let mut warned = false;
        self.check_growth(visited.len(), direction, &mut warned)?;

        let mut queue: VecDeque<(ReachId, usize)> = visited.iter().map(|&id| (id, 0)).collect();

        while let Some((id, depth)) = queue.pop_front() {
            stats.expanded += 1;
            for next in graph.neighbors(id, direction) {
                if visited.insert(next) {
                    stats.max_depth = stats.max_depth.max(depth + 1);
                    queue.push_back((next, depth + 1));
                    self.check_growth(visited.len(), direction, &mut warned)?;
                }
            }
        }

        stats.visited = visited.len();
        stats.warn_threshold_exceeded = warned;
        debug!(
            %direction,
            seeds = stats.seeds,
            visited = stats.visited,
            max_depth = stats.max_depth,
            "trace complete"
        );

        Ok(ReachableSet {
            ids: visited,
            seed_count,
            direction,
            stats,
        })
    }

    /// Traces each seed on its own and keys the results by seed.
    ///
    /// Duplicate seeds are traced once. The first oversized trace fails the
    /// whole call.
    pub fn trace_each<G, I>(
        &self,
        graph: &G,
        seeds: I,
        direction: Direction,
    ) -> Result<IndexMap<ReachId, ReachableSet>, TraceError>
    where
        G: Adjacency,
        I: IntoIterator<Item = ReachId>,
    {
        let mut traces = IndexMap::new();
        for seed in seeds {
            if traces.contains_key(&seed) {
                continue;
            }
            let reachable = self.trace(graph, [seed], direction)?;
            info!(
                %seed,
                %direction,
                visited = reachable.len(),
                "traced features for seed"
            );
            traces.insert(seed, reachable);
        }
        Ok(traces)
    }

    fn check_growth(
        &self,
        visited: usize,
        direction: Direction,
        warned: &mut bool,
    ) -> Result<(), TraceError> {
        if let Some(limit) = self.config.max_visited {
            if visited > limit {
                warn!(%direction, visited, limit, "trace exceeded the visited ceiling");
                return Err(TraceError::Oversized {
                    direction,
                    visited,
                    limit,
                });
            }
        }
        if let Some(threshold) = self.config.warn_threshold {
            if !*warned && visited > threshold {
                *warned = true;
                warn!(
                    %direction,
                    visited,
                    threshold,
                    "trace is larger than the warning threshold; continuing"
                );
            }
        }
        Ok(())
    }
}

/// The reaches one hop away from the seeds, excluding the seeds themselves.
///
/// This is the "select next upstream / downstream feature" step on its own,
/// without following the network any further.
pub fn next_hop<G, I>(graph: &G, seeds: I, direction: Direction) -> IndexSet<ReachId>
where
    G: Adjacency,
    I: IntoIterator<Item = ReachId>,
{
    let seeds: IndexSet<ReachId> = seeds.into_iter().collect();
    let mut hop = IndexSet::new();
    for &id in &seeds {
        for next in graph.neighbors(id, direction) {
            if !seeds.contains(&next) {
                hop.insert(next);
            }
        }
    }
    hop
}
