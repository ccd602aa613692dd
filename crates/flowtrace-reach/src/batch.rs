//! Per-site batch runner.
//!
//! Runs the scoped selector for every restoration site against one shared
//! index. A site that cannot be resolved (no seeds, nothing in scope, or an
//! oversized trace) is recorded as [`SiteOutcome::NoResult`] and the run moves
//! on. Only the [`AbortHandle`] stops a run early.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use flowtrace_core::{Direction, FlowGraphIndex, ReachId};

use crate::config::TraceConfig;
use crate::error::TraceError;
use crate::scope::{ScopeStatus, ScopedDownstreamSelector};
use crate::tracer::TraceStats;

/// Caller-side identifier of a restoration site.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SiteKey(pub i64);

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "site {}", self.0)
    }
}

/// The spatial inputs for one site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteScope {
    pub site: SiteKey,
    /// Catchments the site geometry overlaps.
    pub seeds: HashSet<ReachId>,
    /// Catchments intersecting the site's buffer.
    pub candidates: HashSet<ReachId>,
}

impl SiteScope {
    pub fn new<S, C>(site: SiteKey, seeds: S, candidates: C) -> Self
    where
        S: IntoIterator<Item = ReachId>,
        C: IntoIterator<Item = ReachId>,
    {
        SiteScope {
            site,
            seeds: seeds.into_iter().collect(),
            candidates: candidates.into_iter().collect(),
        }
    }
}

/// Why a site produced no selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoResultReason {
    NoSeeds,
    NothingInScope,
    Oversized { visited: usize, limit: usize },
    Failed { message: String },
}

impl From<TraceError> for NoResultReason {
    fn from(err: TraceError) -> Self {
        match err {
            TraceError::Oversized { visited, limit, .. } => {
                NoResultReason::Oversized { visited, limit }
            }
            other => NoResultReason::Failed {
                message: other.to_string(),
            },
        }
    }
}

/// What happened to one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteOutcome {
    /// In-scope reaches in ascending id order.
    Selected { ids: Vec<ReachId>, trace: TraceStats },
    NoResult { reason: NoResultReason },
    /// The run was aborted before this site was processed.
    Aborted,
}

impl SiteOutcome {
    pub fn is_selected(&self) -> bool {
        matches!(self, SiteOutcome::Selected { .. })
    }

    /// The selected reaches, or an empty slice.
    pub fn ids(&self) -> &[ReachId] {
        match self {
            SiteOutcome::Selected { ids, .. } => ids,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteReport {
    pub site: SiteKey,
    pub outcome: SiteOutcome,
}

/// Outcomes for a whole run, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub direction: Direction,
    pub sites: Vec<SiteReport>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.sites.iter().filter(|s| s.outcome.is_selected()).count()
    }

    pub fn no_result_count(&self) -> usize {
        self.sites
            .iter()
            .filter(|s| matches!(s.outcome, SiteOutcome::NoResult { .. }))
            .count()
    }

    pub fn aborted_count(&self) -> usize {
        self.sites
            .iter()
            .filter(|s| matches!(s.outcome, SiteOutcome::Aborted))
            .count()
    }

    pub fn get(&self, site: SiteKey) -> Option<&SiteOutcome> {
        self.sites
            .iter()
            .find(|s| s.site == site)
            .map(|s| &s.outcome)
    }
}

/// Shared run-level abort flag.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    aborted: Arc<AtomicBool>,
}

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Relaxed)
    }
}

/// A configured batch over one index.
#[derive(Debug, Clone)]
pub struct SiteBatch<'g> {
    selector: ScopedDownstreamSelector<'g>,
    direction: Direction,
    abort: AbortHandle,
}

impl<'g> SiteBatch<'g> {
    pub fn new(graph: &'g FlowGraphIndex, config: TraceConfig, direction: Direction) -> Self {
        SiteBatch {
            selector: ScopedDownstreamSelector::new(graph, config),
            direction,
            abort: AbortHandle::new(),
        }
    }

    /// Uses an externally owned abort flag.
    pub fn with_abort(mut self, abort: AbortHandle) -> Self {
        self.abort = abort;
        self
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Processes sites one after another.
    pub fn run(&self, sites: &[SiteScope]) -> BatchReport {
        let total = sites.len();
        let reports = sites
            .iter()
            .enumerate()
            .map(|(index, scope)| self.run_site(index, total, scope))
            .collect();
        self.finish(reports)
    }

    /// Processes sites on the rayon pool. Reports keep input order.
    pub fn run_parallel(&self, sites: &[SiteScope]) -> BatchReport {
        let total = sites.len();
        let reports = sites
            .par_iter()
            .enumerate()
            .map(|(index, scope)| self.run_site(index, total, scope))
            .collect();
        self.finish(reports)
    }

    fn run_site(&self, index: usize, total: usize, scope: &SiteScope) -> SiteReport {
        if self.abort.is_aborted() {
            return SiteReport {
                site: scope.site,
                outcome: SiteOutcome::Aborted,
            };
        }

        let outcome = match self
            .selector
            .select_in_scope(&scope.seeds, &scope.candidates, self.direction)
        {
            Ok(selection) => match selection.status {
                ScopeStatus::Resolved => SiteOutcome::Selected {
                    ids: selection.sorted_ids(),
                    trace: selection.trace,
                },
                ScopeStatus::NoSeeds => SiteOutcome::NoResult {
                    reason: NoResultReason::NoSeeds,
                },
                ScopeStatus::NothingInScope => SiteOutcome::NoResult {
                    reason: NoResultReason::NothingInScope,
                },
            },
            Err(err) => {
                warn!(site = %scope.site, error = %err, "site trace failed; continuing");
                SiteOutcome::NoResult {
                    reason: err.into(),
                }
            }
        };

        debug!(
            site = %scope.site,
            selected = outcome.ids().len(),
            "determined catchments {} for site {} of {}",
            self.direction,
            index + 1,
            total
        );

        SiteReport {
            site: scope.site,
            outcome,
        }
    }

    fn finish(&self, sites: Vec<SiteReport>) -> BatchReport {
        let report = BatchReport {
            direction: self.direction,
            sites,
        };
        info!(
            direction = %report.direction,
            sites = report.len(),
            selected = report.selected_count(),
            no_result = report.no_result_count(),
            aborted = report.aborted_count(),
            "site batch complete"
        );
        report
    }
}

/// Runs every site sequentially.
pub fn run_batch(
    graph: &FlowGraphIndex,
    sites: &[SiteScope],
    config: TraceConfig,
    direction: Direction,
) -> BatchReport {
    SiteBatch::new(graph, config, direction).run(sites)
}

/// Runs every site on the rayon pool.
pub fn run_batch_parallel(
    graph: &FlowGraphIndex,
    sites: &[SiteScope],
    config: TraceConfig,
    direction: Direction,
) -> BatchReport {
    SiteBatch::new(graph, config, direction).run_parallel(sites)
}
