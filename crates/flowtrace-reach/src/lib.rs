//! Reachability tracing over a [`flowtrace_core::FlowGraphIndex`].
//!
//! # Modules
//!
//! - [`tracer`]: seeded breadth-first traces, per-seed traces and next-hop lookup
//! - [`scope`]: buffer-scoped selection for a single site
//! - [`batch`]: per-site batch runner, sequential or on rayon
//! - [`config`]: TraceConfig and ScopeMode
//! - [`error`]: TraceError

pub mod batch;
pub mod config;
pub mod error;
pub mod scope;
pub mod tracer;

pub use batch::{
    run_batch, run_batch_parallel, AbortHandle, BatchReport, NoResultReason, SiteBatch, SiteKey,
    SiteOutcome, SiteReport, SiteScope,
};
pub use config::{ScopeMode, TraceConfig};
pub use error::TraceError;
pub use scope::{select_in_scope, LocalView, ScopeStatus, ScopedDownstreamSelector, ScopedSelection};
pub use tracer::{next_hop, ReachabilityTracer, ReachableSet, TraceStats};
