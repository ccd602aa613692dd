//! Core data model for hydrologic network tracing.
//!
//! # Modules
//!
//! - [`id`]: ReachId newtype and the terminal sentinel
//! - [`edge`]: FlowRow, FlowEdge and traversal Direction
//! - [`graph`]: FlowGraphIndex, its builder, and the Adjacency seam
//! - [`error`]: CoreError

pub mod edge;
pub mod error;
pub mod graph;
pub mod id;

// Re-export commonly used types
pub use edge::{Direction, FlowEdge, FlowRow};
pub use error::CoreError;
pub use graph::{Adjacency, BuildStats, FlowGraphBuilder, FlowGraphIndex};
pub use id::ReachId;
