//! Flow-table readers for the hydrologic network.
//!
//! A flow table is any source of (from, to) reach pairs, one row per
//! flowline. Every backend implements [`FlowTableSource`], which streams raw
//! rows into a callback; [`load_flow_graph`] feeds those rows into a
//! [`flowtrace_core::FlowGraphBuilder`] and is the one place read failures
//! are fatal.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`types`]: FlowColumns column configuration
//! - [`traits`]: FlowTableSource trait definition
//! - [`memory`]: InMemoryFlowTable implementation
//! - [`schema`]: identifier quoting and table/column checks for SQLite
//! - [`sqlite`]: SqliteFlowTable implementation
//! - [`json`]: JsonFlowTable implementation
//! - [`load`]: load_flow_graph

pub mod error;
pub mod json;
pub mod load;
pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic use.
pub use error::StorageError;
pub use json::JsonFlowTable;
pub use load::load_flow_graph;
pub use memory::InMemoryFlowTable;
pub use sqlite::SqliteFlowTable;
pub use traits::FlowTableSource;
pub use types::FlowColumns;
