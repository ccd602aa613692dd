//! In-memory implementation of [`FlowTableSource`].

use flowtrace_core::{FlowRow, ReachId};

use crate::error::StorageError;
use crate::traits::FlowTableSource;

/// Flow rows held in a `Vec`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryFlowTable {
    rows: Vec<FlowRow>,
}

impl InMemoryFlowTable {
    pub fn new(rows: Vec<FlowRow>) -> Self {
        InMemoryFlowTable { rows }
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        InMemoryFlowTable {
            rows: pairs.into_iter().map(FlowRow::from).collect(),
        }
    }

    pub fn push(&mut self, from: Option<ReachId>, to: Option<ReachId>) {
        self.rows.push(FlowRow { from, to });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FlowTableSource for InMemoryFlowTable {
    fn describe(&self) -> String {
        format!("in-memory flow table ({} rows)", self.rows.len())
    }

    fn for_each_row(&self, f: &mut dyn FnMut(FlowRow)) -> Result<u64, StorageError> {
        for row in &self.rows {
            f(*row);
        }
        Ok(self.rows.len() as u64)
    }
}
