//! Column configuration and cell-to-id conversion for flow tables.

use serde::{Deserialize, Serialize};

use flowtrace_core::ReachId;

/// Names of the two columns that make up a flow row.
///
/// Defaults to the NHDPlus flow table layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowColumns {
    /// Upstream reach of the flowline.
    pub from: String,
    /// Downstream reach of the flowline.
    pub to: String,
}

impl Default for FlowColumns {
    fn default() -> Self {
        FlowColumns {
            from: "FROMCOMID".to_string(),
            to: "TOCOMID".to_string(),
        }
    }
}

impl FlowColumns {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        FlowColumns {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Accepts integral, non-negative values that fit in a `u64`.
pub(crate) fn reach_from_f64(v: f64) -> Option<ReachId> {
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v < u64::MAX as f64 {
        Some(ReachId(v as u64))
    } else {
        None
    }
}

pub(crate) fn reach_from_text(text: &str) -> Option<ReachId> {
    let text = text.trim();
    text.parse::<u64>()
        .ok()
        .map(ReachId)
        .or_else(|| text.parse::<f64>().ok().and_then(reach_from_f64))
}
