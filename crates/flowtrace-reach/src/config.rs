//! Trace configuration.
//!
//! [`TraceConfig`] carries the tunables shared by the tracer, the scoped
//! selector and the batch runner. Every field has a default, so a JSON file
//! only needs to name the fields it changes:
//!
//! ```json
//! { "warn_threshold": 5000, "max_visited": 250000, "scope_mode": "FullGraphClip" }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TraceError;

/// How the scoped selector restricts a trace to a site's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScopeMode {
    /// Only expand reaches inside the buffer (plus the site's own seeds).
    /// Cost is bounded by buffer size; a path that leaves the buffer and
    /// re-enters it further down is not followed.
    #[default]
    LocalView,
    /// Trace the whole network, then clip the result to the buffer. Exact,
    /// but a seed on a major trunk can visit a large share of the network.
    FullGraphClip,
}

/// Tunables for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Visited count above which a trace logs a size warning (once) and
    /// keeps going. `None` disables the warning.
    pub warn_threshold: Option<usize>,
    /// Hard ceiling on visited reaches per trace. Exceeding it fails that
    /// trace with [`TraceError::Oversized`]. `None` means unbounded.
    pub max_visited: Option<usize>,
    /// Restriction strategy used by the scoped selector.
    pub scope_mode: ScopeMode,
}

impl Default for TraceConfig {
    fn default() -> Self {
        TraceConfig {
            warn_threshold: Some(10_000),
            max_visited: None,
            scope_mode: ScopeMode::LocalView,
        }
    }
}

impl TraceConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, TraceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, TraceError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn with_warn_threshold(mut self, threshold: Option<usize>) -> Self {
        self.warn_threshold = threshold;
        self
    }

    pub fn with_max_visited(mut self, limit: Option<usize>) -> Self {
        self.max_visited = limit;
        self
    }

    pub fn with_scope_mode(mut self, mode: ScopeMode) -> Self {
        self.scope_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TraceConfig::default();
        assert_eq!(config.warn_threshold, Some(10_000));
        assert_eq!(config.max_visited, None);
        assert_eq!(config.scope_mode, ScopeMode::LocalView);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = TraceConfig::from_json_str(r#"{ "max_visited": 500 }"#).unwrap();
        assert_eq!(config.max_visited, Some(500));
        assert_eq!(config.warn_threshold, Some(10_000));
        assert_eq!(config.scope_mode, ScopeMode::LocalView);
    }

    #[test]
    fn full_json() {
        let config = TraceConfig::from_json_str(
            r#"{ "warn_threshold": null, "max_visited": 10, "scope_mode": "FullGraphClip" }"#,
        )
        .unwrap();
        assert_eq!(
            config,
            TraceConfig::default()
                .with_warn_threshold(None)
                .with_max_visited(Some(10))
                .with_scope_mode(ScopeMode::FullGraphClip)
        );
    }

    #[test]
    fn invalid_json_is_config_error() {
        let err = TraceConfig::from_json_str(r#"{ "scope_mode": "Sideways" }"#).unwrap_err();
        assert!(matches!(err, TraceError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json");
        std::fs::write(&path, r#"{ "warn_threshold": 42 }"#).unwrap();

        let config = TraceConfig::load(&path).unwrap();
        assert_eq!(config.warn_threshold, Some(42));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TraceConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, TraceError::Io(_)));
    }
}
