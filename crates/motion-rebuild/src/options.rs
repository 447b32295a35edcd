// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tunables for one rebuild.

use serde::{Deserialize, Serialize};

/// Rebuild behaviour switches. Serializable so hosts can persist them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebuildOptions {
    /// Queue an owner's edges when a target is not cloned yet and retry after
    /// the whole walk. When off, such edges are dropped immediately.
    pub defer_unresolved_edges: bool,
    /// When a machine's default node does not resolve to one of its cloned
    /// children, use the first cloned child instead of leaving it unset.
    pub fallback_default_to_first: bool,
    /// Run the behaviour migration stage.
    pub migrate_behaviours: bool,
    /// Persist the partial clone when the rebuild is cancelled.
    pub persist_on_cancel: bool,
}

impl Default for RebuildOptions {
    fn default() -> Self {
        Self {
            defer_unresolved_edges: true,
            fallback_default_to_first: true,
            migrate_behaviours: true,
            persist_on_cancel: true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let options: RebuildOptions =
            serde_json::from_str(r#"{"migrate_behaviours": false}"#).unwrap();
        assert!(!options.migrate_behaviours);
        assert!(options.defer_unresolved_edges);
        assert!(options.fallback_default_to_first);
    }
}
