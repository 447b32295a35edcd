// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Source-handle → clone-handle map for one rebuild.

use std::collections::BTreeMap;

use motion_graph::NodeId;
use tracing::warn;

/// Append-only mapping from source node handles to their clones.
///
/// One map is created per rebuild call and threaded by `&mut` through every
/// recursive clone step. Lookups do not depend on insertion order, so an edge
/// can resolve a target cloned at any depth of the walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityMap {
    entries: BTreeMap<NodeId, NodeId>,
}

impl IdentityMap {
    /// Empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `source` was cloned as `clone`.
    ///
    /// Each source is registered exactly once by the node cloner. A second
    /// registration is a logic error: debug builds assert, release builds log
    /// and overwrite so a long rebuild is not aborted.
    pub fn register(&mut self, source: NodeId, clone: NodeId) {
        let previous = self.entries.insert(source, clone);
        debug_assert!(
            previous.is_none(),
            "source node {source} registered twice (was {previous:?}, now {clone})"
        );
        if let Some(previous) = previous {
            warn!(%source, %previous, %clone, "identity map entry overwritten");
        }
    }

    /// Clone handle for `source`, if it has been cloned.
    #[must_use]
    pub fn resolve(&self, source: NodeId) -> Option<NodeId> {
        self.entries.get(&source).copied()
    }

    /// Returns `true` if `source` has been cloned.
    #[must_use]
    pub fn contains(&self, source: NodeId) -> bool {
        self.entries.contains_key(&source)
    }

    /// Number of registered nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(source, clone)` pairs in source-handle order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.entries.iter().map(|(s, c)| (*s, *c))
    }
}
