// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Node handles.

use serde::{Deserialize, Serialize};

/// Opaque handle for a node (state or state machine) in a [`crate::MotionGraph`].
///
/// A `NodeId` is an index into the graph's node arena. Handles are only
/// meaningful for the graph that issued them: a clone of a graph has its own
/// handle space, and the rebuild engine maps between the two explicitly.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Arena slot for this handle.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
