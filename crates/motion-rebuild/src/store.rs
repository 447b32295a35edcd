// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Object-store port and the default arena adapter.
//!
//! The engine never builds the clone directly. Every clone-side entity goes
//! through an [`ObjectStore`], in the order the walk produces it, so a host can
//! back the rebuild with its own persistence layer. The engine never reads the
//! store's handles back into the identity map except as return values of
//! [`ObjectStore::create_node`].

use std::collections::BTreeSet;

use motion_graph::{
    Behaviour, GraphError, LayoutHint, MotionGraph, Node, NodeId, ParameterTable, Transition,
    TransitionOwner,
};
use thiserror::Error;

/// Failure reported by an object store. Always fatal to the rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing graph rejected the mutation.
    #[error("graph: {0}")]
    Graph(#[from] GraphError),
    /// The store refused the operation for its own reasons.
    #[error("store rejected {operation}: {reason}")]
    Rejected {
        /// Operation name.
        operation: &'static str,
        /// Store-specific reason.
        reason: String,
    },
}

/// Destination of a rebuild.
pub trait ObjectStore {
    /// Creates a node (a fully-populated state, or an empty machine shell) and
    /// returns its new handle.
    fn create_node(&mut self, node: Node) -> Result<NodeId, StoreError>;
    /// Appends `child` to machine `parent` at `layout`.
    fn attach_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        layout: LayoutHint,
    ) -> Result<(), StoreError>;
    /// Appends a transition to `owner`'s list. `owner` uses clone handles.
    fn push_transition(
        &mut self,
        owner: TransitionOwner,
        transition: Transition,
    ) -> Result<(), StoreError>;
    /// Sets or clears a machine's default node.
    fn set_default_node(&mut self, machine: NodeId, node: Option<NodeId>)
        -> Result<(), StoreError>;
    /// Appends a behaviour to a state or machine.
    fn attach_behaviour(&mut self, owner: NodeId, behaviour: Behaviour) -> Result<(), StoreError>;
    /// Replaces the destination parameter table.
    fn set_parameters(&mut self, parameters: ParameterTable) -> Result<(), StoreError>;
    /// Designates the clone root.
    fn set_root(&mut self, root: NodeId) -> Result<(), StoreError>;
    /// Flags an entity as modified since the last persist.
    fn mark_dirty(&mut self, id: NodeId);
    /// Flushes dirty entities.
    fn persist(&mut self) -> Result<(), StoreError>;
}

/// In-memory [`ObjectStore`] writing into a fresh [`MotionGraph`].
#[derive(Debug, Clone, Default)]
pub struct ArenaStore {
    graph: MotionGraph,
    dirty: BTreeSet<NodeId>,
    persist_count: usize,
}

impl ArenaStore {
    /// Store over an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph built so far.
    #[must_use]
    pub fn graph(&self) -> &MotionGraph {
        &self.graph
    }

    /// Consume the store and return the built graph.
    #[must_use]
    pub fn into_graph(self) -> MotionGraph {
        self.graph
    }

    /// Entities marked dirty since the last persist.
    #[must_use]
    pub fn dirty(&self) -> &BTreeSet<NodeId> {
        &self.dirty
    }

    /// Number of successful persists.
    #[must_use]
    pub fn persist_count(&self) -> usize {
        self.persist_count
    }
}

impl ObjectStore for ArenaStore {
    fn create_node(&mut self, node: Node) -> Result<NodeId, StoreError> {
        Ok(self.graph.insert_detached(node))
    }

    fn attach_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        layout: LayoutHint,
    ) -> Result<(), StoreError> {
        Ok(self.graph.attach_child(parent, child, layout)?)
    }

    fn push_transition(
        &mut self,
        owner: TransitionOwner,
        transition: Transition,
    ) -> Result<(), StoreError> {
        Ok(self.graph.push_transition(owner, transition)?)
    }

    fn set_default_node(
        &mut self,
        machine: NodeId,
        node: Option<NodeId>,
    ) -> Result<(), StoreError> {
        Ok(self.graph.set_default_node(machine, node)?)
    }

    fn attach_behaviour(&mut self, owner: NodeId, behaviour: Behaviour) -> Result<(), StoreError> {
        Ok(self.graph.push_behaviour(owner, behaviour)?)
    }

    fn set_parameters(&mut self, parameters: ParameterTable) -> Result<(), StoreError> {
        self.graph.set_parameters(parameters);
        Ok(())
    }

    fn set_root(&mut self, root: NodeId) -> Result<(), StoreError> {
        Ok(self.graph.set_root(root)?)
    }

    fn mark_dirty(&mut self, id: NodeId) {
        self.dirty.insert(id);
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        self.dirty.clear();
        self.persist_count += 1;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use motion_graph::{MachineNode, StateNode};

    #[test]
    fn persist_clears_dirty_set() {
        let mut store = ArenaStore::new();
        let root = store
            .create_node(Node::Machine(MachineNode::new("Base")))
            .unwrap();
        let idle = store.create_node(Node::State(StateNode::new("Idle"))).unwrap();
        store.attach_child(root, idle, LayoutHint::default()).unwrap();
        store.mark_dirty(root);
        store.mark_dirty(idle);
        assert_eq!(store.dirty().len(), 2);
        store.persist().unwrap();
        assert!(store.dirty().is_empty());
        assert_eq!(store.persist_count(), 1);
    }

    #[test]
    fn graph_errors_surface_as_store_errors() {
        let mut store = ArenaStore::new();
        let idle = store.create_node(Node::State(StateNode::new("Idle"))).unwrap();
        assert_eq!(
            store.set_root(idle),
            Err(StoreError::Graph(GraphError::NotAMachine(idle)))
        );
    }
}
