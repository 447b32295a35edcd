// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Node arena for one motion graph.
use ciborium::de::from_reader;
use ciborium::ser::into_writer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::behaviour::Behaviour;
use crate::ident::NodeId;
use crate::node::{ChildNode, LayoutHint, MachineNode, Node, StateNode};
use crate::parameter::ParameterTable;
use crate::transition::{Transition, TransitionOwner};

/// Blake3 digest of a canonical graph encoding.
pub type Hash32 = [u8; 32];

/// Error returned by graph mutations and lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The handle does not index a node in this graph.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    /// The operation requires a state machine.
    #[error("node {0} is not a state machine")]
    NotAMachine(NodeId),
    /// The operation requires a state.
    #[error("node {0} is not a state")]
    NotAState(NodeId),
    /// A default node must be a direct child of its machine.
    #[error("node {node} is not a direct child of machine {machine}")]
    NotADirectChild {
        /// Machine being updated.
        machine: NodeId,
        /// Offending node.
        node: NodeId,
    },
    /// Parameter names are unique within one graph.
    #[error("duplicate parameter {0:?}")]
    DuplicateParameter(String),
    /// The graph has no root machine.
    #[error("graph has no root")]
    NoRoot,
    /// Canonical encoding failed.
    #[error("encode: {0}")]
    Encode(String),
    /// Canonical decoding failed.
    #[error("decode: {0}")]
    Decode(String),
}

/// Counts over the nodes reachable from the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Leaf states.
    pub states: usize,
    /// State machines, including the root.
    pub machines: usize,
    /// Transitions of every owner kind.
    pub transitions: usize,
    /// States whose motion is a blend tree.
    pub blend_trees: usize,
    /// Clip references, including those nested in blend trees.
    pub clips: usize,
    /// Behaviours on states and machines.
    pub behaviours: usize,
}

/// Arena-backed motion graph.
///
/// Nodes live in a flat arena addressed by [`NodeId`]. Nesting is expressed by
/// machine child lists and transitions store handles, so cross-level and
/// cyclic references never form ownership cycles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MotionGraph {
    nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    root: Option<NodeId>,
    #[serde(default)]
    parameters: ParameterTable,
}

impl MotionGraph {
    /// Graph with a single empty root machine named `root_name`.
    #[must_use]
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut graph = Self::empty();
        let root = graph.insert_detached(Node::Machine(MachineNode::new(root_name)));
        graph.root = Some(root);
        graph
    }

    /// Graph with no nodes and no root.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Root machine handle, if set.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Designates `root` as the root machine.
    pub fn set_root(&mut self, root: NodeId) -> Result<(), GraphError> {
        self.machine(root)?;
        self.root = Some(root);
        Ok(())
    }

    /// Graph-wide parameter table.
    #[must_use]
    pub fn parameters(&self) -> &ParameterTable {
        &self.parameters
    }

    /// Mutable parameter table.
    pub fn parameters_mut(&mut self) -> &mut ParameterTable {
        &mut self.parameters
    }

    /// Replaces the parameter table.
    pub fn set_parameters(&mut self, parameters: ParameterTable) {
        self.parameters = parameters;
    }

    /// Number of nodes in the arena, reachable or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over every arena entry in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (handle(i), n))
    }

    /// Returns a shared reference to a node when it exists.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Returns a mutable reference to a node when it exists.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// State view of `id`.
    pub fn state(&self, id: NodeId) -> Result<&StateNode, GraphError> {
        match self.node(id) {
            Some(Node::State(s)) => Ok(s),
            Some(Node::Machine(_)) => Err(GraphError::NotAState(id)),
            None => Err(GraphError::UnknownNode(id)),
        }
    }

    /// Machine view of `id`.
    pub fn machine(&self, id: NodeId) -> Result<&MachineNode, GraphError> {
        match self.node(id) {
            Some(Node::Machine(m)) => Ok(m),
            Some(Node::State(_)) => Err(GraphError::NotAMachine(id)),
            None => Err(GraphError::UnknownNode(id)),
        }
    }

    fn state_mut(&mut self, id: NodeId) -> Result<&mut StateNode, GraphError> {
        match self.nodes.get_mut(id.index()) {
            Some(Node::State(s)) => Ok(s),
            Some(Node::Machine(_)) => Err(GraphError::NotAState(id)),
            None => Err(GraphError::UnknownNode(id)),
        }
    }

    fn machine_mut(&mut self, id: NodeId) -> Result<&mut MachineNode, GraphError> {
        match self.nodes.get_mut(id.index()) {
            Some(Node::Machine(m)) => Ok(m),
            Some(Node::State(_)) => Err(GraphError::NotAMachine(id)),
            None => Err(GraphError::UnknownNode(id)),
        }
    }

    /// Appends a node to the arena without attaching it to any machine.
    ///
    /// Detached nodes are not reachable from the root until attached.
    pub fn insert_detached(&mut self, node: Node) -> NodeId {
        let id = handle(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Appends `child` to `parent`'s child list.
    pub fn attach_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        position: LayoutHint,
    ) -> Result<(), GraphError> {
        if self.node(child).is_none() {
            return Err(GraphError::UnknownNode(child));
        }
        self.machine_mut(parent)?.children.push(ChildNode {
            node: child,
            position,
        });
        Ok(())
    }

    /// Inserts `state` and attaches it under `parent`.
    pub fn add_state(&mut self, parent: NodeId, state: StateNode) -> Result<NodeId, GraphError> {
        self.machine(parent)?;
        let id = self.insert_detached(Node::State(state));
        self.attach_child(parent, id, LayoutHint::default())?;
        Ok(id)
    }

    /// Inserts an empty machine named `name` under `parent`.
    pub fn add_machine(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, GraphError> {
        self.machine(parent)?;
        let id = self.insert_detached(Node::Machine(MachineNode::new(name)));
        self.attach_child(parent, id, LayoutHint::default())?;
        Ok(id)
    }

    /// Appends `transition` to the list owned by `owner`.
    ///
    /// The destination is not validated; dangling destinations are legal in a
    /// source graph and are the rebuild engine's concern.
    pub fn push_transition(
        &mut self,
        owner: TransitionOwner,
        transition: Transition,
    ) -> Result<(), GraphError> {
        match owner {
            TransitionOwner::State(id) => self.state_mut(id)?.transitions.push(transition),
            TransitionOwner::Any(id) => self.machine_mut(id)?.any_transitions.push(transition),
            TransitionOwner::Entry(id) => self.machine_mut(id)?.entry_transitions.push(transition),
        }
        Ok(())
    }

    /// The transition list owned by `owner`.
    pub fn transitions(&self, owner: TransitionOwner) -> Result<&[Transition], GraphError> {
        Ok(match owner {
            TransitionOwner::State(id) => &self.state(id)?.transitions,
            TransitionOwner::Any(id) => &self.machine(id)?.any_transitions,
            TransitionOwner::Entry(id) => &self.machine(id)?.entry_transitions,
        })
    }

    /// Sets (or clears) a machine's default node.
    pub fn set_default_node(
        &mut self,
        machine: NodeId,
        node: Option<NodeId>,
    ) -> Result<(), GraphError> {
        let level = self.machine_mut(machine)?;
        if let Some(node) = node {
            if !level.has_child(node) {
                return Err(GraphError::NotADirectChild { machine, node });
            }
        }
        level.default_node = node;
        Ok(())
    }

    /// Appends `behaviour` to a state or machine.
    pub fn push_behaviour(&mut self, owner: NodeId, behaviour: Behaviour) -> Result<(), GraphError> {
        self.node_mut(owner)
            .ok_or(GraphError::UnknownNode(owner))?
            .behaviours_mut()
            .push(behaviour);
        Ok(())
    }

    /// Nodes reachable from the root through child lists, in depth-first
    /// pre-order following authoring order. Each node appears once even if
    /// listed under several machines.
    #[must_use]
    pub fn reachable(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let Some(root) = self.root else {
            return order;
        };
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            match seen.get_mut(id.index()) {
                Some(flag) if !*flag => *flag = true,
                _ => continue,
            }
            order.push(id);
            if let Some(Node::Machine(m)) = self.node(id) {
                stack.extend(m.children.iter().rev().map(|c| c.node));
            }
        }
        order
    }

    /// Slash-separated name path from the root to `id`
    /// (e.g. `"Base/Locomotion/Walk"`), if `id` is reachable.
    #[must_use]
    pub fn path_of(&self, id: NodeId) -> Option<String> {
        let root = self.root?;
        let mut parents: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        for node_id in self.reachable() {
            if let Some(Node::Machine(m)) = self.node(node_id) {
                for child in &m.children {
                    if let Some(slot) = parents.get_mut(child.node.index()) {
                        if slot.is_none() && child.node != root {
                            *slot = Some(node_id);
                        }
                    }
                }
            }
        }
        if id != root && parents.get(id.index()).copied().flatten().is_none() {
            return None;
        }
        let mut names = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            names.push(self.node(current)?.name().to_owned());
            if current == root {
                break;
            }
            cursor = parents.get(current.index()).copied().flatten();
        }
        names.reverse();
        Some(names.join("/"))
    }

    /// Resolves a path produced by [`MotionGraph::path_of`].
    #[must_use]
    pub fn find_path(&self, path: &str) -> Option<NodeId> {
        let mut segments = path.split('/');
        let mut current = self.root?;
        if segments.next()? != self.node(current)?.name() {
            return None;
        }
        for segment in segments {
            let level = self.node(current)?.as_machine()?;
            current = level
                .children
                .iter()
                .map(|c| c.node)
                .find(|c| self.node(*c).is_some_and(|n| n.name() == segment))?;
        }
        Some(current)
    }

    /// Statistics over the reachable part of the graph.
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats::default();
        for id in self.reachable() {
            let Some(node) = self.node(id) else { continue };
            stats.behaviours += node.behaviours().len();
            match node {
                Node::State(s) => {
                    stats.states += 1;
                    stats.transitions += s.transitions.len();
                    if let Some(motion) = &s.motion {
                        stats.clips += motion.clip_count();
                        if motion.as_blend_tree().is_some() {
                            stats.blend_trees += 1;
                        }
                    }
                }
                Node::Machine(m) => {
                    stats.machines += 1;
                    stats.transitions += m.any_transitions.len() + m.entry_transitions.len();
                }
            }
        }
        stats
    }

    /// Canonical CBOR encoding of the whole arena.
    ///
    /// Handles are arena indices, so two graphs with equal bytes are equal
    /// node-for-node, not merely isomorphic.
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, GraphError> {
        let mut bytes = Vec::new();
        into_writer(self, &mut bytes).map_err(|e| GraphError::Encode(e.to_string()))?;
        Ok(bytes)
    }

    /// Decodes bytes produced by [`MotionGraph::to_canonical_bytes`].
    pub fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, GraphError> {
        from_reader(bytes).map_err(|e| GraphError::Decode(e.to_string()))
    }

    /// Compute blake3 hash of the canonical form.
    pub fn compute_hash(&self) -> Result<Hash32, GraphError> {
        Ok(blake3::hash(&self.to_canonical_bytes()?).into())
    }
}

// Arena growth past u32::MAX nodes is not a supported configuration.
#[allow(clippy::cast_possible_truncation)]
fn handle(index: usize) -> NodeId {
    NodeId(index as u32)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::transition::Destination;

    fn sample() -> (MotionGraph, NodeId, NodeId, NodeId) {
        let mut g = MotionGraph::new("Base");
        let root = g.root().unwrap();
        let idle = g.add_state(root, StateNode::new("Idle")).unwrap();
        let loco = g.add_machine(root, "Locomotion").unwrap();
        let walk = g.add_state(loco, StateNode::new("Walk")).unwrap();
        (g, idle, loco, walk)
    }

    #[test]
    fn reachable_is_preorder_in_authoring_order() {
        let (g, idle, loco, walk) = sample();
        assert_eq!(g.reachable(), vec![g.root().unwrap(), idle, loco, walk]);
    }

    #[test]
    fn detached_nodes_are_not_reachable() {
        let (mut g, ..) = sample();
        let orphan = g.insert_detached(Node::State(StateNode::new("Orphan")));
        assert!(!g.reachable().contains(&orphan));
        assert_eq!(g.path_of(orphan), None);
    }

    #[test]
    fn reachable_survives_nesting_cycles() {
        let (mut g, _, loco, _) = sample();
        let root = g.root().unwrap();
        g.attach_child(loco, root, LayoutHint::default()).unwrap();
        assert_eq!(g.reachable().len(), 4);
    }

    #[test]
    fn path_round_trip() {
        let (g, _, _, walk) = sample();
        assert_eq!(g.path_of(walk).as_deref(), Some("Base/Locomotion/Walk"));
        assert_eq!(g.find_path("Base/Locomotion/Walk"), Some(walk));
        assert_eq!(g.find_path("Base/Missing"), None);
    }

    #[test]
    fn default_node_must_be_direct_child() {
        let (mut g, idle, _, walk) = sample();
        let root = g.root().unwrap();
        assert_eq!(
            g.set_default_node(root, Some(walk)),
            Err(GraphError::NotADirectChild {
                machine: root,
                node: walk
            })
        );
        g.set_default_node(root, Some(idle)).unwrap();
        assert_eq!(g.machine(root).unwrap().default_node, Some(idle));
    }

    #[test]
    fn transitions_require_matching_owner_kind() {
        let (mut g, idle, loco, walk) = sample();
        assert_eq!(
            g.push_transition(TransitionOwner::Any(idle), Transition::to(walk)),
            Err(GraphError::NotAMachine(idle))
        );
        g.push_transition(TransitionOwner::State(idle), Transition::to(loco))
            .unwrap();
        let edges = g.transitions(TransitionOwner::State(idle)).unwrap();
        assert_eq!(edges[0].destination, Destination::Node(loco));
    }

    #[test]
    fn canonical_bytes_round_trip_and_hash_is_stable() {
        let (g, ..) = sample();
        let bytes = g.to_canonical_bytes().unwrap();
        let back = MotionGraph::from_canonical_bytes(&bytes).unwrap();
        assert_eq!(back, g);
        assert_eq!(back.compute_hash().unwrap(), g.compute_hash().unwrap());
    }

    #[test]
    fn stats_count_reachable_only() {
        let (mut g, idle, _, walk) = sample();
        g.push_transition(TransitionOwner::State(idle), Transition::to(walk))
            .unwrap();
        g.insert_detached(Node::State(StateNode::new("Orphan")));
        let stats = g.stats();
        assert_eq!(stats.states, 2);
        assert_eq!(stats.machines, 2);
        assert_eq!(stats.transitions, 1);
    }
}
