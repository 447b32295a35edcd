// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Object store fake that records every call and can be told to fail.

use motion_graph::{
    Behaviour, LayoutHint, MotionGraph, Node, NodeId, ParameterTable, Transition, TransitionOwner,
};
use motion_rebuild::{ArenaStore, ObjectStore, StoreError};

/// One call made against a [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `create_node`, with the created node's name.
    CreateNode(String),
    /// `attach_child(parent, child)`.
    AttachChild(NodeId, NodeId),
    /// `push_transition` onto the given clone-side owner.
    PushTransition(TransitionOwner),
    /// `set_default_node(machine, node)`.
    SetDefaultNode(NodeId, Option<NodeId>),
    /// `attach_behaviour` with the behaviour's type name.
    AttachBehaviour(NodeId, String),
    /// `set_parameters` with the table length.
    SetParameters(usize),
    /// `set_root`.
    SetRoot(NodeId),
    /// `mark_dirty`.
    MarkDirty(NodeId),
    /// `persist`.
    Persist,
}

impl StoreCall {
    /// Operation name, as used by [`RecordingStore::fail_on`].
    pub fn operation(&self) -> &'static str {
        match self {
            StoreCall::CreateNode(_) => "create_node",
            StoreCall::AttachChild(..) => "attach_child",
            StoreCall::PushTransition(_) => "push_transition",
            StoreCall::SetDefaultNode(..) => "set_default_node",
            StoreCall::AttachBehaviour(..) => "attach_behaviour",
            StoreCall::SetParameters(_) => "set_parameters",
            StoreCall::SetRoot(_) => "set_root",
            StoreCall::MarkDirty(_) => "mark_dirty",
            StoreCall::Persist => "persist",
        }
    }
}

/// [`ObjectStore`] over an [`ArenaStore`] that logs calls in order.
///
/// With [`RecordingStore::fail_on`], the n-th call of one operation returns
/// [`StoreError::Rejected`] instead of reaching the arena.
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: ArenaStore,
    calls: Vec<StoreCall>,
    fail: Option<(&'static str, usize)>,
}

impl RecordingStore {
    /// Store that never fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose `nth` (zero-based) call of `operation` fails.
    pub fn fail_on(operation: &'static str, nth: usize) -> Self {
        Self {
            fail: Some((operation, nth)),
            ..Self::default()
        }
    }

    /// Calls in the order they were made, failed ones included.
    pub fn calls(&self) -> &[StoreCall] {
        &self.calls
    }

    /// Number of calls of `operation`.
    pub fn count(&self, operation: &str) -> usize {
        self.calls
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    /// Graph built so far.
    pub fn graph(&self) -> &MotionGraph {
        self.inner.graph()
    }

    /// Consume the store and return the built graph.
    pub fn into_graph(self) -> MotionGraph {
        self.inner.into_graph()
    }

    fn log(&mut self, call: StoreCall) -> Result<(), StoreError> {
        let operation = call.operation();
        let seen = self.count(operation);
        self.calls.push(call);
        match self.fail {
            Some((op, nth)) if op == operation && nth == seen => Err(StoreError::Rejected {
                operation,
                reason: "simulated failure".to_owned(),
            }),
            _ => Ok(()),
        }
    }
}

impl ObjectStore for RecordingStore {
    fn create_node(&mut self, node: Node) -> Result<NodeId, StoreError> {
        self.log(StoreCall::CreateNode(node.name().to_owned()))?;
        self.inner.create_node(node)
    }

    fn attach_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        layout: LayoutHint,
    ) -> Result<(), StoreError> {
        self.log(StoreCall::AttachChild(parent, child))?;
        self.inner.attach_child(parent, child, layout)
    }

    fn push_transition(
        &mut self,
        owner: TransitionOwner,
        transition: Transition,
    ) -> Result<(), StoreError> {
        self.log(StoreCall::PushTransition(owner))?;
        self.inner.push_transition(owner, transition)
    }

    fn set_default_node(
        &mut self,
        machine: NodeId,
        node: Option<NodeId>,
    ) -> Result<(), StoreError> {
        self.log(StoreCall::SetDefaultNode(machine, node))?;
        self.inner.set_default_node(machine, node)
    }

    fn attach_behaviour(&mut self, owner: NodeId, behaviour: Behaviour) -> Result<(), StoreError> {
        self.log(StoreCall::AttachBehaviour(owner, behaviour.type_name.clone()))?;
        self.inner.attach_behaviour(owner, behaviour)
    }

    fn set_parameters(&mut self, parameters: ParameterTable) -> Result<(), StoreError> {
        self.log(StoreCall::SetParameters(parameters.len()))?;
        self.inner.set_parameters(parameters)
    }

    fn set_root(&mut self, root: NodeId) -> Result<(), StoreError> {
        self.log(StoreCall::SetRoot(root))?;
        self.inner.set_root(root)
    }

    fn mark_dirty(&mut self, id: NodeId) {
        self.calls.push(StoreCall::MarkDirty(id));
        self.inner.mark_dirty(id);
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        self.log(StoreCall::Persist)?;
        self.inner.persist()
    }
}
