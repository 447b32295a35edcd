// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Single-node cloning.

use motion_graph::{Node, NodeId, StateNode};
use tracing::debug;

use crate::identity::IdentityMap;
use crate::ledger::Ledger;
use crate::payload::PayloadCloner;
use crate::store::{ObjectStore, StoreError};

/// Clones one state or one machine shell.
///
/// Transitions and behaviours are left empty: the edge cloner and the
/// migration stage own them.
#[derive(Clone, Copy)]
pub struct NodeCloner<'a> {
    payload: PayloadCloner<'a>,
}

impl<'a> NodeCloner<'a> {
    /// Cloner copying payloads with `payload`.
    pub fn new(payload: PayloadCloner<'a>) -> Self {
        Self { payload }
    }

    /// Creates the clone of `source` in `store` and registers
    /// `map[source_id] = clone` before returning, so recursive work under a
    /// machine can already resolve edges pointing back at it.
    pub fn clone_node(
        &self,
        source_id: NodeId,
        source: &Node,
        store: &mut dyn ObjectStore,
        map: &mut IdentityMap,
        ledger: &mut Ledger,
        path: &str,
    ) -> Result<NodeId, StoreError> {
        let clone = match source {
            Node::State(state) => Node::State(self.clone_state(state, ledger, path)),
            Node::Machine(machine) => Node::Machine(machine.shell()),
        };
        let id = store.create_node(clone)?;
        map.register(source_id, id);
        store.mark_dirty(id);
        debug!(source = %source_id, clone = %id, kind = %source.kind(), path, "node cloned");
        Ok(id)
    }

    fn clone_state(&self, state: &StateNode, ledger: &mut Ledger, path: &str) -> StateNode {
        StateNode {
            name: state.name.clone(),
            tag: state.tag.clone(),
            speed: state.speed.clone(),
            cycle_offset: state.cycle_offset.clone(),
            mirror: state.mirror.clone(),
            time_parameter: state.time_parameter.clone(),
            write_default_values: state.write_default_values,
            ik_on_feet: state.ik_on_feet,
            motion: state
                .motion
                .as_ref()
                .and_then(|m| self.payload.clone_motion(m, ledger, path)),
            transitions: Vec::new(),
            behaviours: Vec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::ArenaStore;
    use motion_cas::MemoryClipStore;
    use motion_graph::{Behaviour, BoundScalar, MachineNode, Transition};

    #[test]
    fn state_scalars_copy_and_edges_stay_behind() {
        let clips = MemoryClipStore::new();
        let cloner = NodeCloner::new(PayloadCloner::new(&clips));
        let mut source = StateNode::new("Run");
        source.speed = BoundScalar::bound(1.25, "SpeedMul");
        source.tag = "locomotion".into();
        source.ik_on_feet = true;
        source.transitions.push(Transition::to_exit());
        source.behaviours.push(Behaviour::new("FootstepEmitter"));

        let mut store = ArenaStore::new();
        let mut map = IdentityMap::new();
        let mut ledger = Ledger::new();
        let id = cloner
            .clone_node(NodeId(8), &Node::State(source), &mut store, &mut map, &mut ledger, "Base/Run")
            .unwrap();

        assert_eq!(map.resolve(NodeId(8)), Some(id));
        let clone = store.graph().state(id).unwrap();
        assert_eq!(clone.speed, BoundScalar::bound(1.25, "SpeedMul"));
        assert_eq!(clone.tag, "locomotion");
        assert!(clone.ik_on_feet);
        assert!(clone.transitions.is_empty());
        assert!(clone.behaviours.is_empty());
        assert!(store.dirty().contains(&id));
    }

    #[test]
    fn machine_clone_is_an_empty_shell() {
        let clips = MemoryClipStore::new();
        let cloner = NodeCloner::new(PayloadCloner::new(&clips));
        let mut source = MachineNode::new("Combat");
        source.children.push(motion_graph::ChildNode {
            node: NodeId(1),
            position: motion_graph::LayoutHint::at(10.0, 20.0),
        });
        source.default_node = Some(NodeId(1));

        let mut store = ArenaStore::new();
        let mut map = IdentityMap::new();
        let mut ledger = Ledger::new();
        let id = cloner
            .clone_node(NodeId(0), &Node::Machine(source), &mut store, &mut map, &mut ledger, "Combat")
            .unwrap();
        let shell = store.graph().machine(id).unwrap();
        assert_eq!(shell.name, "Combat");
        assert!(shell.children.is_empty());
        assert_eq!(shell.default_node, None);
    }
}
