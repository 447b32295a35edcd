// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transition cloning for one owner.

use motion_graph::{Destination, NodeId, Transition, TransitionOwner};
use tracing::trace;

use crate::identity::IdentityMap;
use crate::ledger::Ledger;
use crate::store::{ObjectStore, StoreError};

/// Returns `true` if every node destination in `edges` is already cloned.
///
/// `Exit` destinations always resolve.
#[must_use]
pub fn edges_resolvable(edges: &[Transition], map: &IdentityMap) -> bool {
    edges
        .iter()
        .filter_map(|t| t.destination.node())
        .all(|target| map.contains(target))
}

/// Clones `edges` (owned by `source_owner` in the source graph) onto the
/// clone node `clone_node`, preserving order.
///
/// Conditions, timing, interruption settings and flags are copied verbatim.
/// A node destination missing from `map` drops that edge and records the
/// `(source_owner, destination)` pair. Returns the number of edges created.
pub fn clone_edges(
    source_owner: TransitionOwner,
    clone_node: NodeId,
    edges: &[Transition],
    map: &IdentityMap,
    store: &mut dyn ObjectStore,
    ledger: &mut Ledger,
    label: &str,
) -> Result<usize, StoreError> {
    let clone_owner = source_owner.with_node(clone_node);
    let mut created = 0;
    for (index, edge) in edges.iter().enumerate() {
        let destination = match edge.destination {
            Destination::Exit => Destination::Exit,
            Destination::Node(target) => match map.resolve(target) {
                Some(clone) => Destination::Node(clone),
                None => {
                    ledger.edge_dropped(
                        source_owner,
                        target,
                        format!(
                            "{label}: transition #{index} {:?} targets {target}, which was not cloned; edge dropped",
                            edge.name
                        ),
                    );
                    continue;
                }
            },
        };
        store.push_transition(clone_owner, edge.retargeted(destination))?;
        created += 1;
    }
    if created > 0 {
        store.mark_dirty(clone_node);
    }
    trace!(owner = %source_owner, created, total = edges.len(), "edges cloned");
    Ok(created)
}
