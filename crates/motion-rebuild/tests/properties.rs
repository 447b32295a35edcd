// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]

mod common;

use proptest::prelude::*;
use proptest::sample::Index;
use proptest::test_runner::{Config as PropConfig, RngAlgorithm, TestRng, TestRunner};

use motion_cas::MemoryClipStore;
use motion_dry_tests::Fixture;
use motion_graph::{Destination, MotionGraph, Node, NodeId, StateNode, Transition, TransitionOwner};

use common::{assert_edges_remapped, assert_structure_mirrored, rebuild};

/// `(is_machine, parent)` per node, parents drawn from earlier machines.
type NodePlan = Vec<(bool, Index)>;
/// `(from, to, self_flag)` per edge.
type EdgePlan = Vec<(Index, Index, bool)>;

fn build(nodes: &NodePlan, edges: &EdgePlan) -> MotionGraph {
    let mut g = MotionGraph::new("Root");
    let root = g.root().expect("root");
    let mut machines = vec![root];
    let mut all = vec![root];
    for (i, (is_machine, parent)) in nodes.iter().enumerate() {
        let parent = *parent.get(&machines);
        let id = if *is_machine {
            let m = g.add_machine(parent, format!("M{i}")).expect("machine");
            machines.push(m);
            m
        } else {
            g.add_state(parent, StateNode::new(format!("S{i}")))
                .expect("state")
        };
        all.push(id);
    }
    for (from, to, self_flag) in edges {
        let from = *from.get(&all);
        let to = *to.get(&all);
        let mut edge = Transition::to(to);
        edge.can_transition_to_self = *self_flag;
        let owner = match g.node(from) {
            Some(Node::State(_)) => TransitionOwner::State(from),
            // Split machine-owned edges between Any and Entry.
            _ if *self_flag => TransitionOwner::Any(from),
            _ => TransitionOwner::Entry(from),
        };
        g.push_transition(owner, edge).expect("edge");
    }
    g
}

fn graph_strategy() -> impl Strategy<Value = MotionGraph> {
    (
        prop::collection::vec((any::<bool>(), any::<Index>()), 0..24),
        prop::collection::vec((any::<Index>(), any::<Index>(), any::<bool>()), 0..48),
    )
        .prop_map(|(nodes, edges)| build(&nodes, &edges))
}

fn runner() -> TestRunner {
    const SEED_BYTES: [u8; 32] = [
        0x6d, 0x6f, 0x74, 0x69, 0x6f, 0x6e, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0,
    ];
    let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &SEED_BYTES);
    TestRunner::new_with_rng(
        PropConfig {
            cases: 128,
            ..PropConfig::default()
        },
        rng,
    )
}

#[test]
fn every_reachable_node_is_cloned_and_every_edge_resolves() {
    runner()
        .run(&graph_strategy(), |graph| {
            let fixture = Fixture {
                graph,
                clips: MemoryClipStore::new(),
            };
            let (store, report) = rebuild(&fixture);

            let reachable = fixture.graph.reachable();
            prop_assert_eq!(report.identity.len(), reachable.len());
            for id in &reachable {
                prop_assert!(report.identity.resolve(*id).is_some(), "{} lost", id);
            }
            prop_assert!(report.ledger.is_clean(), "ledger: {}", report.ledger);
            prop_assert_eq!(store.graph().stats(), fixture.graph.stats());

            assert_structure_mirrored(&fixture.graph, store.graph(), &report.identity);
            assert_edges_remapped(&fixture.graph, store.graph(), &report.identity);
            Ok(())
        })
        .expect("property holds");
}

#[test]
fn resolution_is_stable_and_rebuilds_are_deterministic() {
    runner()
        .run(&graph_strategy(), |graph| {
            let fixture = Fixture {
                graph,
                clips: MemoryClipStore::new(),
            };
            let (store, report) = rebuild(&fixture);
            let (again, _) = rebuild(&fixture);
            prop_assert_eq!(
                store.graph().compute_hash().expect("hash"),
                again.graph().compute_hash().expect("hash")
            );
            for id in fixture.graph.reachable() {
                prop_assert_eq!(report.identity.resolve(id), report.identity.resolve(id));
            }
            let clones: std::collections::BTreeSet<NodeId> =
                report.identity.iter().map(|(_, c)| c).collect();
            prop_assert_eq!(clones.len(), report.identity.len(), "clone handles are unique");
            Ok(())
        })
        .expect("property holds");
}

#[test]
fn self_edges_stay_self_edges() {
    runner()
        .run(&graph_strategy(), |graph| {
            let fixture = Fixture {
                graph,
                clips: MemoryClipStore::new(),
            };
            let (store, report) = rebuild(&fixture);
            for (src, dst) in report.identity.iter() {
                let Some(Node::State(state)) = fixture.graph.node(src) else {
                    continue;
                };
                let cloned = store
                    .graph()
                    .transitions(TransitionOwner::State(dst))
                    .expect("state edges");
                for (a, b) in state.transitions.iter().zip(cloned) {
                    if a.destination == Destination::Node(src) {
                        prop_assert_eq!(b.destination, Destination::Node(dst));
                        prop_assert_eq!(b.can_transition_to_self, a.can_transition_to_self);
                    }
                }
            }
            Ok(())
        })
        .expect("property holds");
}
