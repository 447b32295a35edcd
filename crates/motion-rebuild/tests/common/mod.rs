// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use motion_dry_tests::Fixture;
use motion_graph::{Destination, MotionGraph, Node, NodeId, Transition, TransitionOwner};
use motion_rebuild::{ArenaStore, IdentityMap, RebuildOptions, RebuildReport, Rebuilder, SilentHost};

/// Rebuilds `fixture` into a fresh arena with `options`.
pub fn rebuild_with(fixture: &Fixture, options: RebuildOptions) -> (ArenaStore, RebuildReport) {
    let mut store = ArenaStore::new();
    let report = Rebuilder::new(&fixture.graph, &fixture.clips)
        .options(options)
        .run(&mut store, &mut SilentHost)
        .expect("rebuild");
    (store, report)
}

/// Rebuilds `fixture` with default options.
pub fn rebuild(fixture: &Fixture) -> (ArenaStore, RebuildReport) {
    rebuild_with(fixture, RebuildOptions::default())
}

/// Every transition list of `graph`, keyed by owner, in handle order.
pub fn owners(graph: &MotionGraph) -> Vec<(TransitionOwner, Vec<Transition>)> {
    let mut out = Vec::new();
    for (id, node) in graph.iter() {
        match node {
            Node::State(s) => out.push((TransitionOwner::State(id), s.transitions.clone())),
            Node::Machine(m) => {
                out.push((TransitionOwner::Any(id), m.any_transitions.clone()));
                out.push((TransitionOwner::Entry(id), m.entry_transitions.clone()));
            }
        }
    }
    out
}

/// Source edge mapped through `identity`, or `None` if its target was not
/// cloned.
pub fn mapped(edge: &Transition, identity: &IdentityMap) -> Option<Transition> {
    match edge.destination {
        Destination::Exit => Some(edge.clone()),
        Destination::Node(target) => identity
            .resolve(target)
            .map(|clone| edge.retargeted(Destination::Node(clone))),
    }
}

/// Asserts that the clone of every cloned owner carries exactly the source
/// edges whose targets were cloned, remapped, in source order.
pub fn assert_edges_remapped(source: &MotionGraph, clone: &MotionGraph, identity: &IdentityMap) {
    for (owner, edges) in owners(source) {
        let Some(clone_node) = identity.resolve(owner.node()) else {
            continue;
        };
        let expected: Vec<Transition> = edges.iter().filter_map(|e| mapped(e, identity)).collect();
        let actual = clone
            .transitions(owner.with_node(clone_node))
            .expect("clone owner has the same kind");
        assert_eq!(actual, expected.as_slice(), "edges of {owner}");
    }
}

/// Asserts node kinds, names and child lists line up through `identity`.
///
/// Only meaningful for sources without duplicate listings or nesting cycles.
pub fn assert_structure_mirrored(source: &MotionGraph, clone: &MotionGraph, identity: &IdentityMap) {
    for (src, dst) in identity.iter() {
        let a = source.node(src).expect("source node");
        let b = clone.node(dst).expect("clone node");
        assert_eq!(a.kind(), b.kind(), "kind of {src}");
        assert_eq!(a.name(), b.name(), "name of {src}");
        if let (Node::Machine(ma), Node::Machine(mb)) = (a, b) {
            let expected: Vec<NodeId> = ma
                .children
                .iter()
                .filter_map(|c| identity.resolve(c.node))
                .collect();
            let actual: Vec<NodeId> = mb.children.iter().map(|c| c.node).collect();
            assert_eq!(actual, expected, "children of {src}");
        }
    }
}
