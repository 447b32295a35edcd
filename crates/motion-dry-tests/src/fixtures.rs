// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Source graphs with their clip libraries.
//!
//! Builders return `Result` so they stay usable from lint-strict code; tests
//! simply unwrap. Nodes are looked up by name path (`"Base/Locomotion/Walk"`).

use motion_cas::{clip_hash, ClipStore, MemoryClipStore};
use motion_graph::{
    Behaviour, BlendChild, BlendTree, Condition, ConditionMode, FieldValue, GraphError, Motion,
    MotionGraph, Node, NodeId, Parameter, ParameterValue, StateNode, Transition, TransitionOwner,
};

/// A source graph plus the clip library its states reference.
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Source graph.
    pub graph: MotionGraph,
    /// Clip library.
    pub clips: MemoryClipStore,
}

impl Fixture {
    /// Handle of the node at `path`.
    pub fn node(&self, path: &str) -> Option<NodeId> {
        self.graph.find_path(path)
    }

    /// Root handle.
    pub fn root(&self) -> Option<NodeId> {
        self.graph.root()
    }
}

/// Stores the clip named `name` in `clips` and returns a motion referencing them.
pub fn stored_clip(clips: &mut MemoryClipStore, name: &str) -> Motion {
    let hash = clips.put(name.as_bytes());
    Motion::clip(hash, name)
}

/// Motion referencing content that no library holds.
pub fn dangling_clip(name: &str) -> Motion {
    Motion::clip(clip_hash(format!("missing:{name}").as_bytes()), name)
}

/// `Base` with states `A` and `B`; `A → B` on Bool `Go`; `A` is the default.
pub fn sibling_pair() -> Result<Fixture, GraphError> {
    let mut clips = MemoryClipStore::new();
    let mut graph = MotionGraph::new("Base");
    let root = graph.root().ok_or(GraphError::NoRoot)?;
    graph
        .parameters_mut()
        .push(Parameter::new("Go", ParameterValue::Bool(false)))?;
    let a = graph.add_state(root, StateNode::new("A").with_motion(stored_clip(&mut clips, "A")))?;
    let b = graph.add_state(root, StateNode::new("B").with_motion(stored_clip(&mut clips, "B")))?;
    graph.push_transition(
        TransitionOwner::State(a),
        Transition::to(b).with_condition(Condition::new("Go", ConditionMode::If, 0.0)),
    )?;
    graph.set_default_node(root, Some(a))?;
    Ok(Fixture { graph, clips })
}

/// `Base` holding machine `C` (with state `D`) and root-level state `E`;
/// `D → E` crosses levels and `C` has an `Any → D` transition.
pub fn cross_level() -> Result<Fixture, GraphError> {
    let mut graph = MotionGraph::new("Base");
    let root = graph.root().ok_or(GraphError::NoRoot)?;
    let c = graph.add_machine(root, "C")?;
    let e = graph.add_state(root, StateNode::new("E"))?;
    let d = graph.add_state(c, StateNode::new("D"))?;
    graph.push_transition(TransitionOwner::State(d), Transition::to(e))?;
    let mut any = Transition::to(d);
    any.can_transition_to_self = true;
    graph.push_transition(TransitionOwner::Any(c), any)?;
    graph.set_default_node(c, Some(d))?;
    Ok(Fixture {
        graph,
        clips: MemoryClipStore::new(),
    })
}

/// `Base/Move` whose blend tree has a stored `Walk` clip and a dangling `Run`
/// clip.
pub fn dangling_blend() -> Result<Fixture, GraphError> {
    let mut clips = MemoryClipStore::new();
    let tree = BlendTree {
        name: "Speed".into(),
        blend_parameter: "Speed".into(),
        max_threshold: 1.0,
        children: vec![
            BlendChild::new(Some(stored_clip(&mut clips, "Walk")), 0.0),
            BlendChild::new(Some(dangling_clip("Run")), 1.0),
        ],
        ..BlendTree::default()
    };
    let mut graph = MotionGraph::new("Base");
    let root = graph.root().ok_or(GraphError::NoRoot)?;
    graph
        .parameters_mut()
        .push(Parameter::new("Speed", ParameterValue::Float(0.0)))?;
    graph.add_state(
        root,
        StateNode::new("Move").with_motion(Motion::BlendTree(Box::new(tree))),
    )?;
    Ok(Fixture { graph, clips })
}

/// `Base/Idle` with one transition to a node that is never attached to any
/// machine, so it can never be cloned.
pub fn detached_target() -> Result<Fixture, GraphError> {
    let mut graph = MotionGraph::new("Base");
    let root = graph.root().ok_or(GraphError::NoRoot)?;
    let idle = graph.add_state(root, StateNode::new("Idle"))?;
    let walk = graph.add_state(root, StateNode::new("Walk"))?;
    let orphan = graph.insert_detached(Node::State(StateNode::new("Orphan")));
    graph.push_transition(TransitionOwner::State(idle), Transition::to(walk))?;
    graph.push_transition(TransitionOwner::State(idle), Transition::to(orphan))?;
    graph.push_transition(TransitionOwner::State(walk), Transition::to(idle))?;
    Ok(Fixture {
        graph,
        clips: MemoryClipStore::new(),
    })
}

/// A character controller exercising every reference kind:
///
/// ```text
/// Base (default Idle)
/// ├── Idle                 ──► Locomotion/Walk
/// ├── Locomotion (entry ► Walk)
/// │   ├── Walk  [FootIk]   ──► Airborne/Jump  (sibling forward reference)
/// │   └── Run   (blend)    ──► Exit, ──► Run (self)
/// └── Airborne (default Fall)
///     ├── Jump             ──► Fall
///     └── Fall             ──► Idle           (up to the root)
/// Any(Base) ──► Airborne/Fall when !Grounded
/// ```
pub fn locomotion() -> Result<Fixture, GraphError> {
    let mut clips = MemoryClipStore::new();
    let mut graph = MotionGraph::new("Base");
    let root = graph.root().ok_or(GraphError::NoRoot)?;
    for parameter in [
        Parameter::new("Speed", ParameterValue::Float(0.0)),
        Parameter::new("Grounded", ParameterValue::Bool(true)),
        Parameter::new("Jump", ParameterValue::Bool(false)),
    ] {
        graph.parameters_mut().push(parameter)?;
    }

    let idle = graph.add_state(
        root,
        StateNode::new("Idle").with_motion(stored_clip(&mut clips, "Idle")),
    )?;
    let locomotion = graph.add_machine(root, "Locomotion")?;
    let airborne = graph.add_machine(root, "Airborne")?;

    let walk = graph.add_state(
        locomotion,
        StateNode::new("Walk").with_motion(stored_clip(&mut clips, "Walk")),
    )?;
    let run_tree = BlendTree {
        name: "RunBlend".into(),
        blend_parameter: "Speed".into(),
        min_threshold: 0.5,
        max_threshold: 2.0,
        children: vec![
            BlendChild::new(Some(stored_clip(&mut clips, "Jog")), 0.5),
            BlendChild::new(Some(stored_clip(&mut clips, "Sprint")), 2.0),
        ],
        ..BlendTree::default()
    };
    let run = graph.add_state(
        locomotion,
        StateNode::new("Run").with_motion(Motion::BlendTree(Box::new(run_tree))),
    )?;
    let jump = graph.add_state(
        airborne,
        StateNode::new("Jump").with_motion(stored_clip(&mut clips, "Jump")),
    )?;
    let fall = graph.add_state(
        airborne,
        StateNode::new("Fall").with_motion(stored_clip(&mut clips, "Fall")),
    )?;

    graph.set_default_node(root, Some(idle))?;
    graph.set_default_node(locomotion, Some(walk))?;
    graph.set_default_node(airborne, Some(fall))?;

    let speed_up = Condition::new("Speed", ConditionMode::Greater, 0.1);
    graph.push_transition(
        TransitionOwner::State(idle),
        Transition::to(walk).with_condition(speed_up),
    )?;
    graph.push_transition(
        TransitionOwner::State(walk),
        Transition::to(jump).with_condition(Condition::new("Jump", ConditionMode::If, 0.0)),
    )?;
    graph.push_transition(
        TransitionOwner::State(walk),
        Transition::to(run).with_condition(Condition::new("Speed", ConditionMode::Greater, 0.5)),
    )?;
    graph.push_transition(TransitionOwner::State(run), Transition::to_exit())?;
    let mut rerun = Transition::to(run);
    rerun.can_transition_to_self = true;
    graph.push_transition(TransitionOwner::State(run), rerun)?;
    graph.push_transition(TransitionOwner::State(jump), Transition::to(fall))?;
    graph.push_transition(
        TransitionOwner::State(fall),
        Transition::to(idle).with_condition(Condition::new("Grounded", ConditionMode::If, 0.0)),
    )?;
    graph.push_transition(TransitionOwner::Entry(locomotion), Transition::to(walk))?;
    graph.push_transition(
        TransitionOwner::Any(root),
        Transition::to(fall).with_condition(Condition::new(
            "Grounded",
            ConditionMode::IfNot,
            0.0,
        )),
    )?;

    graph.push_behaviour(
        walk,
        Behaviour::new("FootIk")
            .with_field("weight", FieldValue::Float(0.8))
            .with_field("driver", FieldValue::ParameterRef("Speed".into()))
            .with_field("blend_to", FieldValue::NodeRef(Some(run))),
    )?;
    graph.push_behaviour(
        airborne,
        Behaviour::new("AirControl").with_field("gravity", FieldValue::Vector3([0.0, -9.8, 0.0])),
    )?;

    Ok(Fixture { graph, clips })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_build() {
        for fixture in [
            sibling_pair().unwrap(),
            cross_level().unwrap(),
            dangling_blend().unwrap(),
            detached_target().unwrap(),
            locomotion().unwrap(),
        ] {
            assert!(fixture.root().is_some());
        }
    }

    #[test]
    fn locomotion_paths_resolve() {
        let f = locomotion().unwrap();
        assert!(f.node("Base/Locomotion/Run").is_some());
        assert!(f.node("Base/Airborne/Fall").is_some());
        assert_eq!(f.graph.stats().states, 5);
        assert_eq!(f.graph.stats().machines, 3);
    }
}
