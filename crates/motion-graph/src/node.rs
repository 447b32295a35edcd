// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! State and state-machine node records.

use serde::{Deserialize, Serialize};

use crate::behaviour::Behaviour;
use crate::ident::NodeId;
use crate::motion::Motion;
use crate::transition::Transition;

/// Node classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Leaf state carrying a motion.
    State,
    /// Composite node owning a nested graph level.
    Machine,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::State => write!(f, "state"),
            NodeKind::Machine => write!(f, "machine"),
        }
    }
}

/// Editor layout position of a node inside its parent level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct LayoutHint {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

impl LayoutHint {
    /// Creates a layout hint at `(x, y)`.
    #[must_use]
    pub fn at(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Numeric attribute that is either a constant or driven by a named parameter.
///
/// When `parameter` is set the runtime reads the parameter and `value` is only
/// the authored fallback; both are preserved verbatim by a rebuild.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BoundScalar {
    /// Constant value.
    pub value: f32,
    /// Driving parameter name, if bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl BoundScalar {
    /// Constant attribute.
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self {
            value,
            parameter: None,
        }
    }

    /// Attribute driven by `parameter`.
    #[must_use]
    pub fn bound(value: f32, parameter: impl Into<String>) -> Self {
        Self {
            value,
            parameter: Some(parameter.into()),
        }
    }
}

/// Boolean attribute that is either a constant or driven by a named parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BoundFlag {
    /// Constant value.
    pub value: bool,
    /// Driving parameter name, if bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

/// Leaf state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateNode {
    /// Display name, unique among siblings by convention only.
    pub name: String,
    /// Free-form tag.
    #[serde(default)]
    pub tag: String,
    /// Playback speed.
    pub speed: BoundScalar,
    /// Normalized cycle offset.
    #[serde(default)]
    pub cycle_offset: BoundScalar,
    /// Mirror toggle.
    #[serde(default)]
    pub mirror: BoundFlag,
    /// Parameter driving normalized time directly, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_parameter: Option<String>,
    /// Whether unanimated properties are written back to defaults.
    #[serde(default)]
    pub write_default_values: bool,
    /// Foot IK toggle.
    #[serde(default)]
    pub ik_on_feet: bool,
    /// Attached motion payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<Motion>,
    /// Outgoing transitions, in priority order.
    #[serde(default)]
    pub transitions: Vec<Transition>,
    /// Attached behaviours, in execution order.
    #[serde(default)]
    pub behaviours: Vec<Behaviour>,
}

impl StateNode {
    /// A state named `name` with authoring defaults and no motion.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: String::new(),
            speed: BoundScalar::constant(1.0),
            cycle_offset: BoundScalar::default(),
            mirror: BoundFlag::default(),
            time_parameter: None,
            write_default_values: true,
            ik_on_feet: false,
            motion: None,
            transitions: Vec::new(),
            behaviours: Vec::new(),
        }
    }

    /// Builder-style motion setter.
    #[must_use]
    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = Some(motion);
        self
    }
}

/// A child slot inside a state machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChildNode {
    /// Child handle (state or machine).
    pub node: NodeId,
    /// Layout position inside the parent level.
    #[serde(default)]
    pub position: LayoutHint,
}

/// Composite node: one level of the graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MachineNode {
    /// Display name.
    pub name: String,
    /// Direct children in authoring order.
    #[serde(default)]
    pub children: Vec<ChildNode>,
    /// Default node; must be one of `children` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_node: Option<NodeId>,
    /// Transitions sourced from the Any pseudo-node of this level.
    #[serde(default)]
    pub any_transitions: Vec<Transition>,
    /// Transitions sourced from the Entry pseudo-node of this level.
    #[serde(default)]
    pub entry_transitions: Vec<Transition>,
    /// Attached behaviours, in execution order.
    #[serde(default)]
    pub behaviours: Vec<Behaviour>,
    /// Layout of the Any pseudo-node.
    #[serde(default)]
    pub any_position: LayoutHint,
    /// Layout of the Entry pseudo-node.
    #[serde(default)]
    pub entry_position: LayoutHint,
    /// Layout of the Exit pseudo-node.
    #[serde(default)]
    pub exit_position: LayoutHint,
}

impl MachineNode {
    /// Empty machine named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if `node` is a direct child of this level.
    #[must_use]
    pub fn has_child(&self, node: NodeId) -> bool {
        self.children.iter().any(|c| c.node == node)
    }

    /// Copy of the scalar attributes with an empty level (no children,
    /// transitions, default or behaviours).
    #[must_use]
    pub fn shell(&self) -> Self {
        Self {
            name: self.name.clone(),
            any_position: self.any_position,
            entry_position: self.entry_position,
            exit_position: self.exit_position,
            ..Self::default()
        }
    }
}

/// A node in the arena.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Leaf state.
    State(StateNode),
    /// Composite state machine.
    Machine(MachineNode),
}

impl Node {
    /// Node classification.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::State(_) => NodeKind::State,
            Node::Machine(_) => NodeKind::Machine,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Node::State(s) => &s.name,
            Node::Machine(m) => &m.name,
        }
    }

    /// Attached behaviours.
    #[must_use]
    pub fn behaviours(&self) -> &[Behaviour] {
        match self {
            Node::State(s) => &s.behaviours,
            Node::Machine(m) => &m.behaviours,
        }
    }

    /// Mutable access to the attached behaviours.
    pub fn behaviours_mut(&mut self) -> &mut Vec<Behaviour> {
        match self {
            Node::State(s) => &mut s.behaviours,
            Node::Machine(m) => &mut m.behaviours,
        }
    }

    /// State view, if this is a state.
    #[must_use]
    pub fn as_state(&self) -> Option<&StateNode> {
        match self {
            Node::State(s) => Some(s),
            Node::Machine(_) => None,
        }
    }

    /// Machine view, if this is a machine.
    #[must_use]
    pub fn as_machine(&self) -> Option<&MachineNode> {
        match self {
            Node::Machine(m) => Some(m),
            Node::State(_) => None,
        }
    }
}
