// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transition edges and their conditions.

use serde::{Deserialize, Serialize};

use crate::ident::NodeId;

/// Comparison applied by a [`Condition`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConditionMode {
    /// Bool parameter is true.
    If,
    /// Bool parameter is false.
    IfNot,
    /// Numeric parameter is greater than the threshold.
    Greater,
    /// Numeric parameter is less than the threshold.
    Less,
    /// Int parameter equals the threshold.
    Equals,
    /// Int parameter differs from the threshold.
    NotEqual,
}

/// One guard on a transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    /// Parameter name, resolved at runtime.
    pub parameter: String,
    /// Comparison.
    pub mode: ConditionMode,
    /// Threshold (ignored by `If`/`IfNot`).
    #[serde(default)]
    pub threshold: f32,
}

impl Condition {
    /// Creates a condition.
    #[must_use]
    pub fn new(parameter: impl Into<String>, mode: ConditionMode, threshold: f32) -> Self {
        Self {
            parameter: parameter.into(),
            mode,
            threshold,
        }
    }
}

/// Where a transition leads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// A state, or a machine (meaning "enter this level").
    Node(NodeId),
    /// Leave the owner's current level.
    Exit,
}

impl Destination {
    /// Target handle, unless this is `Exit`.
    #[must_use]
    pub fn node(self) -> Option<NodeId> {
        match self {
            Destination::Node(id) => Some(id),
            Destination::Exit => None,
        }
    }
}

/// The entity a transition list hangs off.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransitionOwner {
    /// Outgoing transitions of a state.
    State(NodeId),
    /// Wildcard-source transitions scoped to one machine level.
    Any(NodeId),
    /// Entry pseudo-node transitions of one machine level.
    Entry(NodeId),
}

impl TransitionOwner {
    /// The state or machine handle owning the list.
    #[must_use]
    pub fn node(self) -> NodeId {
        match self {
            TransitionOwner::State(id) | TransitionOwner::Any(id) | TransitionOwner::Entry(id) => {
                id
            }
        }
    }

    /// Same owner kind, rebased onto another handle.
    #[must_use]
    pub fn with_node(self, node: NodeId) -> Self {
        match self {
            TransitionOwner::State(_) => TransitionOwner::State(node),
            TransitionOwner::Any(_) => TransitionOwner::Any(node),
            TransitionOwner::Entry(_) => TransitionOwner::Entry(node),
        }
    }
}

impl std::fmt::Display for TransitionOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionOwner::State(id) => write!(f, "state {id}"),
            TransitionOwner::Any(id) => write!(f, "any@{id}"),
            TransitionOwner::Entry(id) => write!(f, "entry@{id}"),
        }
    }
}

/// Which transitions may interrupt this one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterruptionSource {
    /// Not interruptible.
    #[default]
    None,
    /// Transitions of the source state.
    Source,
    /// Transitions of the destination state.
    Destination,
    /// Source first, then destination.
    SourceThenDestination,
    /// Destination first, then source.
    DestinationThenSource,
}

/// Interruption settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Interruption {
    /// Interrupting transition set.
    pub source: InterruptionSource,
    /// Only higher-priority transitions of the source may interrupt.
    #[serde(default)]
    pub ordered: bool,
}

/// Timing settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Timing {
    /// Transition waits for `exit_time`.
    pub has_exit_time: bool,
    /// Normalized exit time.
    pub exit_time: f32,
    /// `duration` is in seconds instead of normalized time.
    pub has_fixed_duration: bool,
    /// Blend duration.
    pub duration: f32,
    /// Normalized start offset in the destination.
    pub offset: f32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            has_exit_time: false,
            exit_time: 0.75,
            has_fixed_duration: true,
            duration: 0.25,
            offset: 0.0,
        }
    }
}

/// A directed, conditioned edge. The source is implied by its owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transition {
    /// Optional label.
    #[serde(default)]
    pub name: String,
    /// Target.
    pub destination: Destination,
    /// Guards, all of which must hold.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Timing settings.
    #[serde(default)]
    pub timing: Timing,
    /// Interruption settings.
    #[serde(default)]
    pub interruption: Interruption,
    /// Any-sourced transition may re-enter the state it is already in.
    #[serde(default)]
    pub can_transition_to_self: bool,
    /// Solo toggle.
    #[serde(default)]
    pub solo: bool,
    /// Mute toggle.
    #[serde(default)]
    pub mute: bool,
}

impl Transition {
    /// Unconditional transition to `node`.
    #[must_use]
    pub fn to(node: NodeId) -> Self {
        Self::towards(Destination::Node(node))
    }

    /// Unconditional transition to the Exit pseudo-node.
    #[must_use]
    pub fn to_exit() -> Self {
        Self::towards(Destination::Exit)
    }

    fn towards(destination: Destination) -> Self {
        Self {
            name: String::new(),
            destination,
            conditions: Vec::new(),
            timing: Timing::default(),
            interruption: Interruption::default(),
            can_transition_to_self: false,
            solo: false,
            mute: false,
        }
    }

    /// Builder-style condition append.
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Copy of this transition pointing at `destination`.
    #[must_use]
    pub fn retargeted(&self, destination: Destination) -> Self {
        Self {
            destination,
            ..self.clone()
        }
    }
}
