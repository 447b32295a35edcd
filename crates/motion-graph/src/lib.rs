// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Motion graph model shared by the rebuild engine and its tools.
//!
//! A graph is an arena of nodes. States are leaves carrying a motion (a clip
//! reference or a blend tree); state machines are composite nodes whose child
//! lists form the nesting tree. Transitions store destination handles and may
//! point anywhere in the arena, including across levels and back to their own
//! owner.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod behaviour;
mod graph;
mod ident;
mod motion;
mod node;
mod parameter;
mod transition;

pub use behaviour::{Behaviour, Field, FieldValue};
pub use graph::{GraphError, GraphStats, Hash32, MotionGraph};
pub use ident::NodeId;
pub use motion::{BlendChild, BlendTree, BlendType, Clip, Motion};
pub use node::{
    BoundFlag, BoundScalar, ChildNode, LayoutHint, MachineNode, Node, NodeKind, StateNode,
};
pub use parameter::{Parameter, ParameterKind, ParameterTable, ParameterValue};
pub use transition::{
    Condition, ConditionMode, Destination, Interruption, InterruptionSource, Timing, Transition,
    TransitionOwner,
};
