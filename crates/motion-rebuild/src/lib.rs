// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Deep-clone rebuild of motion graphs.
//!
//! [`Rebuilder`] copies a rooted, possibly cyclic graph of states and nested
//! state machines into an [`ObjectStore`], remapping every transition,
//! default node and behaviour node reference through one [`IdentityMap`].
//! Per-item problems (dangling clips, unresolved targets, unsupported
//! behaviour fields) never abort the run; they are collected in a [`Ledger`]
//! returned with the clone. Only structural problems produce a
//! [`RebuildError`].
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
    clippy::use_self,
    clippy::missing_errors_doc,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::option_if_let_else
)]

mod edge;
mod host;
mod identity;
mod ledger;
mod migrate;
mod node;
mod options;
mod payload;
mod rebuild;
mod store;
mod walker;

pub use edge::{clone_edges, edges_resolvable};
pub use host::{CancelToken, RebuildHost, SilentHost, Stage};
pub use identity::IdentityMap;
pub use ledger::{Diagnostic, IssueKind, Ledger, UnresolvedEdge};
pub use migrate::{migrate_parameter_table, BehaviourMigrator};
pub use node::NodeCloner;
pub use options::RebuildOptions;
pub use payload::PayloadCloner;
pub use rebuild::{
    rebuild, Completion, RebuildError, RebuildReport, RebuildStats, Rebuilder,
};
pub use store::{ArenaStore, ObjectStore, StoreError};
pub use walker::{GraphWalker, WalkContext, WalkFlow};
