// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Failure/recovery ledger.
//!
//! Recoverable problems never abort a rebuild. Each one is appended here as
//! data (a counter bump plus a human-readable diagnostic) and returned to the
//! caller next to the clone. Whether a non-clean ledger is acceptable is the
//! host's decision.

use motion_graph::{NodeId, TransitionOwner};
use serde::Serialize;
use tracing::warn;

/// Category of a recorded issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A node could not be cloned and was skipped.
    NodeFailed,
    /// An edge target did not resolve; the edge was dropped.
    EdgeDropped,
    /// A payload or behaviour field was dropped (dangling clip, unsupported type).
    PayloadFieldSkipped,
    /// A behaviour field named a parameter missing from the destination table.
    UnresolvedParameter,
    /// A behaviour field referenced a node that was not cloned.
    UnresolvedNodeRef,
    /// A whole behaviour could not be migrated.
    BehaviourSkipped,
    /// A source parameter was not copied.
    ParameterSkipped,
    /// A machine's default node had to be recovered heuristically.
    DefaultRecovered,
}

/// One recorded issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Category.
    pub kind: IssueKind,
    /// Human-readable description naming the offending item.
    pub message: String,
}

/// An edge dropped because its destination never resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnresolvedEdge {
    /// Source-side owner of the edge.
    pub owner: TransitionOwner,
    /// Source-side destination handle.
    pub destination: NodeId,
}

/// Accumulated non-fatal issues of one rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ledger {
    nodes_failed: usize,
    edges_dropped: usize,
    payload_fields_skipped: usize,
    behaviours_with_unresolved_parameters: usize,
    node_refs_unresolved: usize,
    behaviours_skipped: usize,
    parameters_skipped: usize,
    defaults_recovered: usize,
    unresolved_edges: Vec<UnresolvedEdge>,
    diagnostics: Vec<Diagnostic>,
}

impl Ledger {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an issue of `kind`.
    ///
    /// `UnresolvedParameter` only adds a diagnostic; the per-behaviour counter
    /// is bumped by [`Ledger::behaviour_had_unresolved_parameters`]. Prefer
    /// [`Ledger::edge_dropped`] for edges so the pair is kept.
    pub fn record(&mut self, kind: IssueKind, message: impl Into<String>) {
        let message = message.into();
        warn!(?kind, "{message}");
        match kind {
            IssueKind::NodeFailed => self.nodes_failed += 1,
            IssueKind::EdgeDropped => self.edges_dropped += 1,
            IssueKind::PayloadFieldSkipped => self.payload_fields_skipped += 1,
            IssueKind::UnresolvedParameter => {}
            IssueKind::UnresolvedNodeRef => self.node_refs_unresolved += 1,
            IssueKind::BehaviourSkipped => self.behaviours_skipped += 1,
            IssueKind::ParameterSkipped => self.parameters_skipped += 1,
            IssueKind::DefaultRecovered => self.defaults_recovered += 1,
        }
        self.diagnostics.push(Diagnostic { kind, message });
    }

    /// Records a dropped edge and the `(owner, destination)` pair that failed.
    pub fn edge_dropped(
        &mut self,
        owner: TransitionOwner,
        destination: NodeId,
        message: impl Into<String>,
    ) {
        self.unresolved_edges.push(UnresolvedEdge { owner, destination });
        self.record(IssueKind::EdgeDropped, message);
    }

    /// Counts one behaviour that carried at least one unresolved parameter name.
    pub fn behaviour_had_unresolved_parameters(&mut self) {
        self.behaviours_with_unresolved_parameters += 1;
    }

    /// Nodes skipped.
    #[must_use]
    pub fn nodes_failed(&self) -> usize {
        self.nodes_failed
    }

    /// Edges dropped.
    #[must_use]
    pub fn edges_dropped(&self) -> usize {
        self.edges_dropped
    }

    /// Payload and behaviour fields skipped.
    #[must_use]
    pub fn payload_fields_skipped(&self) -> usize {
        self.payload_fields_skipped
    }

    /// Behaviours with at least one unresolved parameter reference.
    #[must_use]
    pub fn behaviours_with_unresolved_parameters(&self) -> usize {
        self.behaviours_with_unresolved_parameters
    }

    /// Behaviour node references that did not resolve.
    #[must_use]
    pub fn node_refs_unresolved(&self) -> usize {
        self.node_refs_unresolved
    }

    /// Behaviours not migrated at all.
    #[must_use]
    pub fn behaviours_skipped(&self) -> usize {
        self.behaviours_skipped
    }

    /// Parameters not copied.
    #[must_use]
    pub fn parameters_skipped(&self) -> usize {
        self.parameters_skipped
    }

    /// Default nodes recovered by the first-child heuristic (or left unset).
    #[must_use]
    pub fn defaults_recovered(&self) -> usize {
        self.defaults_recovered
    }

    /// Dropped edges as `(owner, destination)` pairs, in drop order.
    #[must_use]
    pub fn unresolved_edges(&self) -> &[UnresolvedEdge] {
        &self.unresolved_edges
    }

    /// All diagnostics in record order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics of one kind.
    pub fn diagnostics_of(&self, kind: IssueKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// Total counted issues.
    #[must_use]
    pub fn total_issues(&self) -> usize {
        self.nodes_failed
            + self.edges_dropped
            + self.payload_fields_skipped
            + self.behaviours_with_unresolved_parameters
            + self.node_refs_unresolved
            + self.behaviours_skipped
            + self.parameters_skipped
            + self.defaults_recovered
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.total_issues() == 0 && self.diagnostics.is_empty()
    }

    /// Non-zero counters as `(label, count)` pairs, for summaries.
    #[must_use]
    pub fn counters(&self) -> Vec<(&'static str, usize)> {
        [
            ("nodes failed", self.nodes_failed),
            ("edges dropped", self.edges_dropped),
            ("payload fields skipped", self.payload_fields_skipped),
            (
                "behaviours with unresolved parameters",
                self.behaviours_with_unresolved_parameters,
            ),
            ("node references unresolved", self.node_refs_unresolved),
            ("behaviours skipped", self.behaviours_skipped),
            ("parameters skipped", self.parameters_skipped),
            ("defaults recovered", self.defaults_recovered),
        ]
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .collect()
    }
}

impl std::fmt::Display for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counters = self.counters();
        if counters.is_empty() {
            return write!(f, "clean");
        }
        let parts: Vec<String> = counters
            .iter()
            .map(|(label, n)| format!("{n} {label}"))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ledger_is_clean() {
        let ledger = Ledger::new();
        assert!(ledger.is_clean());
        assert_eq!(ledger.to_string(), "clean");
    }

    #[test]
    fn edge_drop_keeps_pair_and_counter() {
        let mut ledger = Ledger::new();
        ledger.edge_dropped(TransitionOwner::State(NodeId(3)), NodeId(7), "gone");
        assert_eq!(ledger.edges_dropped(), 1);
        assert_eq!(
            ledger.unresolved_edges(),
            &[UnresolvedEdge {
                owner: TransitionOwner::State(NodeId(3)),
                destination: NodeId(7)
            }]
        );
        assert_eq!(ledger.to_string(), "1 edges dropped");
    }

    #[test]
    fn unresolved_parameter_counts_per_behaviour() {
        let mut ledger = Ledger::new();
        ledger.record(IssueKind::UnresolvedParameter, "a");
        ledger.record(IssueKind::UnresolvedParameter, "b");
        ledger.behaviour_had_unresolved_parameters();
        assert_eq!(ledger.behaviours_with_unresolved_parameters(), 1);
        assert_eq!(ledger.diagnostics_of(IssueKind::UnresolvedParameter).count(), 2);
        assert!(!ledger.is_clean());
    }
}
