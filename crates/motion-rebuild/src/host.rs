// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Progress and cancellation port.
//!
//! The engine is synchronous. It yields to its host only at stage boundaries
//! (and, inside the graph stage, once per root-level node and once per
//! root-level sub-graph) by calling [`RebuildHost`]. Nested walks are never
//! interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

/// Coarse rebuild stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Root checks and clone-root creation.
    Validate,
    /// Parameter table copy.
    Parameters,
    /// Node walk and interleaved edge cloning.
    Graph,
    /// Retry of edges queued during the walk.
    DeferredEdges,
    /// Behaviour migration.
    Behaviours,
    /// Final persist.
    Persist,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Stage::Validate => "validate",
            Stage::Parameters => "parameters",
            Stage::Graph => "graph",
            Stage::DeferredEdges => "deferred edges",
            Stage::Behaviours => "behaviours",
            Stage::Persist => "persist",
        };
        f.write_str(label)
    }
}

/// Host callbacks polled between stages.
pub trait RebuildHost {
    /// Coarse progress in `0.0..=1.0` with a short status line.
    fn report_progress(&mut self, fraction: f32, message: &str);
    /// Polled at every yield point; once `true`, remaining stages are skipped.
    fn is_cancellation_requested(&self) -> bool;
}

/// Host that never cancels and only traces progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentHost;

impl RebuildHost for SilentHost {
    fn report_progress(&mut self, fraction: f32, message: &str) {
        debug!(fraction, "{message}");
    }

    fn is_cancellation_requested(&self) -> bool {
        false
    }
}

/// Shared cancellation flag.
///
/// Clones share one flag, so a UI thread can hold one clone and call
/// [`CancelToken::cancel`] while the rebuild polls another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Fresh, un-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`CancelToken::cancel`] has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl RebuildHost for CancelToken {
    fn report_progress(&mut self, fraction: f32, message: &str) {
        debug!(fraction, "{message}");
    }

    fn is_cancellation_requested(&self) -> bool {
        self.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let polled = token.clone();
        assert!(!polled.is_cancellation_requested());
        token.cancel();
        assert!(polled.is_cancellation_requested());
    }
}
