// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rebuild orchestration: stages, cancellation and the final report.

use motion_cas::ClipStore;
use motion_graph::{MotionGraph, Node, NodeId, ParameterTable};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::host::{RebuildHost, Stage};
use crate::identity::IdentityMap;
use crate::ledger::Ledger;
use crate::migrate::{migrate_parameter_table, BehaviourMigrator};
use crate::node::NodeCloner;
use crate::options::RebuildOptions;
use crate::payload::PayloadCloner;
use crate::store::{ObjectStore, StoreError};
use crate::walker::{GraphWalker, WalkContext, WalkFlow, GRAPH_PROGRESS};

/// Structural failure. Nothing usable was produced, or the store broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RebuildError {
    /// The source graph has no root machine.
    #[error("source graph has no root")]
    MissingRoot,
    /// The requested root handle is not in the source graph.
    #[error("root {0} does not exist in the source graph")]
    UnknownRoot(NodeId),
    /// The requested root is a state.
    #[error("root {0} is not a state machine")]
    RootNotMachine(NodeId),
    /// The object store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How a rebuild ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Completion {
    /// Every stage ran.
    Finished,
    /// Cancellation was observed before or during `stage`; later stages were
    /// skipped and the partial clone was left in the store.
    Cancelled {
        /// First stage that did not complete.
        stage: Stage,
    },
}

impl Completion {
    /// Returns `true` for [`Completion::Finished`].
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Completion::Finished)
    }
}

/// Work counters of one rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RebuildStats {
    /// Nodes cloned, root included.
    pub nodes_cloned: usize,
    /// Transitions created in the clone.
    pub edges_cloned: usize,
    /// Owners whose edges waited for the deferred pass.
    pub owners_deferred: usize,
    /// Parameters copied.
    pub parameters_copied: usize,
    /// Behaviours attached to clone nodes.
    pub behaviours_migrated: usize,
}

/// Result of a rebuild that did not fail structurally.
#[derive(Debug, Clone)]
pub struct RebuildReport {
    /// Clone root handle in the destination store.
    pub root: NodeId,
    /// Recoverable issues.
    pub ledger: Ledger,
    /// Whether every stage ran.
    pub completion: Completion,
    /// Source → clone handles of every cloned node.
    pub identity: IdentityMap,
    /// Work counters.
    pub stats: RebuildStats,
}

/// Configured rebuild of one source graph.
///
/// ```
/// use motion_cas::MemoryClipStore;
/// use motion_graph::{MotionGraph, StateNode};
/// use motion_rebuild::{ArenaStore, Rebuilder, SilentHost};
///
/// let mut source = MotionGraph::new("Base");
/// let root = source.root().unwrap();
/// source.add_state(root, StateNode::new("Idle")).unwrap();
///
/// let clips = MemoryClipStore::new();
/// let mut store = ArenaStore::new();
/// let report = Rebuilder::new(&source, &clips)
///     .run(&mut store, &mut SilentHost)
///     .unwrap();
/// assert!(report.ledger.is_clean());
/// assert_eq!(store.graph().stats(), source.stats());
/// ```
pub struct Rebuilder<'a> {
    source: &'a MotionGraph,
    clips: &'a dyn ClipStore,
    options: RebuildOptions,
}

impl<'a> Rebuilder<'a> {
    /// Rebuild of `source` resolving clips in `clips`, with default options.
    pub fn new(source: &'a MotionGraph, clips: &'a dyn ClipStore) -> Self {
        Self {
            source,
            clips,
            options: RebuildOptions::default(),
        }
    }

    /// Replaces the options.
    pub fn options(mut self, options: RebuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Rebuilds from the source root with the source parameter table.
    pub fn run(
        &self,
        store: &mut dyn ObjectStore,
        host: &mut dyn RebuildHost,
    ) -> Result<RebuildReport, RebuildError> {
        let root = self.source.root().ok_or(RebuildError::MissingRoot)?;
        self.run_from(root, self.source.parameters(), store, host)
    }

    /// Rebuilds the sub-graph rooted at `root`, copying `parameters` as the
    /// destination table.
    #[instrument(skip_all, fields(root = %root))]
    pub fn run_from(
        &self,
        root: NodeId,
        parameters: &ParameterTable,
        store: &mut dyn ObjectStore,
        host: &mut dyn RebuildHost,
    ) -> Result<RebuildReport, RebuildError> {
        let root_level = match self.source.node(root) {
            Some(Node::Machine(machine)) => machine,
            Some(Node::State(_)) => return Err(RebuildError::RootNotMachine(root)),
            None => return Err(RebuildError::UnknownRoot(root)),
        };

        info!(stage = %Stage::Validate, "stage started");
        host.report_progress(0.0, "validating source");
        let mut ledger = Ledger::new();
        let mut map = IdentityMap::new();
        let mut stats = RebuildStats::default();
        let clone_root = store.create_node(Node::Machine(root_level.shell()))?;
        map.register(root, clone_root);
        store.set_root(clone_root)?;
        store.mark_dirty(clone_root);

        let completion = self.stages(
            root,
            clone_root,
            parameters,
            &mut StageState {
                store: &mut *store,
                host: &mut *host,
                map: &mut map,
                ledger: &mut ledger,
                stats: &mut stats,
            },
        )?;
        stats.nodes_cloned = map.len();

        if completion.is_finished() || self.options.persist_on_cancel {
            info!(stage = %Stage::Persist, "stage started");
            host.report_progress(0.95, "persisting");
            store.persist()?;
        }
        if completion.is_finished() {
            host.report_progress(1.0, "done");
        }
        info!(?completion, ledger = %ledger, nodes = stats.nodes_cloned, "rebuild finished");

        Ok(RebuildReport {
            root: clone_root,
            ledger,
            completion,
            identity: map,
            stats,
        })
    }

    fn stages(
        &self,
        root: NodeId,
        clone_root: NodeId,
        parameters: &ParameterTable,
        st: &mut StageState<'_>,
    ) -> Result<Completion, RebuildError> {
        if let Some(cancelled) = checkpoint(st.host, Stage::Parameters, 0.05) {
            return Ok(cancelled);
        }
        let table = migrate_parameter_table(parameters, st.ledger);
        st.stats.parameters_copied = table.len();
        st.store.set_parameters(table.clone())?;

        if let Some(cancelled) = checkpoint(st.host, Stage::Graph, GRAPH_PROGRESS.0) {
            return Ok(cancelled);
        }
        let nodes = NodeCloner::new(PayloadCloner::new(self.clips));
        let mut walker = GraphWalker::new(self.source, nodes, self.options);
        let root_path = self
            .source
            .node(root)
            .map_or_else(String::new, |n| n.name().to_owned());
        let mut cx = WalkContext {
            store: &mut *st.store,
            host: &mut *st.host,
            map: &mut *st.map,
            ledger: &mut *st.ledger,
        };
        let flow = walker.walk_level(root, clone_root, &root_path, 0, &mut cx)?;
        st.stats.owners_deferred = walker.owners_deferred();
        if flow == WalkFlow::Cancelled {
            st.stats.edges_cloned = walker.edges_cloned();
            return Ok(Completion::Cancelled { stage: Stage::Graph });
        }

        if let Some(cancelled) = checkpoint(cx.host, Stage::DeferredEdges, 0.85) {
            st.stats.edges_cloned = walker.edges_cloned();
            return Ok(cancelled);
        }
        debug!(owners = walker.pending_len(), "replaying deferred owners");
        walker.resolve_pending(&mut cx)?;
        st.stats.edges_cloned = walker.edges_cloned();

        if self.options.migrate_behaviours {
            if let Some(cancelled) = checkpoint(st.host, Stage::Behaviours, 0.9) {
                return Ok(cancelled);
            }
            st.stats.behaviours_migrated = self.migrate_behaviours(&table, st)?;
        }
        Ok(Completion::Finished)
    }

    #[instrument(skip_all)]
    fn migrate_behaviours(
        &self,
        parameters: &ParameterTable,
        st: &mut StageState<'_>,
    ) -> Result<usize, RebuildError> {
        let migrator = BehaviourMigrator::new(parameters);
        let mut migrated = 0;
        for (source_id, clone_id) in st.map.iter() {
            let Some(node) = self.source.node(source_id) else {
                continue;
            };
            let label = format!("{} ({source_id})", node.name());
            for behaviour in node.behaviours() {
                if let Some(copy) = migrator.migrate_behaviour(behaviour, st.map, st.ledger, &label)
                {
                    st.store.attach_behaviour(clone_id, copy)?;
                    migrated += 1;
                }
            }
            if !node.behaviours().is_empty() {
                st.store.mark_dirty(clone_id);
            }
        }
        Ok(migrated)
    }
}

/// Rebuilds the sub-graph of `source` rooted at `root` into `store`.
///
/// Convenience wrapper over [`Rebuilder::run_from`].
pub fn rebuild(
    source: &MotionGraph,
    root: NodeId,
    parameters: &ParameterTable,
    clips: &dyn ClipStore,
    store: &mut dyn ObjectStore,
    host: &mut dyn RebuildHost,
    options: RebuildOptions,
) -> Result<RebuildReport, RebuildError> {
    Rebuilder::new(source, clips)
        .options(options)
        .run_from(root, parameters, store, host)
}

struct StageState<'s> {
    store: &'s mut dyn ObjectStore,
    host: &'s mut dyn RebuildHost,
    map: &'s mut IdentityMap,
    ledger: &'s mut Ledger,
    stats: &'s mut RebuildStats,
}

/// Polls for cancellation at the start of `stage`, then reports progress.
fn checkpoint(host: &mut dyn RebuildHost, stage: Stage, fraction: f32) -> Option<Completion> {
    if host.is_cancellation_requested() {
        info!(%stage, "cancellation observed at stage boundary");
        return Some(Completion::Cancelled { stage });
    }
    info!(%stage, "stage started");
    host.report_progress(fraction, &stage.to_string());
    None
}
