// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Subcommand implementations.
//!
//! Tables and JSON go to stdout; logs go to stderr.

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use motion_app_core::summary::NoticeBoard;
use motion_cas::MemoryClipStore;
use motion_graph::NodeId;
use motion_rebuild::{
    ArenaStore, Completion, Ledger, RebuildReport, RebuildStats, Rebuilder, SilentHost,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::cli::{ConfigArgs, RebuildArgs};
use crate::{io, render};

/// Machine-readable rebuild report written by `rebuild --report`.
#[derive(Debug, Serialize)]
pub struct ReportDoc<'a> {
    /// Clone root handle.
    pub root: NodeId,
    /// How the rebuild ended.
    pub completion: Completion,
    /// Work counters.
    pub stats: RebuildStats,
    /// Recoverable issues.
    pub ledger: &'a Ledger,
    /// `(source, clone)` handle pairs.
    pub identity: Vec<(NodeId, NodeId)>,
}

impl<'a> From<&'a RebuildReport> for ReportDoc<'a> {
    fn from(report: &'a RebuildReport) -> Self {
        Self {
            root: report.root,
            completion: report.completion,
            stats: report.stats,
            ledger: &report.ledger,
            identity: report.identity.iter().collect(),
        }
    }
}

/// `rebuild`: clone the input graph and report what was recovered.
#[instrument(skip_all, fields(input = %args.input.display()))]
pub fn rebuild(args: &RebuildArgs, config_dir: Option<&Path>) -> Result<()> {
    let prefs = args.apply(io::load_prefs(config_dir));
    let source = io::read_graph(&args.input)?;
    let clips = match &prefs.clips_dir {
        Some(dir) => io::load_clips(dir)?,
        None => MemoryClipStore::new(),
    };

    let mut store = ArenaStore::new();
    let report = Rebuilder::new(&source, &clips)
        .options(prefs.options)
        .run(&mut store, &mut SilentHost)
        .with_context(|| format!("rebuild {}", args.input.display()))?;
    info!(ledger = %report.ledger, nodes = report.stats.nodes_cloned, "rebuild complete");

    let board = NoticeBoard::from_report(&report, args.max_notices);
    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", render::rebuild_stats(&report.stats))?;
    writeln!(out, "{}", render::notices(&board))?;

    if let Some(path) = &args.report {
        let doc = serde_json::to_vec_pretty(&ReportDoc::from(&report))?;
        std::fs::write(path, doc).with_context(|| format!("write report {}", path.display()))?;
    }
    if prefs.strict && !report.ledger.is_clean() {
        bail!("strict rebuild recorded issues: {}", report.ledger);
    }
    if let Some(path) = &args.out {
        io::write_graph(path, store.graph(), prefs.format)?;
    }
    Ok(())
}

/// `inspect`: statistics and, with `tree`, every reachable node.
pub fn inspect(input: &Path, tree: bool) -> Result<()> {
    let graph = io::read_graph(input)?;
    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", render::graph_stats(&graph.stats(), graph.parameters().len()))?;
    if tree {
        writeln!(out, "{}", render::node_tree(&graph))?;
    }
    Ok(())
}

/// `hash`: hex BLAKE3 of the canonical encoding.
pub fn hash(input: &Path) -> Result<()> {
    let graph = io::read_graph(input)?;
    let digest = graph.compute_hash()?;
    writeln!(std::io::stdout().lock(), "{}", hex::encode(digest))?;
    Ok(())
}

/// `config`: apply edits (if any), save, then print the preferences.
pub fn config(args: &ConfigArgs, config_dir: Option<&Path>) -> Result<()> {
    let service = io::prefs_service(config_dir)?;
    let mut prefs = service.load()?;
    if args.edits() {
        prefs = args.apply(prefs);
        service.save(&prefs)?;
        info!("preferences saved");
    }
    writeln!(
        std::io::stdout().lock(),
        "{}",
        serde_json::to_string_pretty(&prefs)?
    )?;
    Ok(())
}
