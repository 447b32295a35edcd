// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Terminal tables for graph statistics and rebuild summaries.

use comfy_table::{presets::UTF8_FULL, Table};
use motion_app_core::summary::{NoticeBoard, NoticeKind};
use motion_graph::{GraphStats, MotionGraph, Node};
use motion_rebuild::RebuildStats;

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(header.to_vec());
    table
}

/// Counts of a graph.
pub fn graph_stats(stats: &GraphStats, parameters: usize) -> Table {
    let mut t = table(&["Item", "Count"]);
    for (label, n) in [
        ("states", stats.states),
        ("machines", stats.machines),
        ("transitions", stats.transitions),
        ("blend trees", stats.blend_trees),
        ("clip references", stats.clips),
        ("behaviours", stats.behaviours),
        ("parameters", parameters),
    ] {
        t.add_row(vec![label.to_owned(), n.to_string()]);
    }
    t
}

/// One row per reachable node, in depth-first order.
pub fn node_tree(graph: &MotionGraph) -> Table {
    let mut t = table(&["Handle", "Path", "Kind", "Transitions", "Behaviours"]);
    for id in graph.reachable() {
        let Some(node) = graph.node(id) else { continue };
        let transitions = match node {
            Node::State(s) => s.transitions.len(),
            Node::Machine(m) => m.any_transitions.len() + m.entry_transitions.len(),
        };
        t.add_row(vec![
            id.to_string(),
            graph.path_of(id).unwrap_or_default(),
            node.kind().to_string(),
            transitions.to_string(),
            node.behaviours().len().to_string(),
        ]);
    }
    t
}

/// Work counters of a rebuild.
pub fn rebuild_stats(stats: &RebuildStats) -> Table {
    let mut t = table(&["Rebuild", "Count"]);
    for (label, n) in [
        ("nodes cloned", stats.nodes_cloned),
        ("edges cloned", stats.edges_cloned),
        ("owners deferred", stats.owners_deferred),
        ("parameters copied", stats.parameters_copied),
        ("behaviours migrated", stats.behaviours_migrated),
    ] {
        t.add_row(vec![label.to_owned(), n.to_string()]);
    }
    t
}

/// Notices with their repeat counts, plus a trailer for overflow.
pub fn notices(board: &NoticeBoard) -> Table {
    let mut t = table(&["", "Notice", "Detail"]);
    for notice in board.notices() {
        let marker = match notice.kind {
            NoticeKind::Info => "info",
            NoticeKind::Warn => "warn",
        };
        let title = if notice.repeat > 1 {
            format!("{} (x{})", notice.title, notice.repeat)
        } else {
            notice.title.clone()
        };
        t.add_row(vec![
            marker.to_owned(),
            title,
            notice.body.clone().unwrap_or_default(),
        ]);
    }
    if board.overflow() > 0 {
        t.add_row(vec![
            "warn".to_owned(),
            format!("{} more notices", board.overflow()),
            String::new(),
        ]);
    }
    t
}
