// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use motion_cas::ClipStore;
use motion_dry_tests::fixtures;
use motion_graph::MotionGraph;
use predicates::prelude::*;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
    source: MotionGraph,
}

impl Workspace {
    fn locomotion() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let fixture = fixtures::locomotion().expect("fixture");
        let source = fixture.graph;
        fs::write(
            dir.path().join("graph.json"),
            serde_json::to_vec(&source).expect("encode"),
        )
        .expect("write graph");
        let clips = dir.path().join("clips");
        fs::create_dir(&clips).expect("clips dir");
        // Files are named by hash so loading also verifies them.
        for hash in fixture.clips.hashes() {
            let bytes = fixture.clips.get(&hash).expect("held clip");
            fs::write(clips.join(format!("{hash}.anim")), &*bytes).expect("write clip");
        }
        Self { dir, source }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("motion-cli").expect("binary");
        cmd.arg("--config-dir").arg(self.path("config"));
        cmd
    }
}

fn read_json_graph(path: &Path) -> MotionGraph {
    serde_json::from_slice(&fs::read(path).expect("read")).expect("decode")
}

// =============================================================================
// REBUILD
// =============================================================================

#[test]
fn rebuild_with_clips_writes_an_equivalent_graph() {
    let ws = Workspace::locomotion();
    ws.cmd()
        .arg("rebuild")
        .arg(ws.path("graph.json"))
        .arg("--clips")
        .arg(ws.path("clips"))
        .arg("-o")
        .arg(ws.path("out.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("rebuilt 8 nodes"))
        .stdout(predicate::str::contains("clean"));

    let clone = read_json_graph(&ws.path("out.json"));
    assert_eq!(clone.stats(), ws.source.stats());
    assert_eq!(clone.parameters(), ws.source.parameters());
}

#[test]
fn cbor_output_decodes_canonically() {
    let ws = Workspace::locomotion();
    ws.cmd()
        .arg("rebuild")
        .arg(ws.path("graph.json"))
        .arg("--clips")
        .arg(ws.path("clips"))
        .args(["--format", "cbor", "-o"])
        .arg(ws.path("out.cbor"))
        .assert()
        .success();

    let bytes = fs::read(ws.path("out.cbor")).expect("read");
    let clone = MotionGraph::from_canonical_bytes(&bytes).expect("decode");
    assert_eq!(clone.stats(), ws.source.stats());
}

#[test]
fn missing_clips_are_reported_but_not_fatal() {
    let ws = Workspace::locomotion();
    ws.cmd()
        .arg("rebuild")
        .arg(ws.path("graph.json"))
        .arg("--report")
        .arg(ws.path("report.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("field skipped"));

    let report: serde_json::Value =
        serde_json::from_slice(&fs::read(ws.path("report.json")).expect("read")).expect("json");
    assert_eq!(report["completion"]["status"], "finished");
    assert_eq!(report["stats"]["nodes_cloned"], 8);
    assert_eq!(report["identity"].as_array().map(Vec::len), Some(8));
}

#[test]
fn strict_rebuild_fails_on_recovered_issues_and_writes_nothing() {
    let ws = Workspace::locomotion();
    ws.cmd()
        .arg("rebuild")
        .arg(ws.path("graph.json"))
        .arg("--strict")
        .arg("-o")
        .arg(ws.path("out.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("strict rebuild recorded issues"));
    assert!(!ws.path("out.json").exists());
}

#[test]
fn no_defer_drops_the_forward_reference() {
    let ws = Workspace::locomotion();
    ws.cmd()
        .arg("rebuild")
        .arg(ws.path("graph.json"))
        .arg("--clips")
        .arg(ws.path("clips"))
        .arg("--no-defer")
        .arg("-o")
        .arg(ws.path("out.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("transition dropped"));

    let clone = read_json_graph(&ws.path("out.json"));
    assert_eq!(clone.stats().transitions, ws.source.stats().transitions - 1);
}

#[test]
fn unreadable_input_fails() {
    let ws = Workspace::locomotion();
    ws.cmd()
        .arg("rebuild")
        .arg(ws.path("absent.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("read graph"));
}

// =============================================================================
// INSPECT / HASH
// =============================================================================

#[test]
fn inspect_tree_lists_nested_paths() {
    let ws = Workspace::locomotion();
    ws.cmd()
        .arg("inspect")
        .arg(ws.path("graph.json"))
        .arg("--tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("Base/Locomotion/Walk"))
        .stdout(predicate::str::contains("blend trees"));
}

#[test]
fn hash_matches_the_canonical_encoding() {
    let ws = Workspace::locomotion();
    let expected = hex::encode(ws.source.compute_hash().expect("hash"));
    ws.cmd()
        .arg("hash")
        .arg(ws.path("graph.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));
}

// =============================================================================
// CONFIG
// =============================================================================

#[test]
fn saved_prefs_drive_later_rebuilds() {
    let ws = Workspace::locomotion();
    ws.cmd()
        .args(["config", "--strict", "true", "--format", "cbor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"cbor\""));

    // Strict from the saved prefs; no clips, so the ledger is not clean.
    ws.cmd()
        .arg("rebuild")
        .arg(ws.path("graph.json"))
        .assert()
        .failure();

    ws.cmd()
        .args(["config", "--clips"])
        .arg(ws.path("clips"))
        .assert()
        .success();
    ws.cmd()
        .arg("rebuild")
        .arg(ws.path("graph.json"))
        .arg("-o")
        .arg(ws.path("out.bin"))
        .assert()
        .success();
    let bytes = fs::read(ws.path("out.bin")).expect("read");
    assert!(MotionGraph::from_canonical_bytes(&bytes).is_ok());
}

#[test]
fn config_reset_restores_defaults() {
    let ws = Workspace::locomotion();
    ws.cmd()
        .args(["config", "--defer", "false"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"defer_unresolved_edges\": false"));
    ws.cmd()
        .args(["config", "--reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"defer_unresolved_edges\": true"));
}
