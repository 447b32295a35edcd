// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Graph files, clip libraries and preference stores on disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use motion_app_core::prefs::{OutputFormat, PrefsService, RebuildPrefs};
use motion_cas::{ClipHash, ClipStore, MemoryClipStore};
use motion_config_fs::FsConfigStore;
use motion_graph::MotionGraph;
use tracing::{debug, warn};

/// Encoding implied by `path`: `.cbor` is canonical CBOR, anything else JSON.
pub fn format_of(path: &Path) -> OutputFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("cbor") => OutputFormat::Cbor,
        _ => OutputFormat::Json,
    }
}

/// Reads a graph file.
pub fn read_graph(path: &Path) -> Result<MotionGraph> {
    let bytes = fs::read(path).with_context(|| format!("read graph {}", path.display()))?;
    let graph = match format_of(path) {
        OutputFormat::Cbor => MotionGraph::from_canonical_bytes(&bytes)?,
        OutputFormat::Json => serde_json::from_slice(&bytes)
            .with_context(|| format!("parse graph {}", path.display()))?,
    };
    debug!(path = %path.display(), nodes = graph.len(), "graph loaded");
    Ok(graph)
}

/// Encodes `graph` as `format`.
pub fn encode_graph(graph: &MotionGraph, format: OutputFormat) -> Result<Vec<u8>> {
    Ok(match format {
        OutputFormat::Cbor => graph.to_canonical_bytes()?,
        OutputFormat::Json => serde_json::to_vec_pretty(graph)?,
    })
}

/// Writes `graph` to `path` as `format`.
pub fn write_graph(path: &Path, graph: &MotionGraph, format: OutputFormat) -> Result<()> {
    let bytes = encode_graph(graph, format)?;
    fs::write(path, bytes).with_context(|| format!("write graph {}", path.display()))?;
    debug!(path = %path.display(), ?format, "graph written");
    Ok(())
}

/// Loads every file in `dir` into a clip library.
///
/// A file whose stem is a 64-digit hex clip hash is verified against its
/// content; any other file is stored under the hash of its bytes.
pub fn load_clips(dir: &Path) -> Result<MemoryClipStore> {
    let mut paths = fs::read_dir(dir)
        .with_context(|| format!("read clip library {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<PathBuf>, _>>()?;
    paths.sort();

    let mut clips = MemoryClipStore::new();
    for path in paths.into_iter().filter(|p| p.is_file()) {
        let bytes = fs::read(&path).with_context(|| format!("read clip {}", path.display()))?;
        let declared = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<ClipHash>().ok());
        match declared {
            Some(expected) => clips
                .put_verified(expected, &bytes)
                .with_context(|| format!("verify clip {}", path.display()))?,
            None => {
                clips.put(&bytes);
            }
        }
    }
    debug!(dir = %dir.display(), clips = clips.len(), "clip library loaded");
    Ok(clips)
}

/// Preference service over `dir`, or over the platform config dir.
pub fn prefs_service(dir: Option<&Path>) -> Result<PrefsService<FsConfigStore>> {
    let store = match dir {
        Some(dir) => FsConfigStore::with_base(dir)?,
        None => FsConfigStore::new()?,
    };
    Ok(PrefsService::new(store))
}

/// Saved preferences, or the defaults when none can be read.
pub fn load_prefs(dir: Option<&Path>) -> RebuildPrefs {
    match prefs_service(dir).and_then(|service| service.load().map_err(Into::into)) {
        Ok(prefs) => prefs,
        Err(err) => {
            warn!("using default preferences: {err:#}");
            RebuildPrefs::default()
        }
    }
}
