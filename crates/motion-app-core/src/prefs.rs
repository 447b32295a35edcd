// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Persisted preferences for rebuild tools.

use std::path::PathBuf;

use motion_rebuild::RebuildOptions;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigService, ConfigStore};

/// Config key the preferences are stored under.
pub const PREFS_KEY: &str = "rebuild-prefs";

/// Encoding used when writing a rebuilt graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// Canonical CBOR.
    Cbor,
}

/// Saved preferences for a rebuild host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RebuildPrefs {
    /// Engine switches.
    pub options: RebuildOptions,
    /// Clip library directory used when none is given explicitly.
    pub clips_dir: Option<PathBuf>,
    /// Output encoding.
    pub format: OutputFormat,
    /// Treat a non-clean ledger as a failure.
    pub strict: bool,
}

/// Loads and saves [`RebuildPrefs`] under [`PREFS_KEY`].
pub struct PrefsService<S> {
    config: ConfigService<S>,
}

impl<S: ConfigStore> PrefsService<S> {
    /// Service over `store`.
    pub fn new(store: S) -> Self {
        Self {
            config: ConfigService::new(store),
        }
    }

    /// Saved preferences, or the defaults if none were saved.
    pub fn load(&self) -> Result<RebuildPrefs, ConfigError> {
        self.config.load_or_default(PREFS_KEY)
    }

    /// Persists `prefs`.
    pub fn save(&self, prefs: &RebuildPrefs) -> Result<(), ConfigError> {
        self.config.save(PREFS_KEY, prefs)
    }

    /// Overwrites saved preferences with the defaults and returns them.
    pub fn reset(&self) -> Result<RebuildPrefs, ConfigError> {
        let prefs = RebuildPrefs::default();
        self.save(&prefs)?;
        Ok(prefs)
    }

    /// Consume the service and return the inner store.
    pub fn into_inner(self) -> S {
        self.config.into_inner()
    }
}
