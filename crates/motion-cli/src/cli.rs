// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use motion_app_core::prefs::{OutputFormat, RebuildPrefs};
use motion_rebuild::RebuildOptions;

/// Top-level arguments.
#[derive(Parser, Debug)]
#[command(name = "motion-cli", author, version, about = "Rebuild, inspect and hash motion graphs")]
pub struct Cli {
    /// Directory holding saved preferences (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,
    /// Log engine progress (repeat for more detail); `RUST_LOG` also applies
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log directive for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deep-clone a graph through the rebuild engine
    Rebuild(RebuildArgs),
    /// Print statistics (and optionally the node tree) of a graph
    Inspect {
        /// Graph file (`.json` or `.cbor`)
        input: PathBuf,
        /// List every reachable node with its path
        #[arg(long)]
        tree: bool,
    },
    /// Print the BLAKE3 hash of a graph's canonical encoding
    Hash {
        /// Graph file (`.json` or `.cbor`)
        input: PathBuf,
    },
    /// Show or edit saved preferences
    Config(ConfigArgs),
}

/// Graph encoding on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Pretty-printed JSON
    Json,
    /// Canonical CBOR
    Cbor,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Cbor => OutputFormat::Cbor,
        }
    }
}

/// Arguments of `rebuild`.
#[derive(Args, Debug)]
pub struct RebuildArgs {
    /// Source graph file (`.json` or `.cbor`)
    pub input: PathBuf,
    /// Where to write the rebuilt graph; nothing is written without it
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    /// Clip library directory (overrides the saved one)
    #[arg(long)]
    pub clips: Option<PathBuf>,
    /// Output encoding (overrides the saved one)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
    /// Write the rebuild report as JSON to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
    /// Fail when the rebuild recorded any recoverable issue
    #[arg(long)]
    pub strict: bool,
    /// Drop forward references instead of retrying them after the walk
    #[arg(long)]
    pub no_defer: bool,
    /// Leave unresolvable default nodes unset instead of using the first child
    #[arg(long)]
    pub no_fallback: bool,
    /// Do not migrate behaviours onto cloned nodes
    #[arg(long)]
    pub skip_behaviours: bool,
    /// Maximum distinct notices in the summary
    #[arg(long, default_value_t = 20)]
    pub max_notices: usize,
}

impl RebuildArgs {
    /// Saved preferences with this invocation's flags applied on top.
    pub fn apply(&self, mut prefs: RebuildPrefs) -> RebuildPrefs {
        let options: &mut RebuildOptions = &mut prefs.options;
        if self.no_defer {
            options.defer_unresolved_edges = false;
        }
        if self.no_fallback {
            options.fallback_default_to_first = false;
        }
        if self.skip_behaviours {
            options.migrate_behaviours = false;
        }
        if let Some(dir) = &self.clips {
            prefs.clips_dir = Some(dir.clone());
        }
        if let Some(format) = self.format {
            prefs.format = format.into();
        }
        prefs.strict |= self.strict;
        prefs
    }
}

/// Arguments of `config`. With no edits, prints the saved preferences.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Restore defaults before applying any other edit
    #[arg(long)]
    pub reset: bool,
    /// Save the default output encoding
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
    /// Save the default clip library directory
    #[arg(long)]
    pub clips: Option<PathBuf>,
    /// Save whether rebuilds are strict by default
    #[arg(long)]
    pub strict: Option<bool>,
    /// Save whether forward references are deferred
    #[arg(long)]
    pub defer: Option<bool>,
    /// Save whether default nodes fall back to the first child
    #[arg(long)]
    pub fallback: Option<bool>,
    /// Save whether behaviours are migrated
    #[arg(long)]
    pub behaviours: Option<bool>,
    /// Save whether a cancelled rebuild still persists its partial clone
    #[arg(long)]
    pub persist_on_cancel: Option<bool>,
}

impl ConfigArgs {
    /// Returns `true` if any edit was requested.
    pub fn edits(&self) -> bool {
        self.reset
            || self.format.is_some()
            || self.clips.is_some()
            || self.strict.is_some()
            || self.defer.is_some()
            || self.fallback.is_some()
            || self.behaviours.is_some()
            || self.persist_on_cancel.is_some()
    }

    /// `prefs` with the requested edits applied.
    pub fn apply(&self, prefs: RebuildPrefs) -> RebuildPrefs {
        let mut prefs = if self.reset {
            RebuildPrefs::default()
        } else {
            prefs
        };
        if let Some(format) = self.format {
            prefs.format = format.into();
        }
        if let Some(dir) = &self.clips {
            prefs.clips_dir = Some(dir.clone());
        }
        if let Some(strict) = self.strict {
            prefs.strict = strict;
        }
        let options = &mut prefs.options;
        if let Some(v) = self.defer {
            options.defer_unresolved_edges = v;
        }
        if let Some(v) = self.fallback {
            options.fallback_default_to_first = v;
        }
        if let Some(v) = self.behaviours {
            options.migrate_behaviours = v;
        }
        if let Some(v) = self.persist_on_cancel {
            options.persist_on_cancel = v;
        }
        prefs
    }
}
