// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! [`ConfigStore`] that keeps one JSON file per key in a directory.

use directories::ProjectDirs;
use motion_app_core::config::{ConfigError, ConfigStore};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// One `<key>.json` file per config key under [`FsConfigStore::base`].
#[derive(Debug, Clone)]
pub struct FsConfigStore {
    base: PathBuf,
}

impl FsConfigStore {
    /// Store in the platform preference directory for motion tools
    /// (`~/.config/motionrebuild` on Linux).
    pub fn new() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("dev", "flyingrobots", "MotionRebuild").ok_or_else(|| {
            ConfigError::Backend("no home directory to hold preferences".into())
        })?;
        Self::with_base(dirs.config_dir())
    }

    /// Store in `base`, which is created when missing.
    pub fn with_base(base: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let base = base.as_ref().to_path_buf();
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    /// Directory the files live in.
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn file(&self, key: &str) -> PathBuf {
        self.base.join(key).with_extension("json")
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        fs::read(self.file(key)).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::Io(err),
        })
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        // Readers never observe a partially written file. The staging file
        // is removed on drop if anything below fails.
        let mut staging = NamedTempFile::new_in(&self.base)?;
        staging.write_all(data)?;
        staging.as_file().sync_all()?;
        staging.persist(self.file(key)).map_err(|err| err.error)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use motion_app_core::prefs::{PrefsService, RebuildPrefs};

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsConfigStore::with_base(dir.path()).unwrap();
        assert!(matches!(store.load_raw("absent"), Err(ConfigError::NotFound)));
    }

    #[test]
    fn prefs_survive_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let mut prefs = RebuildPrefs::default();
        prefs.strict = true;
        prefs.options.defer_unresolved_edges = false;
        PrefsService::new(FsConfigStore::with_base(dir.path()).unwrap())
            .save(&prefs)
            .unwrap();

        let reopened = PrefsService::new(FsConfigStore::with_base(dir.path()).unwrap());
        assert_eq!(reopened.load().unwrap(), prefs);
        assert!(dir.path().join("rebuild-prefs.json").exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn failed_save_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsConfigStore::with_base(dir.path()).unwrap();
        // A directory at the target path makes the final rename fail.
        fs::create_dir(dir.path().join("blocked.json")).unwrap();
        fs::write(dir.path().join("blocked.json").join("keep"), b"x").unwrap();

        assert!(matches!(
            store.save_raw("blocked", b"{}"),
            Err(ConfigError::Io(_))
        ));
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("blocked.json")]);
    }
}
