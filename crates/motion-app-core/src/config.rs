// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Typed JSON config values over a pluggable byte store.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Byte-level backend behind [`ConfigService`].
///
/// Keys reach a backend only after validation, so adapters may map them
/// straight onto file names.
pub trait ConfigStore {
    /// Blob stored under `key`, or [`ConfigError::NotFound`].
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Replaces whatever is stored under `key` with `data`.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Failure reading or writing a config value.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Nothing stored under the key.
    #[error("config key not found")]
    NotFound,
    /// Key is empty or contains characters other than `[A-Za-z0-9_-]`.
    #[error("invalid config key {0:?}")]
    InvalidKey(String),
    /// Backend I/O failed.
    #[error("config i/o: {0}")]
    Io(#[from] std::io::Error),
    /// Stored JSON did not match the requested type, or a value could not be
    /// encoded.
    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),
    /// Backend-specific failure.
    #[error("config backend: {0}")]
    Backend(String),
}

/// Typed JSON values over a [`ConfigStore`].
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Service over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The backend.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the backend, dropping the service.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: ConfigStore> ConfigService<S> {
    /// Value under `key`; `None` when nothing (or an empty blob) is stored.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let key = ConfigKey::parse(key)?;
        let bytes = match self.store.load_raw(key.0) {
            Err(ConfigError::NotFound) => return Ok(None),
            other => other?,
        };
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// [`ConfigService::load`] with `T::default()` standing in for a missing
    /// value.
    pub fn load_or_default<T: DeserializeOwned + Default>(
        &self,
        key: &str,
    ) -> Result<T, ConfigError> {
        self.load(key).map(Option::unwrap_or_default)
    }

    /// Stores `value` under `key` as pretty-printed JSON.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ConfigError> {
        let key = ConfigKey::parse(key)?;
        self.store.save_raw(key.0, &serde_json::to_vec_pretty(value)?)
    }
}

/// A key that is safe to use as a file stem.
struct ConfigKey<'k>(&'k str);

impl<'k> ConfigKey<'k> {
    fn parse(key: &'k str) -> Result<Self, ConfigError> {
        let valid = key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if key.is_empty() || !valid {
            return Err(ConfigError::InvalidKey(key.to_owned()));
        }
        Ok(Self(key))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapStore(RefCell<HashMap<String, Vec<u8>>>);

    impl ConfigStore for MapStore {
        fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
            self.0.borrow().get(key).cloned().ok_or(ConfigError::NotFound)
        }

        fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
            self.0.borrow_mut().insert(key.to_owned(), data.to_vec());
            Ok(())
        }
    }

    #[test]
    fn keys_with_path_separators_are_rejected() {
        let service = ConfigService::new(MapStore::default());
        let err = service.save("../escape", &1_u8).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey(_)));
        assert!(matches!(
            service.load::<u8>("").unwrap_err(),
            ConfigError::InvalidKey(_)
        ));
    }

    #[test]
    fn empty_blob_reads_as_missing() {
        let service = ConfigService::new(MapStore::default());
        service.store().save_raw("blank", b"").unwrap();
        assert_eq!(service.load::<u8>("blank").unwrap(), None);
        assert_eq!(service.load_or_default::<u8>("blank").unwrap(), 0);
    }
}
