// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Content-addressed clip library for motion graphs.
//!
//! `motion-cas` provides a [`ClipStore`] trait keyed by the BLAKE3 hash of a
//! clip's bytes. A motion graph never embeds clip content; states carry a
//! [`ClipHash`] and the library decides whether that reference resolves.
//!
//! # Hash Domain Policy
//!
//! The clip hash is content-only: `BLAKE3(bytes)` with no domain prefix. Two
//! clips with identical bytes are the same clip regardless of the name a graph
//! gives them.
//!
//! # Absence Semantics
//!
//! A missing clip is a dangling reference, not an error of the store. Callers
//! that care (the rebuild engine) record it in their own diagnostics.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod memory;
pub use memory::MemoryClipStore;

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 32-byte BLAKE3 content hash identifying one clip.
///
/// Renders as lowercase hex in `Display` and in its serde form so graph files
/// stay human-editable.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ClipHash(pub [u8; 32]);

impl ClipHash {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for ClipHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ClipHash {
    type Err = CasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(s, &mut out).map_err(|_| CasError::InvalidHash(s.to_owned()))?;
        Ok(Self(out))
    }
}

impl Serialize for ClipHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ClipHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Compute the BLAKE3 content hash of clip `bytes`.
pub fn clip_hash(bytes: &[u8]) -> ClipHash {
    let hash = blake3::hash(bytes);
    ClipHash(*hash.as_bytes())
}

/// Errors that can occur during clip library operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CasError {
    /// Clip bytes did not match the declared hash.
    #[error("[CLIP_HASH_MISMATCH] expected {expected}, computed {computed}")]
    HashMismatch {
        /// Hash the caller declared.
        expected: ClipHash,
        /// Hash of the bytes actually supplied.
        computed: ClipHash,
    },
    /// Text was not 64 hex digits.
    #[error("[CLIP_HASH_INVALID] not a clip hash: {0:?}")]
    InvalidHash(String),
}

/// Content-addressed clip library.
///
/// Implementations store opaque clip bytes keyed by their BLAKE3 hash.
pub trait ClipStore {
    /// Stores `bytes` under their content hash and returns it.
    fn put(&mut self, bytes: &[u8]) -> ClipHash;

    /// Stores `bytes` only if they hash to `expected`.
    ///
    /// On mismatch the store is unchanged.
    ///
    /// # Errors
    ///
    /// [`CasError::HashMismatch`] when the content does not match the
    /// declared hash.
    fn put_verified(&mut self, expected: ClipHash, bytes: &[u8]) -> Result<(), CasError>;

    /// Retrieve clip bytes by hash. `None` means the reference dangles.
    fn get(&self, hash: &ClipHash) -> Option<Arc<[u8]>>;

    /// Check whether a clip reference resolves without retrieving it.
    fn has(&self, hash: &ClipHash) -> bool;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hash_text_round_trip() {
        let hash = clip_hash(b"walk_forward");
        let text = hash.to_string();
        assert_eq!(text.len(), 64);
        assert_eq!(text.parse::<ClipHash>().unwrap(), hash);
    }

    #[test]
    fn rejects_short_hex() {
        let err = "abcd".parse::<ClipHash>().unwrap_err();
        assert_eq!(err, CasError::InvalidHash("abcd".into()));
    }

    #[test]
    fn serde_uses_hex_string() {
        let hash = clip_hash(b"idle");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{hash}\""));
        let back: ClipHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
