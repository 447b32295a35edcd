// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Clip library held entirely in memory.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{clip_hash, CasError, ClipHash, ClipStore};

/// [`ClipStore`] over a sorted in-memory map.
///
/// Storing bytes that are already present keeps the first copy, so every
/// clip hash maps to exactly one shared allocation.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipStore {
    clips: BTreeMap<ClipHash, Arc<[u8]>>,
    total_bytes: usize,
}

impl MemoryClipStore {
    /// Library with no clips.
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct clips held.
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Returns `true` when the library holds no clips.
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Sum of clip sizes, each distinct clip counted once.
    pub fn byte_count(&self) -> usize {
        self.total_bytes
    }

    /// Hashes of every held clip in ascending order.
    pub fn hashes(&self) -> impl Iterator<Item = ClipHash> + '_ {
        self.clips.keys().copied()
    }

    fn admit(&mut self, hash: ClipHash, bytes: &[u8]) {
        if let std::collections::btree_map::Entry::Vacant(slot) = self.clips.entry(hash) {
            self.total_bytes += bytes.len();
            slot.insert(Arc::from(bytes));
        }
    }
}

impl ClipStore for MemoryClipStore {
    fn put(&mut self, bytes: &[u8]) -> ClipHash {
        let hash = clip_hash(bytes);
        self.admit(hash, bytes);
        hash
    }

    fn put_verified(&mut self, expected: ClipHash, bytes: &[u8]) -> Result<(), CasError> {
        let computed = clip_hash(bytes);
        if computed == expected {
            self.admit(computed, bytes);
            Ok(())
        } else {
            Err(CasError::HashMismatch { expected, computed })
        }
    }

    fn get(&self, hash: &ClipHash) -> Option<Arc<[u8]>> {
        self.clips.get(hash).map(Arc::clone)
    }

    fn has(&self, hash: &ClipHash) -> bool {
        self.clips.contains_key(hash)
    }
}
