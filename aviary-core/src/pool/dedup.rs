//! String pool that stores each distinct string once.
//!
//! Flights repeat airline and plane model names and reservations repeat
//! hotel names, so those managers intern through a [`DedupStringPool`]:
//! a lookup in a content-hash index comes first, and only unseen strings are
//! copied into the underlying [`StringPool`].

use core::hash::BuildHasher;

use aviary_types::StoreError;
use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;

use super::strings::{StrSpan, StringPool, StringStore};

/// A [`StringPool`] with a content index.
///
/// The index is keyed by the FxHash of the content. Hash collisions are
/// resolved by comparing the stored text, so two spans compare equal exactly
/// when their strings do.
#[derive(Clone, Debug)]
pub struct DedupStringPool {
    strings: StringPool,
    index: FxHashMap<u64, SmallVec<[StrSpan; 2]>>,
}

impl DedupStringPool {
    /// Creates an empty pool with blocks of `block_capacity` bytes.
    pub fn new(block_capacity: usize) -> Self {
        Self {
            strings: StringPool::new(block_capacity),
            index: FxHashMap::default(),
        }
    }

    /// Number of distinct strings stored.
    #[inline]
    pub fn distinct(&self) -> usize {
        self.strings.len()
    }

    /// Returns the span of `s` if it has already been interned.
    pub fn lookup(&self, s: &str) -> Option<StrSpan> {
        let hash = FxBuildHasher.hash_one(s);
        self.index
            .get(&hash)?
            .iter()
            .copied()
            .find(|&span| self.strings.get(span) == s)
    }
}

impl StringStore for DedupStringPool {
    fn intern(&mut self, s: &str) -> Result<StrSpan, StoreError> {
        let hash = FxBuildHasher.hash_one(s);
        if let Some(bucket) = self.index.get(&hash) {
            if let Some(&span) = bucket.iter().find(|&&span| self.strings.get(span) == s) {
                return Ok(span);
            }
        }

        self.index
            .try_reserve(1)
            .map_err(|_| StoreError::AllocationFailure {
                what: "string index",
                bytes: size_of::<(u64, SmallVec<[StrSpan; 2]>)>(),
            })?;
        let span = self.strings.intern(s)?;
        self.index.entry(hash).or_default().push(span);
        Ok(span)
    }

    #[inline]
    fn get(&self, span: StrSpan) -> &str {
        self.strings.get(span)
    }

    #[inline]
    fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    fn bytes_used(&self) -> usize {
        self.strings.bytes_used()
    }

    #[inline]
    fn block_count(&self) -> usize {
        self.strings.block_count()
    }

    fn clear(&mut self) {
        self.strings.clear();
        self.index.clear();
    }
}
