//! An entity is a slot that is shared by every component storage.
//!
//! Entities are identified by an [`Index`],
//! which is the position of the entity in every dense component array.
//! Indices are allocated in contiguous [`Pool`]s by the [`Ealloc`].

use std::{fmt, iter, ops};

use serde::{Deserialize, Serialize};
use xias::Xias;

pub mod ealloc;
pub use ealloc::Ealloc;

mod mask;
pub use mask::Mask;

/// Identifies an entity slot in all component storages.
///
/// An index is not reused while the entity is live.
/// It is only recycled after the entity is released or erased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Index(u32);

impl Index {
    /// Creates an index from a position in the dense arrays.
    ///
    /// # Panics
    /// Panics if `position` does not fit in 32 bits.
    pub fn new(position: usize) -> Self { Self(position.small_int()) }

    /// The position of this entity in the dense arrays.
    pub fn usize(self) -> usize { self.0.small_int() }

    /// The raw integer value.
    pub fn get(self) -> u32 { self.0 }

    /// Equivalent to `self + count`.
    pub(crate) fn add(self, count: usize) -> Self { Self::new(self.usize() + count) }
}

impl From<u32> for Index {
    fn from(value: u32) -> Self { Self(value) }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

/// A half-open range `first..last` of entity indices.
///
/// A pool is either a group of live entities allocated together,
/// or a free range available for reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pool {
    /// The first index in the pool.
    pub first: Index,
    /// One past the last index in the pool.
    pub last:  Index,
}

impl Pool {
    /// Creates a pool from `first` (inclusive) to `last` (exclusive).
    ///
    /// # Panics
    /// Panics if `first > last`.
    pub fn new(first: Index, last: Index) -> Self {
        assert!(first <= last, "Invalid entity pool {first}..{last}");
        Self { first, last }
    }

    /// Creates a pool from a range of positions.
    pub fn from_range(range: ops::Range<usize>) -> Self {
        Self::new(Index::new(range.start), Index::new(range.end))
    }

    /// Creates a pool containing exactly one entity.
    pub fn single(index: Index) -> Self { Self::new(index, index.add(1)) }

    /// The number of entities in the pool.
    pub fn len(&self) -> usize { self.last.usize() - self.first.usize() }

    /// Whether the pool contains no entities.
    pub fn is_empty(&self) -> bool { self.first == self.last }

    /// Whether `index` is in this pool.
    pub fn contains(&self, index: Index) -> bool { self.first <= index && index < self.last }

    /// The positions covered by this pool.
    pub fn range(&self) -> ops::Range<usize> { self.first.usize()..self.last.usize() }

    /// Iterates over the indices of this pool in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Index> + iter::FusedIterator {
        self.range().map(Index::new)
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.first.0, self.last.0)
    }
}
