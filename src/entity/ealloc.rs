//! Manages entity index allocation and recycling.
//!
//! The allocator partitions `0..len` into live pools and free pools.
//! Allocation is first-fit over the free pools,
//! falling back to appending a new pool at the end.
//! Released pools are coalesced with their free neighbours,
//! and a free range reaching the end is trimmed off so that `len` shrinks.

use std::{cmp, ops};

use bitvec::prelude::BitVec;
use itertools::Itertools;

use super::{Index, Pool};
use crate::error::{Error, Result};

/// The default upper bound of [`Ealloc::len`].
pub const DEFAULT_LIMIT: usize = u32::MAX as usize;

/// The entity index allocator.
#[derive(Debug)]
pub struct Ealloc {
    /// The number of indices in use, which is also the length of every dense array.
    len:    usize,
    /// The maximum value of `len`.
    limit:  usize,
    /// Groups of live entities sorted by `first`.
    live:   Vec<Pool>,
    /// Coalesced ranges available for reuse, sorted by `first`.
    /// The last free pool never ends at `len`.
    free:   Vec<Pool>,
    /// The activation flag of each index. Free indices are always inactive.
    active: BitVec,
}

impl Default for Ealloc {
    fn default() -> Self { Self::new(DEFAULT_LIMIT) }
}

impl Ealloc {
    /// Creates an empty allocator that never grows beyond `limit` indices.
    ///
    /// `limit` is capped at [`DEFAULT_LIMIT`].
    pub fn new(limit: usize) -> Self {
        Self {
            len:    0,
            limit:  cmp::min(limit, DEFAULT_LIMIT),
            live:   Vec::new(),
            free:   Vec::new(),
            active: BitVec::new(),
        }
    }

    /// The number of indices in use.
    pub fn len(&self) -> usize { self.len }

    /// Whether no index is in use.
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// The maximum number of indices.
    pub fn limit(&self) -> usize { self.limit }

    /// The live pools in ascending order.
    pub fn live_pools(&self) -> &[Pool] { &self.live }

    /// The free pools in ascending order.
    pub fn free_pools(&self) -> &[Pool] { &self.free }

    /// The number of live entities.
    pub fn live_count(&self) -> usize { self.live.iter().map(Pool::len).sum() }

    /// Returns the live pool containing `index`.
    pub fn pool_of(&self, index: Index) -> Option<Pool> {
        let position = self.live.partition_point(|pool| pool.first <= index);
        let pool = *self.live.get(position.checked_sub(1)?)?;
        pool.contains(index).then_some(pool)
    }

    /// Whether `index` belongs to a live entity.
    pub fn is_live(&self, index: Index) -> bool { self.pool_of(index).is_some() }

    /// Whether every index in `pool` belongs to a live entity.
    pub fn is_pool_live(&self, pool: Pool) -> bool {
        let covered: usize = self.live[overlapping(&self.live, pool)]
            .iter()
            .map(|&live| intersection_len(live, pool))
            .sum();
        covered == pool.len()
    }

    /// Allocates a contiguous pool of `count` entities.
    ///
    /// The first free pool large enough is reused.
    /// Otherwise a new pool is appended, which increases [`len`](Self::len).
    /// New entities are active.
    ///
    /// A zero `count` returns an empty pool at [`len`](Self::len), which is not tracked.
    pub fn allocate(&mut self, count: usize) -> Result<Pool> {
        if count == 0 {
            return Ok(Pool::from_range(self.len..self.len));
        }

        let pool = match self.free.iter().position(|free| free.len() >= count) {
            Some(position) => {
                let free = self.free.get_mut(position).expect("position is in bounds");
                let pool = Pool::from_range(free.first.usize()..free.first.usize() + count);
                free.first = pool.last;
                if free.is_empty() {
                    self.free.remove(position);
                }
                log::trace!("Reusing freed entity pool {pool}");
                pool
            }
            None => {
                if count > self.limit - self.len {
                    return Err(Error::Exhausted {
                        requested: count,
                        len:       self.len,
                        limit:     self.limit,
                    });
                }

                let pool = Pool::from_range(self.len..self.len + count);
                self.len += count;
                self.active.resize(self.len, false);
                log::trace!("Appending entity pool {pool}");
                pool
            }
        };

        self.active[pool.range()].fill(true);
        insert_sorted(&mut self.live, pool);
        self.check_invariants();
        Ok(pool)
    }

    /// Returns a pool of live entities to the free list.
    ///
    /// The pool may be part of a larger live pool, which is split accordingly.
    ///
    /// # Panics
    /// Panics if any entity in `pool` is not live.
    pub fn release(&mut self, pool: Pool) {
        if pool.is_empty() {
            return;
        }

        self.carve_live(pool);
        self.active[pool.range()].fill(false);
        insert_sorted(&mut self.free, pool);
        coalesce(&mut self.free);
        self.trim();
        self.check_invariants();
    }

    /// Inserts a new live entity at `index`,
    /// shifting every index at or after `index` up by one.
    ///
    /// A pool straddling `index` is split around the new entity.
    ///
    /// # Panics
    /// Panics if `index` is greater than [`len`](Self::len).
    pub fn insert(&mut self, index: Index) -> Result<Pool> {
        assert!(
            index.usize() <= self.len,
            "Cannot insert entity {index} beyond the end of {} entities",
            self.len
        );
        if self.len >= self.limit {
            return Err(Error::Exhausted { requested: 1, len: self.len, limit: self.limit });
        }

        for pools in [&mut self.live, &mut self.free] {
            *pools = pools.iter().flat_map(|&pool| shift_for_insert(pool, index)).collect();
        }

        let pool = Pool::single(index);
        insert_sorted(&mut self.live, pool);
        self.len += 1;
        self.active.insert(index.usize(), true);
        self.check_invariants();
        Ok(pool)
    }

    /// Removes a pool of live entities entirely,
    /// shifting every later index down by `pool.len()`.
    ///
    /// # Panics
    /// Panics if any entity in `pool` is not live.
    pub fn erase(&mut self, pool: Pool) {
        if pool.is_empty() {
            return;
        }

        self.carve_live(pool);

        // No pool intersects `pool` after carving.
        for pools in [&mut self.live, &mut self.free] {
            for item in pools.iter_mut().filter(|item| item.first >= pool.last) {
                let shifted = item.first.usize() - pool.len()..item.last.usize() - pool.len();
                *item = Pool::from_range(shifted);
            }
        }
        coalesce(&mut self.free);

        let tail = self.active.split_off(pool.last.usize());
        self.active.truncate(pool.first.usize());
        self.active.extend_from_bitslice(tail.as_bitslice());
        self.len -= pool.len();

        self.trim();
        self.check_invariants();
    }

    /// Sets the activation flag of a live entity, returning whether it changed.
    ///
    /// # Panics
    /// Panics if `index` is not live.
    pub fn set_active(&mut self, index: Index, active: bool) -> bool {
        assert!(self.is_live(index), "Entity {index} is not live");
        self.active.replace(index.usize(), active) != active
    }

    /// Whether the entity is live and active.
    pub fn is_active(&self, index: Index) -> bool {
        self.active.get(index.usize()).map_or(false, |bit| *bit)
    }

    fn carve_live(&mut self, pool: Pool) {
        assert!(self.is_pool_live(pool), "Entity pool {pool} is not fully live");

        let range = overlapping(&self.live, pool);
        let remains: Vec<_> =
            self.live[range.clone()].iter().flat_map(|&live| split_around(live, pool)).collect();
        self.live.splice(range, remains).for_each(drop);
    }

    fn trim(&mut self) {
        let before = self.len;
        while let Some(&last) = self.free.last() {
            if last.last.usize() != self.len {
                break;
            }
            self.len = last.first.usize();
            self.free.pop();
        }
        self.active.truncate(self.len);

        if self.len != before {
            log::debug!("Trimmed trailing free entities {before} -> {}", self.len);
        }
    }

    fn check_invariants(&self) {
        if !cfg!(debug_assertions) {
            return;
        }

        let mut expected = 0;
        for pool in self.live.iter().merge_by(self.free.iter(), |a, b| a.first <= b.first) {
            assert!(!pool.is_empty(), "Empty entity pool {pool} is tracked");
            assert_eq!(pool.first.usize(), expected, "Entity pools are not contiguous at {pool}");
            expected = pool.last.usize();
        }
        assert_eq!(expected, self.len, "Entity pools do not cover 0..{}", self.len);
        assert_eq!(self.active.len(), self.len, "Activation flags are misaligned");

        assert!(
            self.free.iter().tuple_windows().all(|(a, b)| a.last < b.first),
            "Free pools are not coalesced: {:?}",
            self.free
        );
        assert!(
            self.free.iter().all(|pool| self.active[pool.range()].not_any()),
            "Free entities must be inactive"
        );
    }
}

/// The range of `pools` that intersects `pool`.
fn overlapping(pools: &[Pool], pool: Pool) -> ops::Range<usize> {
    let start = pools.partition_point(|item| item.last <= pool.first);
    let end = pools.partition_point(|item| item.first < pool.last);
    start..cmp::max(start, end)
}

fn intersection_len(a: Pool, b: Pool) -> usize {
    let start = cmp::max(a.first, b.first);
    let end = cmp::min(a.last, b.last);
    end.usize().saturating_sub(start.usize())
}

/// The parts of `pool` outside `hole`.
fn split_around(pool: Pool, hole: Pool) -> impl Iterator<Item = Pool> {
    let left = Pool::new(pool.first, cmp::min(pool.last, cmp::max(pool.first, hole.first)));
    let right = Pool::new(cmp::max(pool.first, cmp::min(pool.last, hole.last)), pool.last);
    [left, right].into_iter().filter(|part| !part.is_empty())
}

fn shift_for_insert(pool: Pool, at: Index) -> impl Iterator<Item = Pool> {
    let (left, right) = if at <= pool.first {
        (None, Some(Pool::new(pool.first.add(1), pool.last.add(1))))
    } else if at < pool.last {
        (Some(Pool::new(pool.first, at)), Some(Pool::new(at.add(1), pool.last.add(1))))
    } else {
        (Some(pool), None)
    };
    left.into_iter().chain(right)
}

fn insert_sorted(pools: &mut Vec<Pool>, pool: Pool) {
    let position = pools.partition_point(|item| item.first < pool.first);
    pools.insert(position, pool);
}

fn coalesce(pools: &mut Vec<Pool>) {
    *pools = pools
        .drain(..)
        .coalesce(|a, b| match a.last == b.first {
            true => Ok(Pool::new(a.first, b.last)),
            false => Err((a, b)),
        })
        .collect();
}
