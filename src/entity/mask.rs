use std::fmt;

use bitvec::prelude::BitVec;

use crate::comp;

/// The set of component types logically present on an entity.
///
/// Changing the mask does not resize any storage;
/// an absent component still has a default value in its dense array.
#[derive(Clone, Default)]
pub struct Mask {
    bits: BitVec,
}

impl Mask {
    /// Whether the component is present.
    pub fn contains(&self, id: comp::Id) -> bool {
        self.bits.get(id.usize()).map_or(false, |bit| *bit)
    }

    /// Marks the component as present, returning whether it was absent before.
    pub fn insert(&mut self, id: comp::Id) -> bool {
        let index = id.usize();
        if self.bits.len() <= index {
            self.bits.resize(index + 1, false);
        }
        !self.bits.replace(index, true)
    }

    /// Marks the component as absent, returning whether it was present before.
    pub fn remove(&mut self, id: comp::Id) -> bool {
        match self.bits.get(id.usize()) {
            Some(bit) if *bit => {
                self.bits.set(id.usize(), false);
                true
            }
            _ => false,
        }
    }

    /// Iterates over the present components in id order.
    pub fn iter(&self) -> impl Iterator<Item = comp::Id> + '_ {
        self.bits.iter_ones().map(comp::Id::new)
    }

    /// The number of present components.
    pub fn count(&self) -> usize { self.bits.count_ones() }

    /// Whether no component is present.
    pub fn is_empty(&self) -> bool { self.bits.not_any() }
}

// Trailing zero bits are insignificant.
impl PartialEq for Mask {
    fn eq(&self, other: &Self) -> bool { self.iter().eq(other.iter()) }
}

impl Eq for Mask {}

impl FromIterator<comp::Id> for Mask {
    fn from_iter<I: IntoIterator<Item = comp::Id>>(iter: I) -> Self {
        let mut mask = Self::default();
        for id in iter {
            mask.insert(id);
        }
        mask
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(comp::Id::usize)).finish()
    }
}
