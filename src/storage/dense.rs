use std::any::Any;

use serde_json::Value;

use super::Manager;
use crate::comp::{self, Component, Object};
use crate::entity::{Index, Pool};
use crate::error::Result;

/// A dense, index-aligned array of component values.
///
/// Every entity index in `0..len()` has a value,
/// which is the default value if the entity does not logically have the component.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense<C: Component> {
    data: Vec<C>,
}

impl<C: Component> Default for Dense<C> {
    fn default() -> Self { Self { data: Vec::new() } }
}

impl<C: Component> Dense<C> {
    /// Creates an empty storage.
    pub fn new() -> Self { Self::default() }

    fn position(&self, index: Index) -> usize {
        let position = index.usize();
        assert!(
            position < self.data.len(),
            "Entity {index} is out of range for {} with {} entities",
            C::NAME,
            self.data.len()
        );
        position
    }

    /// Gets the value at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn get(&self, index: Index) -> &C {
        let position = self.position(index);
        &self.data[position]
    }

    /// Gets a mutable reference to the value at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn get_mut(&mut self, index: Index) -> &mut C {
        let position = self.position(index);
        &mut self.data[position]
    }

    /// Replaces the value at `index`, returning the previous value.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn set(&mut self, index: Index, value: C) -> C {
        std::mem::replace(self.get_mut(index), value)
    }

    /// The values in index order.
    pub fn as_slice(&self) -> &[C] { &self.data }

    /// The values in index order.
    pub fn as_mut_slice(&mut self) -> &mut [C] { &mut self.data }

    /// Iterates over all entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Index, &C)> + '_ {
        self.data.iter().enumerate().map(|(position, value)| (Index::new(position), value))
    }
}

impl<C: Component> Manager for Dense<C> {
    fn name(&self) -> &'static str { C::NAME }

    fn len(&self) -> usize { self.data.len() }

    fn reserve(&mut self, additional: usize) { self.data.reserve(additional) }

    fn resize_entities(&mut self, len: usize) { self.data.resize_with(len, C::default) }

    fn clear_entity(&mut self, index: Index) { *self.get_mut(index) = C::default(); }

    fn set_with_archetype(&mut self, pool: Pool, comps: &comp::Map) {
        assert!(
            pool.last.usize() <= self.data.len(),
            "Entity pool {pool} is out of range for {} with {} entities",
            C::NAME,
            self.data.len()
        );

        let slice = &mut self.data[pool.range()];
        match comps.get::<C>() {
            Some(value) => slice.fill(value.clone()),
            None => slice.fill_with(C::default),
        }
    }

    fn insert_archetype(&mut self, index: Index, comps: &comp::Map) {
        assert!(
            index.usize() <= self.data.len(),
            "Cannot insert entity {index} into {} with {} entities",
            C::NAME,
            self.data.len()
        );

        let value = comps.get::<C>().cloned().unwrap_or_default();
        self.data.insert(index.usize(), value);
    }

    fn erase_entities(&mut self, pool: Pool, count: usize) {
        let start = pool.first.usize();
        assert!(
            start <= self.data.len() && count <= self.data.len() - start,
            "Cannot erase {count} entities from {pool} in {} with {} entities",
            C::NAME,
            self.data.len()
        );

        self.data.drain(start..start + count);
    }

    fn get_json(&self, index: Index) -> Result<Value> { self.get(index).to_json() }

    fn set_from_json(&mut self, index: Index, value: &Value) -> Result<()> {
        self.get_mut(index).set_from_json(value)
    }

    fn write_archetype_json(&self, comps: &comp::Map, object: &mut Object) -> Result<()> {
        match comps.get::<C>() {
            Some(value) => value.write_json(object),
            None => Ok(()),
        }
    }

    fn read_archetype_json(&self, object: &Object, comps: &mut comp::Map) -> Result<bool> {
        match C::read_json(object)? {
            Some(value) => {
                comps.insert(value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn copy_into(&self, index: Index, comps: &mut comp::Map) {
        comps.insert(self.get(index).clone());
    }

    fn as_any(&self) -> &dyn Any { self }

    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}
