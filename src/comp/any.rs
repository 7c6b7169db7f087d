//! Utilities for dynamic dispatch related to components.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use crate::comp::Component;
use crate::util::DbgTypeId;

/// Object-safe operations on a boxed component value.
pub(crate) trait AnyComp: Send + Sync {
    fn as_any(&self) -> &(dyn Any + Send + Sync);

    fn as_any_mut(&mut self) -> &mut (dyn Any + Send + Sync);

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;

    fn clone_box(&self) -> Box<dyn AnyComp>;

    fn dyn_eq(&self, other: &dyn AnyComp) -> bool;

    fn dyn_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<C: Component> AnyComp for C {
    fn as_any(&self) -> &(dyn Any + Send + Sync) { self }

    fn as_any_mut(&mut self) -> &mut (dyn Any + Send + Sync) { self }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> { self }

    fn clone_box(&self) -> Box<dyn AnyComp> { Box::new(self.clone()) }

    fn dyn_eq(&self, other: &dyn AnyComp) -> bool {
        other.as_any().downcast_ref::<C>().map_or(false, |other| self == other)
    }

    fn dyn_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Debug::fmt(self, f) }
}

/// A TypeMap of owned component values.
///
/// This type is only used in parameter passing, such as the values carried by an archetype,
/// not in the actual storage.
#[derive(Default)]
pub struct Map {
    map: BTreeMap<DbgTypeId, Box<dyn AnyComp>>,
}

impl Map {
    /// Inserts a component into the map, returning the previous value of the same type.
    pub fn insert<C: Component>(&mut self, comp: C) -> Option<C> {
        let prev = self.map.insert(DbgTypeId::of::<C>(), Box::new(comp))?;
        Some(downcast(prev))
    }

    /// Gets a component from the map.
    pub fn get<C: Component>(&self) -> Option<&C> {
        self.map.get(&DbgTypeId::of::<C>()).and_then(|comp| comp.as_any().downcast_ref())
    }

    /// Gets a mutable reference to a component in the map.
    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.map.get_mut(&DbgTypeId::of::<C>()).and_then(|comp| comp.as_any_mut().downcast_mut())
    }

    /// Removes a component from the map.
    pub fn remove<C: Component>(&mut self) -> Option<C> {
        let comp = self.map.remove(&DbgTypeId::of::<C>())?;
        Some(downcast(comp))
    }

    /// Whether the map contains a component of type `C`.
    pub fn contains<C: Component>(&self) -> bool { self.map.contains_key(&DbgTypeId::of::<C>()) }

    /// Returns the number of components in the map.
    pub fn len(&self) -> usize { self.map.len() }

    /// Returns true if the map contains no components.
    pub fn is_empty(&self) -> bool { self.map.is_empty() }

    /// Iterates over the types of the components in the map.
    pub(crate) fn type_ids(&self) -> impl Iterator<Item = DbgTypeId> + '_ {
        self.map.keys().copied()
    }
}

fn downcast<C: Component>(comp: Box<dyn AnyComp>) -> C {
    *comp.into_any().downcast::<C>().expect("TypeId mismatch")
}

impl Clone for Map {
    fn clone(&self) -> Self {
        Self { map: self.map.iter().map(|(&id, comp)| (id, comp.clone_box())).collect() }
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.map.len() == other.map.len()
            && self.map.iter().zip(&other.map).all(|((id1, comp1), (id2, comp2))| {
                id1 == id2 && comp1.dyn_eq(&**comp2)
            })
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Entry<'t>(&'t dyn AnyComp);

        impl fmt::Debug for Entry<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.dyn_fmt(f) }
        }

        f.debug_map().entries(self.map.iter().map(|(id, comp)| (id, Entry(&**comp)))).finish()
    }
}
