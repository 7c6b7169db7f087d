//! An archetype is a template of component values for creating one entity.
//!
//! Components absent from an archetype take their default value
//! and are not in the mask of the created entity.
//! Every archetype carries a [`Name`] and a [`Parent`].

use serde_json::Value;

use crate::comp::builtin::{ArchetypeId, Name, Parent};
use crate::comp::{self, Component, Object};
use crate::entity::Index;
use crate::error::{Error, Result};
use crate::world::Components;

/// A template of component values.
#[derive(Debug, Clone, PartialEq)]
pub struct Archetype {
    comps: comp::Map,
}

impl Default for Archetype {
    fn default() -> Self { Self::from_map(comp::Map::default()) }
}

impl Archetype {
    /// Creates an archetype with a name and no parent.
    pub fn new(name: impl Into<String>) -> Self { Self::default().with(Name(name.into())) }

    /// Wraps a component map, adding the built-in components if absent.
    pub(crate) fn from_map(mut comps: comp::Map) -> Self {
        if !comps.contains::<Name>() {
            comps.insert(Name::default());
        }
        if !comps.contains::<Parent>() {
            comps.insert(Parent::default());
        }
        if comps.get::<ArchetypeId>() == Some(&ArchetypeId(0)) {
            comps.remove::<ArchetypeId>();
        }
        Self { comps }
    }

    /// Adds a component value.
    pub fn with<C: Component>(mut self, comp: C) -> Self {
        self.insert(comp);
        self
    }

    /// Sets a component value, returning the previous value.
    ///
    /// An [`ArchetypeId`] of zero is not carried.
    pub fn insert<C: Component>(&mut self, comp: C) -> Option<C> {
        let prev = self.comps.insert(comp);
        if self.comps.get::<ArchetypeId>() == Some(&ArchetypeId(0)) {
            self.comps.remove::<ArchetypeId>();
        }
        prev
    }

    /// Gets a component value.
    pub fn get<C: Component>(&self) -> Option<&C> { self.comps.get::<C>() }

    /// Gets a mutable reference to a component value.
    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> { self.comps.get_mut::<C>() }

    /// Removes a component value.
    ///
    /// Removing a built-in [`Name`] or [`Parent`] resets it to the default instead.
    pub fn remove<C: Component>(&mut self) -> Option<C> {
        let comp = self.comps.remove::<C>();
        *self = Self::from_map(std::mem::take(&mut self.comps));
        comp
    }

    /// Whether the archetype carries the component.
    pub fn contains<C: Component>(&self) -> bool { self.comps.contains::<C>() }

    /// The component values.
    pub fn comps(&self) -> &comp::Map { &self.comps }

    /// The human-readable name.
    pub fn name(&self) -> &str { self.get::<Name>().map_or("", |name| name.0.as_str()) }

    /// Sets the human-readable name.
    pub fn set_name(&mut self, name: impl Into<String>) { self.insert(Name(name.into())); }

    /// The prefab-scoped archetype id, zero if absent.
    pub fn archetype_id(&self) -> u32 { self.get::<ArchetypeId>().map_or(0, |id| id.0) }

    /// Sets the prefab-scoped archetype id. Zero removes it.
    pub fn set_archetype_id(&mut self, id: u32) { self.insert(ArchetypeId(id)); }

    /// The parent link.
    pub fn parent(&self) -> Option<Index> { self.get::<Parent>().and_then(|parent| parent.0) }

    /// Sets the parent link.
    pub fn set_parent(&mut self, parent: Option<Index>) { self.insert(Parent(parent)); }

    /// Serializes the archetype as one JSON object.
    ///
    /// Components are written in the registration order of `components`.
    pub fn to_json(&self, components: &Components) -> Result<Value> {
        let mut object = Object::new();
        for (_, manager) in components.managers() {
            manager.write_archetype_json(&self.comps, &mut object)?;
        }
        Ok(Value::Object(object))
    }

    /// Deserializes an archetype.
    ///
    /// Keys that do not belong to a registered component are ignored.
    /// `transform.parent` is required.
    pub fn from_json(value: &Value, components: &Components) -> Result<Self> {
        Self::read_json(value, components, 0)
    }

    /// Overwrites this archetype from its serialized form.
    pub fn set_from_json(&mut self, value: &Value, components: &Components) -> Result<()> {
        *self = Self::from_json(value, components)?;
        Ok(())
    }

    /// Deserializes the archetype at position `index` of a prefab.
    pub(crate) fn read_json(value: &Value, components: &Components, index: usize) -> Result<Self> {
        let object = value.as_object().ok_or(Error::Shape { expected: "archetype object" })?;

        let mut comps = comp::Map::default();
        for (_, manager) in components.managers() {
            manager.read_archetype_json(object, &mut comps)?;
        }

        if !comps.contains::<Parent>() {
            return Err(Error::MissingParent { index });
        }
        Ok(Self::from_map(comps))
    }
}
