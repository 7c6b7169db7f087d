//! A prefab is an ordered tree of archetypes instantiated together.
//!
//! The parent link of each archetype is the position of its parent in the prefab,
//! which always precedes the child.
//! Names, archetype ids and parent indices are stored on the archetypes themselves,
//! so their parallel views always have the same length.

use serde_json::Value;

use crate::entity::Index;
use crate::error::{self, Error, Result};
use crate::world::Components;
use crate::{Archetype, World};

/// An ordered tree of archetypes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prefab {
    archetypes: Vec<Archetype>,
}

impl Prefab {
    /// Creates an empty prefab.
    pub fn new() -> Self { Self::default() }

    /// Appends an archetype, returning its prefab-local index.
    ///
    /// # Panics
    /// Panics if the parent of the archetype does not precede it.
    pub fn push(&mut self, archetype: Archetype) -> Index {
        let index = self.archetypes.len();
        if let Err(err) = error::check_parent(index, archetype.parent()) {
            panic!("Cannot add archetype to prefab: {err}");
        }
        self.archetypes.push(archetype);
        Index::new(index)
    }

    /// Appends an archetype.
    ///
    /// # Panics
    /// Panics if the parent of the archetype does not precede it.
    pub fn with(mut self, archetype: Archetype) -> Self {
        self.push(archetype);
        self
    }

    /// The number of archetypes.
    pub fn len(&self) -> usize { self.archetypes.len() }

    /// Whether the prefab has no archetypes.
    pub fn is_empty(&self) -> bool { self.archetypes.is_empty() }

    /// The archetypes in order.
    pub fn archetypes(&self) -> &[Archetype] { &self.archetypes }

    /// Gets a mutable reference to an archetype.
    ///
    /// Parent links changed through this reference are validated on instantiation.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Archetype> {
        self.archetypes.get_mut(index)
    }

    /// The names of the archetypes.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.archetypes.iter().map(Archetype::name)
    }

    /// The prefab-scoped ids of the archetypes, zero if absent.
    pub fn archetype_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.archetypes.iter().map(Archetype::archetype_id)
    }

    /// The prefab-local parent indices of the archetypes.
    pub fn parent_indexes(&self) -> impl Iterator<Item = Option<Index>> + '_ {
        self.archetypes.iter().map(Archetype::parent)
    }

    /// Checks that the prefab is nonempty and every parent precedes its child.
    pub fn validate(&self) -> Result<()> {
        if self.archetypes.is_empty() {
            return Err(Error::Shape { expected: "nonempty prefab" });
        }
        for (index, parent) in self.parent_indexes().enumerate() {
            error::check_parent(index, parent)?;
        }
        Ok(())
    }

    /// Whether all archetypes are identical,
    /// in which case the whole pool is populated from one archetype.
    pub fn is_uniform(&self) -> bool {
        self.archetypes.windows(2).all(|pair| pair[0] == pair[1])
    }

    /// Instantiates the prefab in a world.
    ///
    /// See [`World::instantiate`].
    pub fn instantiate(&self, world: &mut World) -> Result<Vec<Index>> { world.instantiate(self) }

    /// Serializes the prefab as an array of archetype objects.
    pub fn to_json(&self, components: &Components) -> Result<Value> {
        let archetypes = self
            .archetypes
            .iter()
            .map(|archetype| archetype.to_json(components))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Array(archetypes))
    }

    /// Deserializes and validates a prefab.
    pub fn from_json(value: &Value, components: &Components) -> Result<Self> {
        let values = value.as_array().ok_or(Error::Shape { expected: "prefab array" })?;
        let archetypes = values
            .iter()
            .enumerate()
            .map(|(index, value)| Archetype::read_json(value, components, index))
            .collect::<Result<Vec<_>>>()?;

        let prefab = Self { archetypes };
        prefab.validate()?;
        Ok(prefab)
    }

    /// Overwrites this prefab from its serialized form.
    pub fn set_from_json(&mut self, value: &Value, components: &Components) -> Result<()> {
        *self = Self::from_json(value, components)?;
        Ok(())
    }
}
