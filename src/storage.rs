//! A storage is the data structure where components of the same type for all entities are stored.
//!
//! Every registered component type has exactly one [`Manager`],
//! whose dense array is always as long as the entity index range of the world.
//! Out-of-range indices are programming errors and panic.

use std::any::Any;

use serde_json::Value;

use crate::comp::{self, Object};
use crate::entity::{Index, Pool};
use crate::error::Result;

mod dense;
pub use dense::Dense;

#[cfg(test)]
mod tests;

/// The type-erased contract of a component manager.
///
/// The [components container](crate::world::Components) fans out every structural operation
/// to all managers in registration order,
/// so that all dense arrays stay index-aligned.
pub trait Manager: Send + Sync + 'static {
    /// The name of the component type, used as its JSON key.
    fn name(&self) -> &'static str;

    /// The length of the dense array.
    fn len(&self) -> usize;

    /// Whether the dense array is empty.
    fn is_empty(&self) -> bool { self.len() == 0 }

    /// Reserves capacity for at least `additional` more entities.
    fn reserve(&mut self, additional: usize);

    /// Grows or shrinks the dense array to exactly `len` entries.
    ///
    /// New entries take the default value. Existing entries are never reordered.
    fn resize_entities(&mut self, len: usize);

    /// Resets the entry at `index` to the default value.
    fn clear_entity(&mut self, index: Index);

    /// Overwrites every entry in `pool` with the value carried by `comps`,
    /// or with the default value if `comps` does not carry this component.
    fn set_with_archetype(&mut self, pool: Pool, comps: &comp::Map);

    /// Inserts a new entry at `index` with the value carried by `comps`,
    /// shifting later entries up by one.
    fn insert_archetype(&mut self, index: Index, comps: &comp::Map);

    /// Removes `count` entries starting at `pool.first`,
    /// shifting later entries down by `count`.
    ///
    /// # Panics
    /// Panics if `count` exceeds `len() - pool.first`.
    fn erase_entities(&mut self, pool: Pool, count: usize);

    /// Serializes the entry at `index`.
    fn get_json(&self, index: Index) -> Result<Value>;

    /// Overwrites the entry at `index` from its serialized form.
    fn set_from_json(&mut self, index: Index, value: &Value) -> Result<()>;

    /// Writes the value carried by `comps` into an archetype object,
    /// if `comps` carries this component.
    fn write_archetype_json(&self, comps: &comp::Map, object: &mut Object) -> Result<()>;

    /// Reads this component from an archetype object into `comps`,
    /// returning whether the object contains it.
    fn read_archetype_json(&self, object: &Object, comps: &mut comp::Map) -> Result<bool>;

    /// Copies the entry at `index` into `comps`.
    fn copy_into(&self, index: Index, comps: &mut comp::Map);

    /// Upcasts to [`Any`] for downcasting to the concrete storage.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts to [`Any`] for downcasting to the concrete storage.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
