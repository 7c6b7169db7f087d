use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::comp::builtin::{ArchetypeId, Name, Parent};
use crate::comp::{self, Component};
use crate::entity::{Index, Mask, Pool};
use crate::error::{Error, Result};
use crate::storage::{Dense, Manager};
use crate::util::DbgTypeId;

/// Stores the component managers of a world.
///
/// Every structural operation is fanned out to all managers in registration order,
/// and all dense arrays always have the same length as the container.
pub struct Components {
    /// Managers keyed by component name, in registration order.
    managers: IndexMap<&'static str, Box<dyn Manager>>,
    /// Looks up the registration position of a component type.
    types:    BTreeMap<DbgTypeId, comp::Id>,
    /// The logical component set of each entity.
    masks:    Vec<Mask>,
    len:      usize,
}

static_assertions::assert_impl_all!(Components: Send, Sync);

impl Default for Components {
    fn default() -> Self { Self::new() }
}

impl Components {
    /// Creates a container with the built-in managers registered.
    pub fn new() -> Self {
        let mut components = Self {
            managers: IndexMap::new(),
            types:    BTreeMap::new(),
            masks:    Vec::new(),
            len:      0,
        };
        components.register::<Name>();
        components.register::<ArchetypeId>();
        components.register::<Parent>();
        components
    }

    /// Registers the manager for `C`.
    ///
    /// # Panics
    /// Panics if entities already exist,
    /// or if a component with the same type or name is already registered.
    pub(crate) fn register<C: Component>(&mut self) -> comp::Id {
        assert!(
            self.len == 0,
            "Cannot register component {} after entities have been created",
            C::NAME
        );

        let id = comp::Id::new(self.managers.len());
        if self.types.insert(DbgTypeId::of::<C>(), id).is_some() {
            panic!("Component type {} is registered twice", std::any::type_name::<C>());
        }
        if self.managers.insert(C::NAME, Box::new(Dense::<C>::new())).is_some() {
            panic!("Component name {:?} is registered twice", C::NAME);
        }

        log::debug!("Registered component {} as {id}", C::NAME);
        id
    }

    /// The number of entity slots in every manager.
    pub fn len(&self) -> usize { self.len }

    /// Whether there are no entity slots.
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// The number of registered component types.
    pub fn count(&self) -> usize { self.managers.len() }

    /// Iterates over the managers in registration order.
    pub fn managers(&self) -> impl Iterator<Item = (comp::Id, &dyn Manager)> + '_ {
        self.managers
            .values()
            .enumerate()
            .map(|(position, manager)| (comp::Id::new(position), &**manager))
    }

    /// Gets the manager of a component id.
    ///
    /// # Panics
    /// Panics if the id is not registered in this container.
    pub fn manager(&self, id: comp::Id) -> &dyn Manager {
        match self.managers.get_index(id.usize()) {
            Some((_, manager)) => &**manager,
            None => panic!("{id} is not registered"),
        }
    }

    pub(crate) fn manager_mut(&mut self, id: comp::Id) -> &mut dyn Manager {
        match self.managers.get_index_mut(id.usize()) {
            Some((_, manager)) => &mut **manager,
            None => panic!("{id} is not registered"),
        }
    }

    /// Looks up the id of a registered component type.
    pub fn try_id_of<C: Component>(&self) -> Option<comp::Id> {
        self.types.get(&DbgTypeId::of::<C>()).copied()
    }

    /// Looks up the id of a registered component type.
    ///
    /// # Panics
    /// Panics if `C` is not registered.
    pub fn id_of<C: Component>(&self) -> comp::Id {
        match self.try_id_of::<C>() {
            Some(id) => id,
            None => panic!(
                "Component type {} is not registered in the world",
                std::any::type_name::<C>()
            ),
        }
    }

    /// Looks up the id of a component by its name.
    pub fn id_by_name(&self, name: &str) -> Result<comp::Id> {
        match self.managers.get_index_of(name) {
            Some(position) => Ok(comp::Id::new(position)),
            None => Err(Error::UnknownComponent { name: name.to_string() }),
        }
    }

    /// Gets the storage of a registered component type.
    ///
    /// # Panics
    /// Panics if `C` is not registered.
    pub fn storage<C: Component>(&self) -> &Dense<C> {
        let id = self.id_of::<C>();
        self.manager(id).as_any().downcast_ref().expect("TypeId mismatch")
    }

    /// Gets the storage of a registered component type.
    ///
    /// # Panics
    /// Panics if `C` is not registered.
    pub fn storage_mut<C: Component>(&mut self) -> &mut Dense<C> {
        let id = self.id_of::<C>();
        self.manager_mut(id).as_any_mut().downcast_mut().expect("TypeId mismatch")
    }

    /// The logical component set of an entity slot.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn mask(&self, index: Index) -> &Mask {
        match self.masks.get(index.usize()) {
            Some(mask) => mask,
            None => panic!("Entity {index} is out of range for {} entities", self.len),
        }
    }

    pub(crate) fn mask_mut(&mut self, index: Index) -> &mut Mask {
        let len = self.len;
        match self.masks.get_mut(index.usize()) {
            Some(mask) => mask,
            None => panic!("Entity {index} is out of range for {len} entities"),
        }
    }

    /// The mask of the components carried by `comps`.
    pub fn mask_of(&self, comps: &comp::Map) -> Mask {
        comps
            .type_ids()
            .filter_map(|type_id| {
                let id = self.types.get(&type_id).copied();
                if id.is_none() {
                    log::warn!("Ignoring unregistered component {type_id:?}");
                }
                id
            })
            .collect()
    }

    /// Reserves capacity for at least `additional` more entities in every manager.
    pub(crate) fn reserve(&mut self, additional: usize) {
        for manager in self.managers.values_mut() {
            manager.reserve(additional);
        }
        self.masks.reserve(additional);
    }

    /// Resizes every manager to exactly `len` entity slots.
    pub(crate) fn resize_entities(&mut self, len: usize) {
        if len == self.len {
            return;
        }

        for manager in self.managers.values_mut() {
            manager.resize_entities(len);
        }
        self.masks.resize_with(len, Mask::default);

        log::debug!("Resized {} components from {} to {len} entities", self.count(), self.len);
        self.len = len;
        self.check_aligned();
    }

    /// Resets an entity slot to default values in every manager.
    pub(crate) fn clear_entity(&mut self, index: Index) {
        for manager in self.managers.values_mut() {
            manager.clear_entity(index);
        }
        *self.mask_mut(index) = Mask::default();
    }

    /// Overwrites every slot in `pool` with the values carried by `comps`.
    pub(crate) fn set_with_archetype(&mut self, pool: Pool, comps: &comp::Map) {
        for manager in self.managers.values_mut() {
            manager.set_with_archetype(pool, comps);
        }

        let mask = self.mask_of(comps);
        self.masks[pool.range()].fill(mask);
        self.check_aligned();
    }

    /// Inserts a slot at `index` with the values carried by `comps` in every manager.
    pub(crate) fn insert_archetype(&mut self, index: Index, comps: &comp::Map) {
        for manager in self.managers.values_mut() {
            manager.insert_archetype(index, comps);
        }

        let mask = self.mask_of(comps);
        self.masks.insert(index.usize(), mask);
        self.len += 1;
        self.check_aligned();
    }

    /// Removes the slots in `pool` from every manager.
    pub(crate) fn erase_archetype(&mut self, pool: Pool) {
        for manager in self.managers.values_mut() {
            manager.erase_entities(pool, pool.len());
        }

        self.masks.drain(pool.range());
        self.len -= pool.len();
        self.check_aligned();
    }

    /// Copies the components present on an entity.
    ///
    /// The built-in name and parent are always copied.
    pub(crate) fn copy_entity(&self, index: Index) -> comp::Map {
        let mut comps = comp::Map::default();
        let mask = self.mask(index);
        for (id, manager) in self.managers() {
            if mask.contains(id) {
                manager.copy_into(index, &mut comps);
            }
        }
        comps.insert(self.storage::<Name>().get(index).clone());
        comps.insert(*self.storage::<Parent>().get(index));
        comps
    }

    fn check_aligned(&self) {
        for (name, manager) in &self.managers {
            assert_eq!(
                manager.len(),
                self.len,
                "Component manager {name} has {} entities, but the world has {}",
                manager.len(),
                self.len
            );
        }
        assert_eq!(self.masks.len(), self.len, "Component masks are misaligned");
    }
}

#[cfg(test)]
mod tests {
    use super::Components;
    use crate::comp::builtin::{Name, Parent};
    use crate::comp::{self, Component};
    use crate::entity::{Index, Pool};
    use crate::error::Error;
    use crate::test_util::{Health, Position};

    fn components() -> Components {
        let mut components = Components::new();
        components.register::<Health>();
        components.register::<Position>();
        components
    }

    #[test]
    fn test_builtin_order() {
        let components = components();
        let names: Vec<_> = components.managers().map(|(_, manager)| manager.name()).collect();
        assert_eq!(names, vec![
            "objectName",
            "archetypeID",
            "transform.parent",
            "health",
            "position"
        ]);
        assert_eq!(components.id_of::<Health>().usize(), 3);
        assert_eq!(components.id_by_name(Position::NAME).expect("registered").usize(), 4);
        assert!(matches!(components.id_by_name("velocity"), Err(Error::UnknownComponent { .. })));
    }

    #[test]
    #[should_panic = "Component name \"health\" is registered twice"]
    fn test_duplicate_name() {
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        struct OtherHealth(u8);

        impl Component for OtherHealth {
            const NAME: &'static str = "health";
        }

        let mut components = components();
        components.register::<OtherHealth>();
    }

    #[test]
    #[should_panic = "Cannot register component position after entities have been created"]
    fn test_register_after_creation() {
        let mut components = Components::new();
        components.resize_entities(1);
        components.register::<Position>();
    }

    #[test]
    fn test_fan_out_alignment() {
        let mut components = components();
        components.resize_entities(3);
        assert!(components.managers().all(|(_, manager)| manager.len() == 3));

        let mut comps = comp::Map::default();
        comps.insert(Health(4));
        components.set_with_archetype(Pool::from_range(0..3), &comps);
        components.insert_archetype(Index::new(1), &comp::Map::default());
        assert_eq!(components.len(), 4);
        assert!(components.managers().all(|(_, manager)| manager.len() == 4));
        assert_eq!(
            components.storage::<Health>().as_slice(),
            &[Health(4), Health(0), Health(4), Health(4)]
        );
        assert!(components.mask(Index::new(0)).contains(components.id_of::<Health>()));
        assert!(components.mask(Index::new(1)).is_empty());

        components.erase_archetype(Pool::from_range(0..2));
        assert_eq!(components.len(), 2);
        assert!(components.managers().all(|(_, manager)| manager.len() == 2));
        assert_eq!(components.storage::<Health>().as_slice(), &[Health(4), Health(4)]);
    }

    #[test]
    fn test_copy_entity() {
        let mut components = components();
        components.resize_entities(1);

        let mut comps = comp::Map::default();
        comps.insert(Health(4));
        components.set_with_archetype(Pool::from_range(0..1), &comps);
        components.storage_mut::<Position>().get_mut(Index::new(0)).x = 3.0;

        let copied = components.copy_entity(Index::new(0));
        assert_eq!(copied.get::<Health>(), Some(&Health(4)));
        assert_eq!(copied.get::<Position>(), None, "absent components are not copied");
        assert_eq!(copied.get::<Name>(), Some(&Name::default()));
        assert_eq!(copied.get::<Parent>(), Some(&Parent(None)));
    }
}
