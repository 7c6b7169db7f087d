//! Operations queued from event callbacks, executed on [`World::flush`].

use std::fmt;

use crate::comp::Component;
use crate::entity::{Index, Pool};
use crate::error::Result;
use crate::{Archetype, Prefab, World};

/// An operation to be executed on the next flush.
pub(crate) trait Operation: Send {
    /// Performs the operation.
    fn run(self: Box<Self>, world: &mut World) -> Result<()>;

    /// Describes the operation for logging.
    fn describe(&self) -> String;
}

struct CreateEntities {
    count:     usize,
    archetype: Archetype,
}

impl Operation for CreateEntities {
    fn run(self: Box<Self>, world: &mut World) -> Result<()> {
        world.create_many(self.count, &self.archetype)?;
        Ok(())
    }

    fn describe(&self) -> String { format!("create {} entities", self.count) }
}

struct InstantiatePrefab {
    prefab: Prefab,
}

impl Operation for InstantiatePrefab {
    fn run(self: Box<Self>, world: &mut World) -> Result<()> {
        world.instantiate(&self.prefab)?;
        Ok(())
    }

    fn describe(&self) -> String { format!("instantiate {} archetypes", self.prefab.len()) }
}

struct Destroy {
    pool: Pool,
}

impl Operation for Destroy {
    fn run(self: Box<Self>, world: &mut World) -> Result<()> {
        world.destroy(self.pool);
        Ok(())
    }

    fn describe(&self) -> String { format!("destroy {}", self.pool) }
}

struct Erase {
    pool: Pool,
}

impl Operation for Erase {
    fn run(self: Box<Self>, world: &mut World) -> Result<()> {
        world.erase(self.pool);
        Ok(())
    }

    fn describe(&self) -> String { format!("erase {}", self.pool) }
}

struct SetActive {
    entity: Index,
    active: bool,
}

impl Operation for SetActive {
    fn run(self: Box<Self>, world: &mut World) -> Result<()> {
        world.set_active(self.entity, self.active);
        Ok(())
    }

    fn describe(&self) -> String { format!("set {} active = {}", self.entity, self.active) }
}

struct AddComponent<C: Component> {
    entity: Index,
    value:  C,
}

impl<C: Component> Operation for AddComponent<C> {
    fn run(self: Box<Self>, world: &mut World) -> Result<()> {
        world.add_component(self.entity, self.value);
        Ok(())
    }

    fn describe(&self) -> String { format!("add {} to {}", C::NAME, self.entity) }
}

struct RemoveComponent<C: Component> {
    entity: Index,
    _ph:    std::marker::PhantomData<fn() -> C>,
}

impl<C: Component> Operation for RemoveComponent<C> {
    fn run(self: Box<Self>, world: &mut World) -> Result<()> {
        world.remove_component::<C>(self.entity);
        Ok(())
    }

    fn describe(&self) -> String { format!("remove {} from {}", C::NAME, self.entity) }
}

/// A queue of mutations requested while the world is borrowed by an event callback.
///
/// Entities created through the buffer do not exist until the buffer is flushed,
/// so the buffer does not return their indices.
///
/// Queued operations refer to entities by raw [`Index`].
/// An erase or insert that runs earlier in the same flush shifts later indices,
/// so operations queued after it target whichever entities now occupy those indices.
#[derive(Default)]
pub struct Buffer {
    items: Vec<Box<dyn Operation>>,
}

impl Buffer {
    /// Queues the creation of an entity.
    pub fn create_entity(&mut self, archetype: Archetype) { self.create_many(1, archetype) }

    /// Queues the creation of a pool of entities sharing one archetype.
    pub fn create_many(&mut self, count: usize, archetype: Archetype) {
        self.items.push(Box::new(CreateEntities { count, archetype }));
    }

    /// Queues the instantiation of a prefab.
    pub fn instantiate(&mut self, prefab: Prefab) {
        self.items.push(Box::new(InstantiatePrefab { prefab }));
    }

    /// Queues the destruction of a pool of entities.
    pub fn destroy(&mut self, pool: Pool) { self.items.push(Box::new(Destroy { pool })); }

    /// Queues the destruction of an entity.
    pub fn destroy_entity(&mut self, entity: Index) { self.destroy(Pool::single(entity)) }

    /// Queues the erasure of a pool of entities.
    pub fn erase(&mut self, pool: Pool) { self.items.push(Box::new(Erase { pool })); }

    /// Queues an activation change.
    pub fn set_active(&mut self, entity: Index, active: bool) {
        self.items.push(Box::new(SetActive { entity, active }));
    }

    /// Queues adding a component to an entity.
    pub fn add_component<C: Component>(&mut self, entity: Index, value: C) {
        self.items.push(Box::new(AddComponent { entity, value }));
    }

    /// Queues removing a component from an entity.
    pub fn remove_component<C: Component>(&mut self, entity: Index) {
        self.items.push(Box::new(RemoveComponent::<C> { entity, _ph: std::marker::PhantomData }));
    }

    /// The number of queued operations.
    pub fn len(&self) -> usize { self.items.len() }

    /// Whether no operation is queued.
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub(crate) fn take(&mut self) -> Vec<Box<dyn Operation>> { std::mem::take(&mut self.items) }

    /// Puts operations back in front of the queue.
    pub(crate) fn requeue(&mut self, mut items: Vec<Box<dyn Operation>>) {
        items.append(&mut self.items);
        self.items = items;
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter().map(|item| item.describe())).finish()
    }
}
