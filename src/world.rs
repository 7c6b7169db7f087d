//! The world owns all entities and component managers.
//!
//! All mutation goes through [`World`] on a single thread.
//! Lifecycle events are published synchronously to the subscribed callbacks,
//! which may queue further mutations in an [`offline::Buffer`] until [`World::flush`].

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use crate::comp::builtin::Parent;
use crate::comp::{self, Component};
use crate::entity::{Ealloc, Index, Mask, Pool};
use crate::error::Result;
use crate::event::{self, Context, Event, Subject, SubscriberId};
use crate::storage::Dense;
use crate::{Archetype, Prefab};

mod builder;
pub use builder::Builder;

mod components;
pub use components::Components;

pub mod offline;


/// A bundle encapsulates the components and subscriptions for a specific feature.
/// This can be used by library crates to expose their features as a single API.
pub trait Bundle {
    /// Registers the component types used by this bundle.
    fn register(&self, _builder: &mut Builder) {}

    /// Populates the world with subscriptions and initial entities.
    fn populate(&self, _world: &mut World) {}
}

/// Creates a world from bundles.
pub fn new<'t>(bundles: impl IntoIterator<Item = &'t dyn Bundle> + Copy) -> World {
    let mut builder = Builder::new();

    for bundle in bundles {
        bundle.register(&mut builder);
    }

    let mut world = builder.build();

    for bundle in bundles {
        bundle.populate(&mut world);
    }

    world
}

/// The data structure that stores all entities and their components.
pub struct World {
    pub(crate) components: Components,
    pub(crate) ealloc:     Ealloc,
    events:                event::Bus,
    offline:               offline::Buffer,
}

static_assertions::assert_impl_all!(World: Send);

impl World {
    /// The number of entity indices in use, which is the length of every dense array.
    pub fn len(&self) -> usize { self.ealloc.len() }

    /// Whether no entity index is in use.
    pub fn is_empty(&self) -> bool { self.ealloc.is_empty() }

    /// The number of live entities.
    pub fn live_count(&self) -> usize { self.ealloc.live_count() }

    /// Whether the entity is live.
    pub fn is_live(&self, entity: Index) -> bool { self.ealloc.is_live(entity) }

    /// The live entity pools in ascending order.
    pub fn live_pools(&self) -> &[Pool] { self.ealloc.live_pools() }

    /// The free entity pools in ascending order.
    pub fn free_pools(&self) -> &[Pool] { self.ealloc.free_pools() }

    /// The component managers of this world.
    pub fn components(&self) -> &Components { &self.components }

    /// Gets the dense storage of a component type.
    ///
    /// # Panics
    /// Panics if `C` is not registered.
    pub fn storage<C: Component>(&self) -> &Dense<C> { self.components.storage::<C>() }

    fn assert_live(&self, entity: Index) {
        assert!(self.ealloc.is_live(entity), "Entity {entity} is not live");
    }

    fn publish(&mut self, event: Event) {
        let mut ctx = Context {
            components: &self.components,
            ealloc:     &self.ealloc,
            buffer:     &mut self.offline,
        };
        self.events.publish(event, &mut ctx);
    }

    fn publish_all(&mut self, subject: Subject, pool: Pool) {
        for entity in pool.iter() {
            self.publish(Event::new(subject, entity));
        }
    }

    /// Grows the component managers to cover every allocated index.
    fn grow_components(&mut self) {
        if self.ealloc.len() > self.components.len() {
            self.components.resize_entities(self.ealloc.len());
        }
    }

    /// Shrinks the component managers after the allocator trimmed its trailing free range.
    fn shrink_components(&mut self) {
        if self.ealloc.len() < self.components.len() {
            self.components.resize_entities(self.ealloc.len());
        }
    }

    /// Drops the parent links of entities outside `pool` that point into `pool`.
    fn detach_children(&mut self, pool: Pool) {
        let parents = self.components.storage_mut::<Parent>().as_mut_slice();
        for (position, parent) in parents.iter_mut().enumerate() {
            if pool.range().contains(&position) {
                continue;
            }
            if let Parent(Some(index)) = *parent {
                if pool.contains(index) {
                    log::warn!("Dropping parent link of #{position} to removed entity {index}");
                    *parent = Parent(None);
                }
            }
        }
    }

    /// Creates an entity from an archetype.
    pub fn create(&mut self, archetype: &Archetype) -> Result<Index> {
        let pool = self.create_many(1, archetype)?;
        Ok(pool.first)
    }

    /// Creates a contiguous pool of `count` entities sharing one archetype.
    ///
    /// The parent link of the archetype is used as an absolute entity index.
    pub fn create_many(&mut self, count: usize, archetype: &Archetype) -> Result<Pool> {
        let pool = self.ealloc.allocate(count)?;
        self.grow_components();
        self.components.set_with_archetype(pool, archetype.comps());
        log::debug!("Created entities {pool} from {:?}", archetype.name());

        self.publish_all(Subject::Init, pool);
        Ok(pool)
    }

    /// Instantiates all archetypes of a prefab as one contiguous pool.
    ///
    /// Prefab-local parent links are remapped to absolute indices.
    /// Returns the created entities in the same order as the archetypes.
    ///
    /// # Panics
    /// Panics if the prefab is empty or has an archetype whose parent does not precede it.
    pub fn instantiate(&mut self, prefab: &Prefab) -> Result<Vec<Index>> {
        if let Err(err) = prefab.validate() {
            panic!("Cannot instantiate invalid prefab: {err}");
        }

        let pool = self.ealloc.allocate(prefab.len())?;
        self.grow_components();

        if prefab.is_uniform() {
            let archetype = prefab.archetypes().first().expect("allocated pool is nonempty");
            self.components.set_with_archetype(pool, archetype.comps());
        } else {
            for (entity, archetype) in pool.iter().zip(prefab.archetypes()) {
                let mut comps = archetype.comps().clone();
                if let Some(parent) = archetype.parent() {
                    comps.insert(Parent(Some(pool.first.add(parent.usize()))));
                }
                self.components.set_with_archetype(Pool::single(entity), &comps);
            }
        }
        log::debug!("Instantiated prefab of {} archetypes at {pool}", prefab.len());

        self.publish_all(Subject::Init, pool);
        Ok(pool.iter().collect())
    }

    /// Inserts a new entity at `entity`, shifting every later index up by one.
    ///
    /// Parent links to shifted entities are updated.
    /// The parent link of `archetype` refers to the indices after the insertion.
    ///
    /// # Panics
    /// Panics if `entity` is greater than [`len`](Self::len).
    pub fn insert(&mut self, entity: Index, archetype: &Archetype) -> Result<Index> {
        let pool = self.ealloc.insert(entity)?;
        self.components.insert_archetype(entity, archetype.comps());

        let parents = self.components.storage_mut::<Parent>().as_mut_slice();
        for (position, parent) in parents.iter_mut().enumerate() {
            if position == entity.usize() {
                continue;
            }
            if let Parent(Some(index)) = parent {
                if *index >= entity {
                    *index = index.add(1);
                }
            }
        }
        log::debug!("Inserted entity {entity} from {:?}", archetype.name());

        self.publish_all(Subject::Init, pool);
        Ok(entity)
    }

    /// Destroys a pool of live entities.
    ///
    /// `DESTROY` is published for each entity before its components are reset.
    /// Parent links of other entities into the pool are dropped,
    /// and the indices are returned to the allocator for reuse.
    ///
    /// # Panics
    /// Panics if any entity in `pool` is not live.
    pub fn destroy(&mut self, pool: Pool) {
        assert!(self.ealloc.is_pool_live(pool), "Entity pool {pool} is not fully live");

        self.publish_all(Subject::Destroy, pool);
        self.detach_children(pool);

        for entity in pool.iter() {
            self.components.clear_entity(entity);
        }
        self.ealloc.release(pool);
        self.shrink_components();
        log::debug!("Destroyed entities {pool}");
    }

    /// Destroys a live entity.
    pub fn destroy_entity(&mut self, entity: Index) { self.destroy(Pool::single(entity)) }

    /// Erases a pool of live entities, compacting every dense array.
    ///
    /// Every later index shifts down by `pool.len()`.
    /// Parent links into the erased range are dropped and later links are shifted.
    ///
    /// # Panics
    /// Panics if any entity in `pool` is not live.
    pub fn erase(&mut self, pool: Pool) {
        assert!(self.ealloc.is_pool_live(pool), "Entity pool {pool} is not fully live");

        self.publish_all(Subject::Destroy, pool);
        self.detach_children(pool);

        self.components.erase_archetype(pool);
        self.ealloc.erase(pool);
        self.shrink_components();

        let parents = self.components.storage_mut::<Parent>().as_mut_slice();
        for parent in parents {
            if let Parent(Some(index)) = parent {
                if *index >= pool.last {
                    *index = Index::new(index.usize() - pool.len());
                }
            }
        }
        log::debug!("Erased entities {pool}");
    }

    /// Sets the activation flag of a live entity.
    ///
    /// `SET_ACTIVE` or `SET_INACTIVE` is published only if the flag changes.
    /// Returns whether the flag changed.
    ///
    /// # Panics
    /// Panics if the entity is not live.
    pub fn set_active(&mut self, entity: Index, active: bool) -> bool {
        let changed = self.ealloc.set_active(entity, active);
        if changed {
            let subject = if active { Subject::SetActive } else { Subject::SetInactive };
            self.publish(Event::new(subject, entity));
        }
        changed
    }

    /// Whether the entity is live and active.
    pub fn is_active(&self, entity: Index) -> bool { self.ealloc.is_active(entity) }

    /// Gets a component of a live entity.
    ///
    /// Returns `None` if the entity is not live.
    ///
    /// # Panics
    /// Panics if `C` is not registered.
    pub fn get<C: Component>(&self, entity: Index) -> Option<&C> {
        if !self.ealloc.is_live(entity) {
            return None;
        }
        Some(self.components.storage::<C>().get(entity))
    }

    /// Gets a mutable reference to a component of a live entity.
    ///
    /// Returns `None` if the entity is not live.
    ///
    /// # Panics
    /// Panics if `C` is not registered.
    pub fn get_mut<C: Component>(&mut self, entity: Index) -> Option<&mut C> {
        if !self.ealloc.is_live(entity) {
            return None;
        }
        Some(self.components.storage_mut::<C>().get_mut(entity))
    }

    /// Replaces a component value of a live entity, returning the previous value.
    ///
    /// The component mask is not changed.
    ///
    /// # Panics
    /// Panics if the entity is not live or `C` is not registered.
    pub fn set<C: Component>(&mut self, entity: Index, value: C) -> C {
        self.assert_live(entity);
        self.components.storage_mut::<C>().set(entity, value)
    }

    /// The logical component set of a live entity.
    ///
    /// # Panics
    /// Panics if the entity is not live.
    pub fn mask(&self, entity: Index) -> &Mask {
        self.assert_live(entity);
        self.components.mask(entity)
    }

    /// Whether a live entity logically has the component.
    pub fn has_component<C: Component>(&self, entity: Index) -> bool {
        self.mask(entity).contains(self.components.id_of::<C>())
    }

    fn mark_present(&mut self, entity: Index, id: comp::Id) {
        if self.components.mask_mut(entity).insert(id) {
            self.publish(Event::with_comp(Subject::AddComponent, entity, id));
        }
    }

    /// Adds a component to a live entity, overwriting its value.
    ///
    /// `ADD_COMPONENT` is published if the component was absent.
    ///
    /// # Panics
    /// Panics if the entity is not live or `C` is not registered.
    pub fn add_component<C: Component>(&mut self, entity: Index, value: C) {
        self.assert_live(entity);
        let id = self.components.id_of::<C>();
        self.components.storage_mut::<C>().set(entity, value);
        self.mark_present(entity, id);
    }

    /// Removes a component from a live entity, resetting its value to the default.
    ///
    /// `REMOVE_COMPONENT` is published and the previous value is returned
    /// if the component was present.
    ///
    /// # Panics
    /// Panics if the entity is not live or `C` is not registered.
    pub fn remove_component<C: Component>(&mut self, entity: Index) -> Option<C> {
        self.assert_live(entity);
        let id = self.components.id_of::<C>();
        if !self.components.mask_mut(entity).remove(id) {
            return None;
        }

        let value = self.components.storage_mut::<C>().set(entity, C::default());
        self.publish(Event::with_comp(Subject::RemoveComponent, entity, id));
        Some(value)
    }

    /// Serializes a component of a live entity by component name.
    ///
    /// # Panics
    /// Panics if the entity is not live.
    pub fn component_json(&self, entity: Index, name: &str) -> Result<serde_json::Value> {
        self.assert_live(entity);
        let id = self.components.id_by_name(name)?;
        self.components.manager(id).get_json(entity)
    }

    /// Overwrites a component of a live entity from JSON by component name,
    /// adding the component if it was absent.
    ///
    /// # Panics
    /// Panics if the entity is not live.
    pub fn set_component_from_json(
        &mut self,
        entity: Index,
        name: &str,
        value: &serde_json::Value,
    ) -> Result<()> {
        self.assert_live(entity);
        let id = self.components.id_by_name(name)?;
        self.components.manager_mut(id).set_from_json(entity, value)?;
        self.mark_present(entity, id);
        Ok(())
    }

    /// The live entities whose parent is `entity`, in ascending order.
    pub fn children(&self, entity: Index) -> Vec<Index> {
        self.components
            .storage::<Parent>()
            .iter()
            .filter(|&(child, parent)| parent.0 == Some(entity) && self.ealloc.is_live(child))
            .map(|(child, _)| child)
            .collect()
    }

    /// Snapshots the components present on a live entity as an archetype.
    ///
    /// The parent link is the absolute index of the parent entity.
    ///
    /// # Panics
    /// Panics if the entity is not live.
    pub fn to_archetype(&self, entity: Index) -> Archetype {
        self.assert_live(entity);
        Archetype::from_map(self.components.copy_entity(entity))
    }

    /// Snapshots a live entity and all its descendants as a prefab.
    ///
    /// The root comes first and every parent precedes its children.
    /// The root has no parent in the prefab.
    ///
    /// # Panics
    /// Panics if the entity is not live.
    pub fn to_prefab(&self, root: Index) -> Prefab {
        self.assert_live(root);

        let mut locals = BTreeMap::new();
        let mut queue = VecDeque::from([root]);
        let mut prefab = Prefab::new();

        while let Some(entity) = queue.pop_front() {
            let mut archetype = self.to_archetype(entity);
            let parent = match archetype.parent() {
                Some(parent) if entity != root => locals.get(&parent).copied(),
                _ => None,
            };
            archetype.set_parent(parent);

            locals.insert(entity, prefab.push(archetype));
            let children = self.children(entity);
            queue.extend(children.into_iter().filter(|child| !locals.contains_key(child)));
        }

        prefab
    }

    /// Subscribes a callback to a lifecycle subject.
    ///
    /// Callbacks of the same subject are invoked in subscription order.
    pub fn subscribe(
        &mut self,
        subject: Subject,
        callback: impl FnMut(&Event, &mut Context<'_>) + Send + 'static,
    ) -> SubscriberId {
        self.events.subscribe(subject, Box::new(callback))
    }

    /// Removes a subscription, returning whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool { self.events.unsubscribe(id) }

    /// The operations queued by callbacks and not yet flushed.
    pub fn offline(&self) -> &offline::Buffer { &self.offline }

    /// Runs the operations queued by callbacks,
    /// including operations queued while flushing.
    ///
    /// If an operation fails, the remaining operations stay queued and the error is returned.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            let mut items = self.offline.take().into_iter();
            if items.len() == 0 {
                return Ok(());
            }

            while let Some(item) = items.next() {
                log::trace!("Running offline operation: {}", item.describe());
                if let Err(err) = item.run(self) {
                    self.offline.requeue(items.collect());
                    return Err(err);
                }
            }
        }
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("ealloc", &self.ealloc)
            .field("components", &self.components.count())
            .field("subscribers", &self.events)
            .field("offline", &self.offline)
            .finish()
    }
}
