//! Lifecycle events published by the [`World`](crate::World).
//!
//! Systems subscribe a callback to a [`Subject`].
//! Callbacks of the same subject are invoked synchronously in subscription order.
//!
//! A callback cannot mutate the world directly.
//! It receives a [`Context`] with read access to the components
//! and an [offline buffer](crate::world::offline::Buffer)
//! where mutations are queued until [`World::flush`](crate::World::flush).

use std::fmt;

use indexmap::IndexMap;

use crate::comp::{self, Component};
use crate::entity::{Ealloc, Index, Mask};
use crate::world::{offline, Components};

/// A lifecycle subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Subject {
    /// An entity was created.
    Init,
    /// An entity is about to be destroyed or erased.
    Destroy,
    /// An inactive entity became active.
    SetActive,
    /// An active entity became inactive.
    SetInactive,
    /// A component was added to the mask of an entity.
    AddComponent,
    /// A component was removed from the mask of an entity.
    RemoveComponent,
}

/// An event delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// The subject of the event.
    pub subject: Subject,
    /// The affected entity.
    pub entity:  Index,
    /// The affected component for [`Subject::AddComponent`] and [`Subject::RemoveComponent`].
    pub comp:    Option<comp::Id>,
}

impl Event {
    pub(crate) fn new(subject: Subject, entity: Index) -> Self {
        Self { subject, entity, comp: None }
    }

    pub(crate) fn with_comp(subject: Subject, entity: Index, comp: comp::Id) -> Self {
        Self { subject, entity, comp: Some(comp) }
    }
}

/// Identifies a subscription for [`World::unsubscribe`](crate::World::unsubscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

/// The state visible to a callback.
pub struct Context<'t> {
    pub(crate) components: &'t Components,
    pub(crate) ealloc:     &'t Ealloc,
    /// Mutations queued until the next [`World::flush`](crate::World::flush).
    pub buffer:            &'t mut offline::Buffer,
}

impl<'t> Context<'t> {
    /// The components of the world.
    pub fn components(&self) -> &'t Components { self.components }

    /// Gets a component of a live entity.
    pub fn get<C: Component>(&self, index: Index) -> Option<&'t C> {
        self.ealloc.is_live(index).then(|| self.components.storage::<C>().get(index))
    }

    /// The logical component set of an entity.
    pub fn mask(&self, index: Index) -> &'t Mask { self.components.mask(index) }

    /// Whether the entity is live.
    pub fn is_live(&self, index: Index) -> bool { self.ealloc.is_live(index) }

    /// Whether the entity is live and active.
    pub fn is_active(&self, index: Index) -> bool { self.ealloc.is_active(index) }
}

/// A subscribed callback.
pub type Callback = Box<dyn FnMut(&Event, &mut Context<'_>) + Send>;

struct Subscriber {
    subject:  Subject,
    callback: Callback,
}

/// The subscriber table of a world.
#[derive(Default)]
pub(crate) struct Bus {
    next_id:     u64,
    subscribers: IndexMap<SubscriberId, Subscriber>,
}

impl Bus {
    pub(crate) fn subscribe(&mut self, subject: Subject, callback: Callback) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.insert(id, Subscriber { subject, callback });
        log::debug!("Subscribed {id:?} to {subject}");
        id
    }

    /// Removes a subscription, returning whether it existed.
    pub(crate) fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.shift_remove(&id).is_some()
    }

    pub(crate) fn publish(&mut self, event: Event, ctx: &mut Context<'_>) {
        log::trace!("Publishing {} for entity {}", event.subject, event.entity);
        for subscriber in self.subscribers.values_mut() {
            if subscriber.subject == event.subject {
                (subscriber.callback)(&event, ctx);
            }
        }
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.subscribers.iter().map(|(id, subscriber)| (id, subscriber.subject)))
            .finish()
    }
}
