#![allow(missing_docs)]

use std::sync::Arc;

use parking_lot::{Mutex, Once};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::event::{Event, Subject, SubscriberId};
use crate::{world, World};

pub fn init() {
    static SET_LOGGER_ONCE: Once = Once::new();
    SET_LOGGER_ONCE.call_once(env_logger::init);
}

/// An integer component.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, tessera_codegen::Component,
)]
#[component(tessera_as(crate))]
pub struct Health(pub i32);

/// A structured component.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, tessera_codegen::Component,
)]
#[component(tessera_as(crate))]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// A component with an explicit name, used by benches to vary the number of managers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompN<const N: usize>(pub i32);

impl<const N: usize> crate::Component for CompN<N> {
    const NAME: &'static str = ["c0", "c1", "c2", "c3", "c4", "c5", "c6", "c7"][N];
}

/// Builds a world with [`Health`] and [`Position`] registered.
pub fn world() -> World {
    let mut builder = world::Builder::new();
    builder.register::<Health>().register::<Position>();
    builder.build()
}

/// Builds a world with `CompN<0>` through `CompN<7>` registered.
pub fn comp_n_world() -> World {
    let mut builder = world::Builder::new();
    builder
        .register::<CompN<0>>()
        .register::<CompN<1>>()
        .register::<CompN<2>>()
        .register::<CompN<3>>()
        .register::<CompN<4>>()
        .register::<CompN<5>>()
        .register::<CompN<6>>()
        .register::<CompN<7>>();
    builder.build()
}

/// Records every published event in order.
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventRecorder {
    /// Subscribes to every subject of `world`.
    pub fn subscribe_all(&self, world: &mut World) -> Vec<SubscriberId> {
        Subject::iter().map(|subject| self.subscribe(world, subject)).collect()
    }

    /// Subscribes to one subject of `world`.
    pub fn subscribe(&self, world: &mut World, subject: Subject) -> SubscriberId {
        let events = Arc::clone(&self.events);
        world.subscribe(subject, move |event, _| events.lock().push(*event))
    }

    /// Returns and clears the recorded events.
    pub fn take(&self) -> Vec<Event> { std::mem::take(&mut *self.events.lock()) }

    /// Returns and clears the recorded events as `(subject, entity)` pairs.
    pub fn take_pairs(&self) -> Vec<(Subject, u32)> {
        self.take().into_iter().map(|event| (event.subject, event.entity.get())).collect()
    }
}
