//! A structure-of-arrays entity store with archetype-based instantiation.
//!
//! # Entities are indices
//! An entity is identified by an [`Index`],
//! which is its position in the dense array of every component manager.
//! Indices are allocated in contiguous [pools](entity::Pool) by the [allocator](entity::Ealloc),
//! which reuses freed ranges first-fit and coalesces adjacent free ranges.
//!
//! Destroying an entity resets its components and returns the index for reuse.
//! Erasing an entity removes its slot from every array,
//! so all later indices shift down.
//!
//! # Components are dense
//! Each registered [`Component`] type has exactly one [manager](storage::Manager)
//! that holds a value for every index, present or not.
//! The logical presence of a component on an entity is tracked in its [mask](entity::Mask).
//! Every structural operation is fanned out to all managers in registration order,
//! so the arrays are always the same length.
//!
//! # Archetypes and prefabs
//! An [`Archetype`] is a template of component values for one entity.
//! A [`Prefab`] is an ordered tree of archetypes that is instantiated as one contiguous pool,
//! with prefab-local parent links remapped to absolute indices.
//! Both serialize to JSON through the component contract.
//!
//! # Lifecycle events
//! The [`World`] publishes [events](event::Event) to subscribed callbacks
//! synchronously and in subscription order.
//! Callbacks cannot mutate the world directly;
//! they queue mutations in an [offline buffer](world::offline::Buffer)
//! that runs on [`World::flush`].
//!
//! ```
//! use tessera::event::Subject;
//! use tessera::{Archetype, Component};
//!
//! #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize, Component)]
//! struct Health(i32);
//!
//! let mut builder = tessera::world::Builder::new();
//! builder.register::<Health>();
//! let mut world = builder.build();
//!
//! world.subscribe(Subject::Init, |event, _| log::info!("created {}", event.entity));
//!
//! let pool = world.create_many(3, &Archetype::new("unit").with(Health(5))).unwrap();
//! assert_eq!(pool.len(), 3);
//! assert_eq!(world.get::<Health>(pool.first), Some(&Health(5)));
//! ```

#![cfg_attr(not(debug_assertions), deny(missing_docs))]
#![cfg_attr(doc, warn(missing_docs))]

pub mod archetype;
pub use archetype::Archetype;

pub mod comp;
pub use comp::Component;
/// Derives [`Component`] for a type.
///
/// The JSON key defaults to the type name in lowerCamelCase.
/// Use `#[component(name = "...")]` to override it.
pub use tessera_codegen::Component;

pub mod entity;
pub use entity::{Index, Pool};

mod error;
pub use error::{Error, Result};

pub mod event;

pub mod prefab;
pub use prefab::Prefab;

pub mod storage;

#[cfg(any(test, feature = "internal-bench"))]
pub mod test_util;

mod util;

pub mod world;
pub use world::{new, Bundle, World};
