use super::{offline, Components, World};
use crate::comp::Component;
use crate::entity::{ealloc, Ealloc};
use crate::event;

/// This type is used to build a world.
/// No more components can be registered after the builder is built.
pub struct Builder {
    components: Components,
    /// The maximum number of entity indices.
    limit:      usize,
    /// The number of entities to reserve storage for.
    capacity:   usize,
}

impl Default for Builder {
    fn default() -> Self { Self::new() }
}

impl Builder {
    /// Creates a builder with the built-in components registered.
    pub fn new() -> Self {
        Self { components: Components::new(), limit: ealloc::DEFAULT_LIMIT, capacity: 0 }
    }

    /// Registers a component type.
    ///
    /// The registration order is the order in which storage operations are fanned out.
    ///
    /// # Panics
    /// Panics if a component with the same type or name is already registered.
    pub fn register<C: Component>(&mut self) -> &mut Self {
        self.components.register::<C>();
        self
    }

    /// Caps the number of entity indices.
    /// Allocations beyond the limit return [`Error::Exhausted`](crate::Error::Exhausted).
    ///
    /// Limits above [`ealloc::DEFAULT_LIMIT`] are capped to it.
    pub fn entity_limit(&mut self, limit: usize) -> &mut Self {
        self.limit = limit.min(ealloc::DEFAULT_LIMIT);
        self
    }

    /// Reserves storage for `capacity` entities in every component manager.
    pub fn capacity(&mut self, capacity: usize) -> &mut Self {
        self.capacity = capacity;
        self
    }

    /// Constructs the world from the builder.
    pub fn build(self) -> World {
        let mut components = self.components;
        components.reserve(self.capacity);
        log::debug!(
            "Building world with {} components and an entity limit of {}",
            components.count(),
            self.limit
        );

        World {
            components,
            ealloc: Ealloc::new(self.limit),
            events: event::Bus::default(),
            offline: offline::Buffer::default(),
        }
    }
}
