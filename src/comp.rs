//! A component is a small value attached to every entity.
//!
//! Each component type owns one dense storage, its [manager](crate::storage::Manager),
//! which holds a value for every entity index in the world.
//! An entity that does not logically have the component
//! still has the default value in the storage;
//! the logical presence is tracked separately in the entity [mask](crate::entity::Mask).
//!
//! # Serialization
//! Every component type has a symmetric pair of JSON conversions,
//! [`to_json`](Component::to_json) and [`set_from_json`](Component::set_from_json).
//! Archetypes are serialized as a single JSON object
//! where each component writes itself under its [`NAME`](Component::NAME).
//! A component absent from an archetype object is not part of the archetype.
//!
//! # Registration
//! Component types are registered to the [`world::Builder`](crate::world::Builder)
//! before any entity is created.
//! The registration order determines the [`Id`] of each component type
//! and the order in which storage operations are fanned out.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::util;

pub(crate) mod any;
pub use any::Map;

pub mod builtin;

/// A JSON object, which is the serialized form of an archetype.
pub type Object = serde_json::Map<String, Value>;

/// A component type.
///
/// This trait is usually implemented with `#[derive(tessera::Component)]`.
/// The JSON key defaults to the type name in lowerCamelCase
/// and can be overridden with `#[component(name = "...")]`.
pub trait Component:
    Clone + Default + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The unique name of this component type, used as its JSON key.
    const NAME: &'static str;

    /// Serializes the component value.
    fn to_json(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|source| Error::Json { name: Self::NAME, source })
    }

    /// Overwrites the component value from its serialized form.
    fn set_from_json(&mut self, value: &Value) -> Result<()> {
        let comp =
            Self::deserialize(value).map_err(|source| Error::Json { name: Self::NAME, source })?;
        *self = comp;
        Ok(())
    }

    /// Writes the component into an archetype object.
    fn write_json(&self, object: &mut Object) -> Result<()> {
        let value = self.to_json()?;
        util::merge_json(object, Self::NAME, value);
        Ok(())
    }

    /// Reads the component from an archetype object.
    ///
    /// Returns `None` if the object does not contain this component.
    fn read_json(object: &Object) -> Result<Option<Self>> {
        match object.get(Self::NAME) {
            Some(value) => {
                let mut comp = Self::default();
                comp.set_from_json(value)?;
                Ok(Some(comp))
            }
            None => Ok(None),
        }
    }
}

/// The position of a component type in the registration order.
///
/// Ids are only meaningful for the world they were obtained from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(usize);

impl Id {
    /// Creates an id from a registration position.
    pub fn new(position: usize) -> Self { Self(position) }

    /// The registration position.
    pub fn usize(self) -> usize { self.0 }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "component#{}", self.0) }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Component, Object};
    use crate::error::Error;
    use crate::test_util::{Health, Position};

    #[test]
    fn test_symmetric_json() {
        let position = Position { x: 1.5, y: -2.0 };
        let value = position.to_json().expect("position is serializable");
        assert_eq!(value, json!({"x": 1.5, "y": -2.0}));

        let mut restored = Position::default();
        restored.set_from_json(&value).expect("value was produced by to_json");
        assert_eq!(restored, position);
    }

    #[test]
    fn test_read_missing_key() {
        let object = Object::new();
        assert_eq!(Health::read_json(&object).expect("missing keys are tolerated"), None);
    }

    #[test]
    fn test_read_wrong_type() {
        let mut object = Object::new();
        object.insert(Health::NAME.to_string(), json!("full"));
        let err = Health::read_json(&object).expect_err("a string is not a health value");
        assert!(matches!(err, Error::Json { name: "health", .. }), "unexpected error {err:?}");
    }
}
