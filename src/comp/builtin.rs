//! Components registered in every world.
//!
//! Every archetype carries a [`Name`] and a [`Parent`].
//! [`ArchetypeId`] is optional and omitted from JSON when zero.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::{Component, Object};
use crate::entity::Index;
use crate::error::{Error, Result};
use crate::util;

/// The human-readable name of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, tessera_codegen::Component)]
#[component(tessera_as(crate), name = "objectName")]
#[serde(transparent)]
pub struct Name(pub String);

/// The prefab-scoped id of the archetype an entity was created from.
///
/// Zero means the entity has no archetype id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchetypeId(pub u32);

impl Component for ArchetypeId {
    const NAME: &'static str = "archetypeID";

    fn write_json(&self, object: &mut Object) -> Result<()> {
        if self.0 != 0 {
            object.insert(Self::NAME.to_string(), Value::from(self.0));
        }
        Ok(())
    }

    fn read_json(object: &Object) -> Result<Option<Self>> {
        match object.get(Self::NAME) {
            Some(value) => {
                let mut id = Self::default();
                id.set_from_json(value)?;
                Ok((id.0 != 0).then_some(id))
            }
            None => Ok(None),
        }
    }
}

/// The parent entity in a hierarchy.
///
/// Inside a [`Prefab`](crate::Prefab), the index is the position of the parent archetype.
/// Inside a [`World`](crate::World), it is the absolute index of the parent entity.
///
/// Serialized as `transform.parent`, where `-1` means no parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Parent(pub Option<Index>);

impl Parent {
    const OBJECT: &'static str = "transform";
    const FIELD: &'static str = "parent";

    /// The integer form of this link, where `-1` means no parent.
    pub fn to_i64(self) -> i64 { self.0.map_or(-1, |index| i64::from(index.get())) }
}

impl Serialize for Parent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.to_i64())
    }
}

impl<'de> Deserialize<'de> for Parent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        match value {
            -1 => Ok(Self(None)),
            _ => match u32::try_from(value) {
                Ok(index) => Ok(Self(Some(Index::from(index)))),
                Err(_) => Err(serde::de::Error::custom(format_args!(
                    "parent index {value} is neither -1 nor a valid entity index"
                ))),
            },
        }
    }
}

impl Component for Parent {
    const NAME: &'static str = "transform.parent";

    fn write_json(&self, object: &mut Object) -> Result<()> {
        let mut transform = Object::new();
        transform.insert(Self::FIELD.to_string(), self.to_json()?);
        util::merge_json(object, Self::OBJECT, Value::Object(transform));
        Ok(())
    }

    fn read_json(object: &Object) -> Result<Option<Self>> {
        let transform = match object.get(Self::OBJECT) {
            Some(Value::Object(transform)) => transform,
            Some(_) => return Err(Error::Shape { expected: "transform object" }),
            None => return Ok(None),
        };
        match transform.get(Self::FIELD) {
            Some(value) => {
                let mut parent = Self::default();
                parent.set_from_json(value)?;
                Ok(Some(parent))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ArchetypeId, Name, Parent};
    use crate::comp::{Component, Object};
    use crate::entity::Index;
    use crate::error::Error;

    fn as_object(value: serde_json::Value) -> Object {
        match value {
            serde_json::Value::Object(object) => object,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_name_key() {
        let mut object = Object::new();
        Name("crate".to_string()).write_json(&mut object).expect("names are serializable");
        assert_eq!(object.get("objectName"), Some(&json!("crate")));
    }

    #[test]
    fn test_archetype_id_omitted_when_zero() {
        let mut object = Object::new();
        ArchetypeId(0).write_json(&mut object).expect("ids are serializable");
        assert!(object.is_empty());

        ArchetypeId(7).write_json(&mut object).expect("ids are serializable");
        assert_eq!(object.get("archetypeID"), Some(&json!(7)));
        assert_eq!(ArchetypeId::read_json(&object).expect("valid id"), Some(ArchetypeId(7)));

        let object = as_object(json!({"archetypeID": 0}));
        assert_eq!(ArchetypeId::read_json(&object).expect("valid id"), None, "zero is absent");
    }

    #[test]
    fn test_parent_merges_transform() {
        let mut object = as_object(json!({"transform": {"position": [0, 1]}}));
        Parent(Some(Index::new(2))).write_json(&mut object).expect("parents are serializable");
        assert_eq!(
            serde_json::Value::Object(object.clone()),
            json!({"transform": {"position": [0, 1], "parent": 2}})
        );
        assert_eq!(
            Parent::read_json(&object).expect("valid parent"),
            Some(Parent(Some(Index::new(2))))
        );

        Parent(None).write_json(&mut object).expect("parents are serializable");
        assert_eq!(object["transform"]["parent"], json!(-1));
        assert_eq!(Parent::read_json(&object).expect("valid parent"), Some(Parent(None)));
    }

    #[test]
    fn test_parent_missing() {
        let object = as_object(json!({"transform": {}}));
        assert_eq!(Parent::read_json(&object).expect("missing is not an error here"), None);
    }

    #[test]
    fn test_parent_invalid() {
        let object = as_object(json!({"transform": {"parent": -3}}));
        let err = Parent::read_json(&object).expect_err("-3 is not a parent index");
        assert!(matches!(err, Error::Json { name: "transform.parent", .. }), "{err:?}");

        let object = as_object(json!({"transform": 5}));
        let err = Parent::read_json(&object).expect_err("transform must be an object");
        assert!(matches!(err, Error::Shape { .. }), "{err:?}");
    }
}
