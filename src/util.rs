//! Miscellaneous helpers.

use std::any::{self, TypeId};
use std::{cmp, fmt, hash};

/// A [`TypeId`] that remembers its type name for debugging.
#[derive(Clone, Copy)]
pub(crate) struct DbgTypeId {
    pub(crate) id:   TypeId,
    pub(crate) name: &'static str,
}

impl DbgTypeId {
    /// Identifies the type `T`.
    pub(crate) fn of<T: 'static>() -> Self {
        Self { id: TypeId::of::<T>(), name: any::type_name::<T>() }
    }
}

impl fmt::Debug for DbgTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name) }
}

impl PartialEq for DbgTypeId {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl Eq for DbgTypeId {}

impl PartialOrd for DbgTypeId {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> { Some(self.cmp(other)) }
}

impl Ord for DbgTypeId {
    fn cmp(&self, other: &Self) -> cmp::Ordering { self.id.cmp(&other.id) }
}

impl hash::Hash for DbgTypeId {
    fn hash<H: hash::Hasher>(&self, state: &mut H) { self.id.hash(state) }
}

/// Merges `value` into `object[key]`.
///
/// If both the existing and the new value are objects, their fields are merged recursively.
/// Otherwise the new value replaces the existing one.
pub(crate) fn merge_json(
    object: &mut serde_json::Map<String, serde_json::Value>,
    key: &str,
    value: serde_json::Value,
) {
    use serde_json::Value;

    match (object.get_mut(key), value) {
        (Some(Value::Object(existing)), Value::Object(incoming)) => {
            for (inner_key, inner_value) in incoming {
                merge_json(existing, &inner_key, inner_value);
            }
        }
        (_, value) => {
            object.insert(key.to_string(), value);
        }
    }
}
