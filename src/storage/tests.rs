use serde_json::json;

use super::{Dense, Manager};
use crate::comp::{self, Object};
use crate::entity::{Index, Pool};
use crate::test_util::{self, Health, Position};

fn values(storage: &Dense<Health>) -> Vec<i32> {
    storage.as_slice().iter().map(|health| health.0).collect()
}

fn filled(values: &[i32]) -> Dense<Health> {
    let mut storage = Dense::<Health>::new();
    storage.resize_entities(values.len());
    for (position, &value) in values.iter().enumerate() {
        storage.set(Index::new(position), Health(value));
    }
    storage
}

#[test]
fn test_resize_defaults() {
    test_util::init();

    let mut storage = filled(&[1, 2]);
    storage.resize_entities(4);
    assert_eq!(values(&storage), vec![1, 2, 0, 0]);

    storage.resize_entities(1);
    assert_eq!(values(&storage), vec![1], "shrinking keeps the leading entries in order");
}

#[test]
fn test_clear_entity() {
    let mut storage = filled(&[1, 2, 3]);
    storage.clear_entity(Index::new(1));
    assert_eq!(values(&storage), vec![1, 0, 3]);
    assert_eq!(storage.len(), 3, "clearing does not remove the slot");
}

#[test]
fn test_set_with_archetype() {
    let mut storage = filled(&[1, 2, 3, 4]);

    let mut comps = comp::Map::default();
    comps.insert(Health(9));
    storage.set_with_archetype(Pool::from_range(1..3), &comps);
    assert_eq!(values(&storage), vec![1, 9, 9, 4]);

    storage.set_with_archetype(Pool::from_range(0..2), &comp::Map::default());
    assert_eq!(values(&storage), vec![0, 0, 9, 4], "absent components take the default value");
}

#[test]
fn test_insert_archetype_shifts() {
    let mut storage = filled(&[1, 2, 3]);

    let mut comps = comp::Map::default();
    comps.insert(Health(7));
    storage.insert_archetype(Index::new(1), &comps);
    assert_eq!(values(&storage), vec![1, 7, 2, 3]);

    storage.insert_archetype(Index::new(4), &comp::Map::default());
    assert_eq!(values(&storage), vec![1, 7, 2, 3, 0]);
}

#[test]
fn test_erase_entities_shifts() {
    let mut storage = filled(&[1, 2, 3, 4, 5]);
    storage.erase_entities(Pool::from_range(1..3), 2);
    assert_eq!(values(&storage), vec![1, 4, 5]);

    storage.erase_entities(Pool::from_range(1..2), 0);
    assert_eq!(values(&storage), vec![1, 4, 5]);
}

#[test]
#[should_panic = "Cannot erase 3 entities from 1..2 in health with 3 entities"]
fn test_erase_too_many() {
    let mut storage = filled(&[1, 2, 3]);
    storage.erase_entities(Pool::from_range(1..2), 3);
}

#[test]
#[should_panic = "Entity #3 is out of range for health with 3 entities"]
fn test_get_out_of_range() {
    let storage = filled(&[1, 2, 3]);
    storage.get(Index::new(3));
}

#[test]
fn test_json_access() {
    let mut storage = Dense::<Position>::new();
    storage.resize_entities(2);

    storage.set_from_json(Index::new(1), &json!({"x": 3.0, "y": 4.0})).expect("valid position");
    assert_eq!(storage.get(Index::new(1)), &Position { x: 3.0, y: 4.0 });
    assert_eq!(storage.get_json(Index::new(0)).expect("serializable"), json!({"x": 0.0, "y": 0.0}));

    storage.set_from_json(Index::new(0), &json!("origin")).expect_err("not a position");
}

#[test]
fn test_archetype_json() {
    let storage = Dense::<Health>::new();

    let mut comps = comp::Map::default();
    let mut object = Object::new();
    storage.write_archetype_json(&comps, &mut object).expect("nothing to write");
    assert!(object.is_empty(), "absent components are not written");

    comps.insert(Health(5));
    storage.write_archetype_json(&comps, &mut object).expect("serializable");
    assert_eq!(object.get("health"), Some(&json!(5)));

    let mut restored = comp::Map::default();
    assert!(storage.read_archetype_json(&object, &mut restored).expect("valid health"));
    assert_eq!(restored, comps);

    let mut untouched = comp::Map::default();
    assert!(!storage.read_archetype_json(&Object::new(), &mut untouched).expect("missing is ok"));
    assert!(untouched.is_empty());
}

#[test]
fn test_copy_into() {
    let storage = filled(&[4, 8]);
    let mut comps = comp::Map::default();
    storage.copy_into(Index::new(1), &mut comps);
    assert_eq!(comps.get::<Health>(), Some(&Health(8)));
}
