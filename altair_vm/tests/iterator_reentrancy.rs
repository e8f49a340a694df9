// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Iteration while user code mutates the storage underneath. Getters run
//! mid-walk and are free to delete entries, add entries, or force a
//! representation change; the iterators must re-validate their position
//! instead of touching stale storage.

use altair_vm::ecmascript::{
    builtins::{create_builtin_function, ArgumentsList, Behaviour},
    execution::{agent::Options, Agent, JsResult},
    types::{Object, ObjectHeapData, Value},
};
use altair_vm::heap::{
    indexed_properties::{
        self, chain::ArrayPropertyIterator, iterator::IndexedPropertyIterator,
        IndexedProperties,
    },
    CreateHeapData,
};

fn verifying_agent() -> Agent {
    Agent::new(Options {
        verify_storage_integrity: true,
    })
}

fn plain_object(agent: &mut Agent) -> Object {
    Object::Object(agent.heap.create(ObjectHeapData::default()))
}

/// Getter that deletes the entry two places up on its receiver.
fn deleting_getter(agent: &mut Agent, this: Value, _args: ArgumentsList) -> JsResult<Value> {
    let object = Object::try_from(this).unwrap();
    indexed_properties::delete(agent, object, 12);
    Ok(Value::Integer(10))
}

/// Getter that pushes its receiver's storage into the tree
/// representation.
fn converting_getter(agent: &mut Agent, this: Value, _args: ArgumentsList) -> JsResult<Value> {
    let object = Object::try_from(this).unwrap();
    indexed_properties::put(agent, object, 60_000_000, Value::Integer(60)).unwrap();
    Ok(Value::Integer(20))
}

#[test]
fn getter_deleting_an_upcoming_entry_is_observed() {
    let mut agent = verifying_agent();
    let object = plain_object(&mut agent);
    let getter = create_builtin_function(&mut agent, Behaviour::Regular(deleting_getter), "get", 0);
    indexed_properties::define_getter(&mut agent, object, 10, Value::from(getter));
    indexed_properties::put(&mut agent, object, 11, Value::Integer(11)).unwrap();
    indexed_properties::put(&mut agent, object, 12, Value::Integer(12)).unwrap();
    indexed_properties::put(&mut agent, object, 13, Value::Integer(13)).unwrap();

    let mut iterator = IndexedPropertyIterator::new(object);
    let mut seen = Vec::new();
    while iterator.next(&agent).is_some() {
        seen.push(iterator.get_value(&mut agent).unwrap().unwrap());
    }
    // The getter at 10 removed index 12 before the walk reached it.
    assert_eq!(
        seen,
        vec![Value::Integer(10), Value::Integer(11), Value::Integer(13)]
    );
}

#[test]
fn getter_changing_the_representation_mid_walk() {
    let mut agent = verifying_agent();
    let object = plain_object(&mut agent);
    let getter =
        create_builtin_function(&mut agent, Behaviour::Regular(converting_getter), "get", 0);
    indexed_properties::put(&mut agent, object, 0, Value::Integer(0)).unwrap();
    indexed_properties::define_getter(&mut agent, object, 1, Value::from(getter));
    indexed_properties::put(&mut agent, object, 2, Value::Integer(2)).unwrap();

    let mut iterator = IndexedPropertyIterator::new(object);
    let mut seen = Vec::new();
    while let Some(index) = iterator.next(&agent) {
        seen.push((index, iterator.get_value(&mut agent).unwrap().unwrap()));
    }
    // The getter's far write converted the storage to the tree
    // representation; the walk continued over it and found the new
    // entry in order.
    assert!(matches!(
        object.indexed_properties(&agent),
        IndexedProperties::Sparse(_)
    ));
    assert_eq!(
        seen,
        vec![
            (0, Value::Integer(0)),
            (1, Value::Integer(20)),
            (2, Value::Integer(2)),
            (60_000_000, Value::Integer(60)),
        ]
    );
}

#[test]
fn chain_walk_survives_prototype_mutation() {
    let mut agent = verifying_agent();
    let prototype = plain_object(&mut agent);
    let receiver = Object::Object(agent.heap.create(ObjectHeapData {
        prototype: Some(prototype),
        indexed: IndexedProperties::None,
    }));
    indexed_properties::put(&mut agent, receiver, 0, Value::Integer(0)).unwrap();
    indexed_properties::put(&mut agent, prototype, 1, Value::Integer(-1)).unwrap();
    indexed_properties::put(&mut agent, prototype, 3, Value::Integer(-3)).unwrap();

    let mut iterator = ArrayPropertyIterator::new(&agent, receiver);
    assert_eq!(iterator.next(&agent), Some(0));
    assert_eq!(iterator.next(&agent), Some(1));
    // Mutate the prototype while positioned on its entry.
    indexed_properties::delete(&mut agent, prototype, 3);
    indexed_properties::put(&mut agent, prototype, 2, Value::Integer(-2)).unwrap();
    iterator.flush_cache();

    assert_eq!(iterator.next(&agent), Some(2));
    assert_eq!(
        iterator.get_value(&mut agent).unwrap(),
        Some(Value::Integer(-2))
    );
    assert_eq!(iterator.next(&agent), None);
}

/// Getter that stores an entry on its receiver's empty prototype.
fn prototype_seeding_getter(
    agent: &mut Agent,
    this: Value,
    _args: ArgumentsList,
) -> JsResult<Value> {
    let object = Object::try_from(this).unwrap();
    let prototype = object.prototype(agent).unwrap();
    indexed_properties::put(agent, prototype, 5, Value::Integer(55)).unwrap();
    Ok(Value::Integer(0))
}

#[test]
fn getter_populating_an_empty_prototype_mid_walk() {
    let mut agent = verifying_agent();
    let prototype = plain_object(&mut agent);
    let receiver = Object::Object(agent.heap.create(ObjectHeapData {
        prototype: Some(prototype),
        indexed: IndexedProperties::None,
    }));
    let getter = create_builtin_function(
        &mut agent,
        Behaviour::Regular(prototype_seeding_getter),
        "get",
        0,
    );
    indexed_properties::define_getter(&mut agent, receiver, 0, Value::from(getter));
    indexed_properties::put(&mut agent, receiver, 1, Value::Integer(1)).unwrap();

    // The prototype holds nothing when the walk begins; the getter at
    // 0 adds an entry to it that the walk must still visit.
    let mut iterator = ArrayPropertyIterator::new(&agent, receiver);
    let mut seen = Vec::new();
    while let Some(index) = iterator.next(&agent) {
        iterator.get_value(&mut agent).unwrap();
        iterator.flush_cache();
        seen.push(index);
    }
    assert_eq!(seen, vec![0, 1, 5]);
    assert_eq!(
        indexed_properties::get_from_chain(&mut agent, receiver, 5).unwrap(),
        Some(Value::Integer(55))
    );
}

#[test]
fn deleting_through_the_iterator_keeps_positions_valid() {
    let mut agent = verifying_agent();
    let object = plain_object(&mut agent);
    for index in 0..16u32 {
        indexed_properties::put(&mut agent, object, index * 1000, Value::Integer(index as i32))
            .unwrap();
    }

    // Delete every other entry while walking forwards.
    let mut iterator = IndexedPropertyIterator::new(object);
    let mut keep = true;
    while iterator.next(&agent).is_some() {
        if !keep {
            iterator.delete_value(&mut agent);
        }
        keep = !keep;
    }
    assert_eq!(indexed_properties::get_used(&agent, object), 8);

    let mut iterator = IndexedPropertyIterator::new(object);
    let mut seen = Vec::new();
    while let Some(index) = iterator.next(&agent) {
        seen.push(index);
    }
    assert_eq!(seen, (0..16).step_by(2).map(|i| i * 1000).collect::<Vec<u32>>());
}
