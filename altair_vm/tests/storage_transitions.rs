// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cross-representation behaviour of the indexed property storage, driven
//! entirely through the public facade with integrity verification on.

use altair_vm::ecmascript::{
    builtins::{create_builtin_function, ArgumentsList, Behaviour},
    execution::{
        agent::{ExceptionType, Options},
        Agent, JsResult,
    },
    types::{Object, ObjectHeapData, Value},
};
use altair_vm::heap::{
    indexed_properties::{
        self, slot::PropertyAttributes, slot::PropertySlot, IndexedProperties,
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

#[test]
fn dense_writes_stay_compact_and_scattered_writes_do_not() {
    let mut agent = verifying_agent();
    let object = plain_object(&mut agent);
    for index in 0..1000u32 {
        indexed_properties::put(&mut agent, object, index, Value::Integer(index as i32)).unwrap();
    }
    assert!(matches!(
        object.indexed_properties(&agent),
        IndexedProperties::Compact(_)
    ));

    // A write far past the used range would waste most of the grown
    // block, so the storage converts instead.
    indexed_properties::put(&mut agent, object, 10_000_000, Value::Integer(-1)).unwrap();
    assert!(matches!(
        object.indexed_properties(&agent),
        IndexedProperties::Sparse(_)
    ));

    // Nothing was lost in the conversion.
    for index in (0..1000u32).step_by(97) {
        assert_eq!(
            indexed_properties::get(&mut agent, object, index).unwrap(),
            Some(Value::Integer(index as i32))
        );
    }
    assert_eq!(
        indexed_properties::get(&mut agent, object, 10_000_000).unwrap(),
        Some(Value::Integer(-1))
    );
    assert_eq!(indexed_properties::get_used(&agent, object), 1001);
}

#[test]
fn truncating_a_sparse_tail_promotes_back_to_compact() {
    let mut agent = verifying_agent();
    let object = plain_object(&mut agent);
    for index in 0..64u32 {
        indexed_properties::put(&mut agent, object, index, Value::Integer(1)).unwrap();
    }
    indexed_properties::put(&mut agent, object, 50_000_000, Value::Integer(2)).unwrap();
    assert!(matches!(
        object.indexed_properties(&agent),
        IndexedProperties::Sparse(_)
    ));

    indexed_properties::truncate(&mut agent, object, 64, u32::MAX);
    assert!(matches!(
        object.indexed_properties(&agent),
        IndexedProperties::Compact(_)
    ));
    assert_eq!(indexed_properties::get_used(&agent, object), 64);
}

#[test]
fn shared_storage_is_copied_before_the_first_write() {
    let mut agent = verifying_agent();
    let original = plain_object(&mut agent);
    for index in 0..8u32 {
        indexed_properties::put(&mut agent, original, index, Value::Integer(index as i32))
            .unwrap();
    }

    let cell = indexed_properties::share(&mut agent, original);
    let clone = Object::Object(agent.heap.create(ObjectHeapData {
        prototype: None,
        indexed: cell,
    }));

    indexed_properties::put(&mut agent, clone, 3, Value::Integer(-3)).unwrap();
    assert_eq!(
        indexed_properties::get(&mut agent, original, 3).unwrap(),
        Some(Value::Integer(3))
    );
    assert_eq!(
        indexed_properties::get(&mut agent, clone, 3).unwrap(),
        Some(Value::Integer(-3))
    );
    // The two cells have diverged.
    assert_ne!(
        object_cell(&agent, original),
        object_cell(&agent, clone)
    );
}

fn object_cell(agent: &Agent, object: Object) -> IndexedProperties {
    object.indexed_properties(agent)
}

#[test]
fn attributes_survive_a_representation_change() {
    let mut agent = verifying_agent();
    let object = plain_object(&mut agent);
    indexed_properties::put_with_attributes(
        &mut agent,
        object,
        2,
        PropertySlot::Data(Value::Integer(2)),
        PropertyAttributes::new(PropertyAttributes::READ_ONLY),
    );
    indexed_properties::put(&mut agent, object, 0, Value::Integer(0)).unwrap();

    // Force a conversion to the tree representation.
    indexed_properties::put(&mut agent, object, 30_000_000, Value::Integer(3)).unwrap();

    assert!(indexed_properties::get_attributes(&agent, object, 2).is_read_only());
    // A plain write against the read-only entry is still rejected.
    assert!(!indexed_properties::put(&mut agent, object, 2, Value::Integer(9)).unwrap());
    assert_eq!(
        indexed_properties::get(&mut agent, object, 2).unwrap(),
        Some(Value::Integer(2))
    );
}

fn throwing_getter(agent: &mut Agent, _this: Value, _args: ArgumentsList) -> JsResult<Value> {
    Err(agent.throw_exception(ExceptionType::Error, "getter failed"))
}

fn forty_two(_agent: &mut Agent, _this: Value, _args: ArgumentsList) -> JsResult<Value> {
    Ok(Value::Integer(42))
}

#[test]
fn accessors_run_through_get_and_put() {
    let mut agent = verifying_agent();
    let object = plain_object(&mut agent);
    let getter = create_builtin_function(&mut agent, Behaviour::Regular(forty_two), "get", 0);
    indexed_properties::define_getter(&mut agent, object, 5, Value::from(getter));

    assert_eq!(
        indexed_properties::get(&mut agent, object, 5).unwrap(),
        Some(Value::Integer(42))
    );
    // A getter without a setter rejects plain writes.
    assert!(!indexed_properties::put(&mut agent, object, 5, Value::Integer(0)).unwrap());

    let failing = create_builtin_function(&mut agent, Behaviour::Regular(throwing_getter), "get", 0);
    indexed_properties::define_getter(&mut agent, object, 6, Value::from(failing));
    assert!(indexed_properties::get(&mut agent, object, 6).is_err());
}

#[test]
fn inherited_values_are_found_through_the_chain() {
    let mut agent = verifying_agent();
    let prototype = plain_object(&mut agent);
    let receiver = Object::Object(agent.heap.create(ObjectHeapData {
        prototype: Some(prototype),
        indexed: IndexedProperties::None,
    }));
    indexed_properties::put(&mut agent, prototype, 7, Value::Integer(7)).unwrap();

    assert_eq!(
        indexed_properties::get_from_chain(&mut agent, receiver, 7).unwrap(),
        Some(Value::Integer(7))
    );
    assert!(!indexed_properties::has_property(&agent, receiver, 7));

    // An own write shadows the inherited entry without touching it.
    indexed_properties::put(&mut agent, receiver, 7, Value::Integer(-7)).unwrap();
    assert_eq!(
        indexed_properties::get_from_chain(&mut agent, receiver, 7).unwrap(),
        Some(Value::Integer(-7))
    );
    assert_eq!(
        indexed_properties::get(&mut agent, prototype, 7).unwrap(),
        Some(Value::Integer(7))
    );
}

#[test]
fn deleting_everything_releases_the_storage() {
    let mut agent = verifying_agent();
    let object = plain_object(&mut agent);
    for index in [0u32, 5, 9] {
        indexed_properties::put(&mut agent, object, index, Value::Integer(1)).unwrap();
    }
    for index in [5u32, 0, 9] {
        assert!(indexed_properties::delete(&mut agent, object, index));
    }
    assert!(matches!(
        object.indexed_properties(&agent),
        IndexedProperties::None
    ));
    assert!(!indexed_properties::has_indexed_properties(&agent, object));
}
