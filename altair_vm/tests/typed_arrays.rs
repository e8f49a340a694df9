// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Buffer-backed views seen through the indexed property facade: byte
//! arrays, typed arrays and data views.

#![cfg(feature = "array-buffer")]

use altair_vm::ecmascript::{
    builtins::{
        array_buffer::{
            allocate_array_buffer, array_buffer_from_bytes, detach_array_buffer,
            is_detached_buffer,
        },
        data_view::{data_view_create, get_view_value, set_view_value},
        typed_array::{typed_array_create, typed_array_get_element, TypedArrayKind},
    },
    execution::Agent,
    types::{Object, Value},
};
use altair_vm::heap::indexed_properties;

#[test]
fn byte_array_reads_and_writes_clamp_to_bytes() {
    let mut agent = Agent::default();
    let buffer = array_buffer_from_bytes(&mut agent, Box::new([10, 20, 30]));
    let object = Object::ArrayBuffer(buffer);

    assert_eq!(
        indexed_properties::get(&mut agent, object, 1).unwrap(),
        Some(Value::Integer(20))
    );
    assert!(indexed_properties::put(&mut agent, object, 1, Value::Integer(255)).unwrap());
    assert_eq!(
        indexed_properties::get(&mut agent, object, 1).unwrap(),
        Some(Value::Integer(255))
    );

    // Out-of-range writes are dropped, not grown into.
    assert!(indexed_properties::put(&mut agent, object, 100, Value::Integer(1)).unwrap());
    assert_eq!(indexed_properties::get(&mut agent, object, 100).unwrap(), None);
    assert_eq!(indexed_properties::get_used(&agent, object), 3);

    // Deletion and truncation have no effect on fixed-shape storage.
    assert!(!indexed_properties::delete(&mut agent, object, 0));
    indexed_properties::truncate(&mut agent, object, 0, 3);
    assert_eq!(indexed_properties::get_used(&agent, object), 3);
}

#[test]
fn typed_array_elements_through_the_facade() {
    let mut agent = Agent::default();
    let buffer = allocate_array_buffer(&mut agent, 8);
    let view = typed_array_create(&mut agent, TypedArrayKind::Int16, buffer, 0, 4).unwrap();
    let object = Object::TypedArray(view);

    assert!(indexed_properties::put(&mut agent, object, 0, Value::Integer(-2)).unwrap());
    let big = Value::from_f64(&mut agent, 70_000.0);
    assert!(indexed_properties::put(&mut agent, object, 1, big).unwrap());

    assert_eq!(
        indexed_properties::get(&mut agent, object, 0).unwrap(),
        Some(Value::Integer(-2))
    );
    // 70000 wraps to the int16 range.
    assert_eq!(
        indexed_properties::get(&mut agent, object, 1).unwrap(),
        Some(Value::Integer(4464))
    );
    assert_eq!(indexed_properties::get(&mut agent, object, 4).unwrap(), None);
    assert_eq!(indexed_properties::get_used(&agent, object), 4);
}

#[test]
fn detached_buffers_empty_their_views() {
    let mut agent = Agent::default();
    let buffer = allocate_array_buffer(&mut agent, 4);
    let view = typed_array_create(&mut agent, TypedArrayKind::Uint8, buffer, 0, 4).unwrap();
    let object = Object::TypedArray(view);
    indexed_properties::put(&mut agent, object, 0, Value::Integer(7)).unwrap();

    detach_array_buffer(&mut agent, buffer);
    assert!(is_detached_buffer(&agent, buffer));
    assert_eq!(typed_array_get_element(&mut agent, view, 0), None);
    assert_eq!(indexed_properties::get(&mut agent, object, 0).unwrap(), None);
    // Writes after detach are dropped without an error.
    assert!(indexed_properties::put(&mut agent, object, 0, Value::Integer(1)).unwrap());
}

#[test]
fn data_view_respects_endianness_and_bounds() {
    let mut agent = Agent::default();
    let buffer = allocate_array_buffer(&mut agent, 8);
    let view = data_view_create(&mut agent, buffer, 2, 6).unwrap();

    let value = Value::Integer(0x0102);
    set_view_value::<u16>(&mut agent, view, 0, true, value).unwrap();
    assert_eq!(
        get_view_value::<u16>(&mut agent, view, 0, true).unwrap(),
        Value::Integer(0x0102)
    );
    // Re-reading with the opposite byte order swaps the bytes.
    assert_eq!(
        get_view_value::<u16>(&mut agent, view, 0, false).unwrap(),
        Value::Integer(0x0201)
    );
    // A byte-array read through the backing buffer sees the view offset.
    assert_eq!(
        indexed_properties::get(&mut agent, Object::ArrayBuffer(buffer), 2).unwrap(),
        Some(Value::Integer(0x02))
    );

    // Reads past the view fail even though the buffer is longer.
    assert!(get_view_value::<u32>(&mut agent, view, 4, true).is_err());

    detach_array_buffer(&mut agent, buffer);
    assert!(get_view_value::<u16>(&mut agent, view, 0, true).is_err());
}
