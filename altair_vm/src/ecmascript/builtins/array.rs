// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod data;

pub use data::ArrayHeapData;

use crate::{
    ecmascript::{execution::Agent, types::Object},
    heap::{
        indexed_properties::{
            self,
            compact::{appropriate_capacity, CompactStorage},
            IndexedProperties,
        },
        indexes::ArrayIndex,
        CreateHeapData, Heap,
    },
};

/// Largest `new Array(len)` length that preallocates dense storage up
/// front; longer arrays start empty and let the first writes pick the
/// representation.
pub const MAX_PREALLOCATED_LENGTH: u32 = 131072;

/// Create an array of the given length with no prototype.
pub fn array_create(agent: &mut Agent, length: u32) -> ArrayIndex {
    array_create_with_prototype(agent, length, None)
}

pub fn array_create_with_prototype(
    agent: &mut Agent,
    length: u32,
    prototype: Option<Object>,
) -> ArrayIndex {
    let indexed = if length != 0 && length <= MAX_PREALLOCATED_LENGTH {
        let storage = CompactStorage::new(appropriate_capacity(length));
        IndexedProperties::Compact(agent.heap.create(storage))
    } else {
        IndexedProperties::None
    };
    agent.heap.create(ArrayHeapData {
        prototype,
        indexed,
        length,
    })
}

pub fn array_length(agent: &Agent, array: ArrayIndex) -> u32 {
    agent[array].length
}

/// Set an array's `length`, removing indexed properties at or above the
/// new value. A dont-delete entry in the removed range stops the
/// shrink at one past its index, which becomes the resulting length.
pub fn array_set_length(agent: &mut Agent, array: ArrayIndex, length: u32) -> u32 {
    let old_length = agent[array].length;
    let new_length = if length < old_length {
        indexed_properties::truncate(agent, Object::Array(array), length, old_length)
    } else {
        length
    };
    agent[array].length = new_length;
    new_length
}

/// A simple array is one the builtins can manipulate without running
/// user code: dense (or empty) storage, no accessors, no read-only
/// entries, and no indexed properties anywhere on the prototype chain.
pub fn is_simple_array(agent: &Agent, array: ArrayIndex) -> bool {
    let object = Object::Array(array);
    match object.indexed_properties(agent) {
        IndexedProperties::None | IndexedProperties::Compact(_) => {}
        _ => return false,
    }
    if indexed_properties::has_indexed_getters_or_setters(agent, object)
        || indexed_properties::has_read_only_properties(agent, object)
    {
        return false;
    }
    let mut link = object.prototype(agent);
    while let Some(prototype) = link {
        if indexed_properties::has_indexed_properties(agent, prototype) {
            return false;
        }
        link = prototype.prototype(agent);
    }
    true
}

impl CreateHeapData<ArrayHeapData, ArrayIndex> for Heap {
    fn create(&mut self, data: ArrayHeapData) -> ArrayIndex {
        self.arrays.push(Some(data));
        ArrayIndex::last(&self.arrays)
    }
}
