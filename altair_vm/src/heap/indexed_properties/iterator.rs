// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered traversal over one object's indexed properties.
//!
//! The iterator never holds a borrow of the storage. Every operation
//! re-reads the owner's storage cell, so arbitrary mutation between
//! calls, including a representation change, only affects which index
//! comes next, never memory safety. The one piece of retained state
//! beyond the current index is a sparse-node cache, validated before
//! use and dropped by [`IndexedPropertyIterator::flush_cache`].

use super::{
    delete, get_attributes, get_through_accessor, slot::PropertySlot, IndexedProperties,
};
use crate::ecmascript::{
    execution::{Agent, JsResult},
    types::{Object, Value},
};
use crate::heap::indexes::SparseStorageIndex;
use super::sparse::NodeRef;

#[derive(Debug, Clone)]
pub struct IndexedPropertyIterator {
    object: Object,
    /// Valid only when `started` is set.
    current: u32,
    started: bool,
    /// Cached position in sparse storage. Only trusted when the owner
    /// still uses this storage and the node still carries `current`.
    cached: Option<(SparseStorageIndex, NodeRef)>,
    skip_dont_enum: bool,
}

impl IndexedPropertyIterator {
    pub fn new(object: Object) -> Self {
        Self {
            object,
            current: 0,
            started: false,
            cached: None,
            skip_dont_enum: false,
        }
    }

    /// Enumeration-order traversal: entries flagged dont-enum are
    /// skipped by `next` and `previous`.
    pub fn new_enumerating(object: Object) -> Self {
        Self {
            skip_dont_enum: true,
            ..Self::new(object)
        }
    }

    pub fn object(&self) -> Object {
        self.object
    }

    /// The index the iterator is positioned at.
    pub fn current(&self) -> Option<u32> {
        self.started.then_some(self.current)
    }

    pub fn reset(&mut self) {
        self.started = false;
        self.cached = None;
    }

    /// Drop the cached sparse node. Call after any operation that may
    /// have run user code or mutated the owner's storage.
    pub fn flush_cache(&mut self) {
        self.cached = None;
    }

    /// Advance to the lowest present index above the current position.
    pub fn next(&mut self, agent: &Agent) -> Option<u32> {
        let mut from = if self.started {
            self.current.checked_add(1)?
        } else {
            0
        };
        loop {
            let found = self.seek_at_or_above(agent, from)?;
            self.started = true;
            self.current = found;
            if self.skip_dont_enum
                && get_attributes(agent, self.object, found).is_dont_enum()
            {
                from = found.checked_add(1)?;
                continue;
            }
            return Some(found);
        }
    }

    /// Step back to the highest present index below the current
    /// position, or to the highest present index when not started.
    pub fn previous(&mut self, agent: &Agent) -> Option<u32> {
        let mut below = if self.started { self.current } else { u32::MAX };
        loop {
            let found = self.seek_below(agent, below)?;
            self.started = true;
            self.current = found;
            if self.skip_dont_enum
                && get_attributes(agent, self.object, found).is_dont_enum()
            {
                below = found;
                continue;
            }
            return Some(found);
        }
    }

    /// Position at and return the lowest present index `>= limit`.
    pub fn lower_bound(&mut self, agent: &Agent, limit: u32) -> Option<u32> {
        self.cached = None;
        if limit == 0 {
            self.started = false;
        } else {
            self.started = true;
            self.current = limit - 1;
        }
        self.next(agent)
    }

    /// Position at and return the highest present index `<= limit`.
    pub fn upper_bound(&mut self, agent: &Agent, limit: u32) -> Option<u32> {
        self.cached = None;
        if limit == u32::MAX {
            self.started = false;
        } else {
            self.started = true;
            self.current = limit + 1;
        }
        self.previous(agent)
    }

    /// Read the value at the current index, running a getter if the
    /// slot is an accessor. `Ok(None)` means the entry vanished since
    /// the iterator was positioned here.
    pub fn get_value(&mut self, agent: &mut Agent) -> JsResult<Option<Value>> {
        let Some(index) = self.current() else {
            return Ok(None);
        };
        let slot = match self.object.indexed_properties(agent) {
            IndexedProperties::Sparse(handle) => {
                match self.valid_cached_node(agent, handle, index) {
                    Some(node) => agent[handle].node_slot(node),
                    None => agent[handle].get(index),
                }
            }
            _ => super::get_own_slot(agent, self.object, index),
        };
        match slot {
            PropertySlot::Hole => Ok(None),
            PropertySlot::Data(value) => Ok(Some(value)),
            PropertySlot::Accessor(accessor) => {
                // The getter may mutate anything, including the storage
                // this iterator walks.
                self.flush_cache();
                get_through_accessor(agent, self.object, accessor).map(Some)
            }
        }
    }

    /// Delete the entry at the current index. Returns false when a
    /// dont-delete attribute blocks the removal.
    pub fn delete_value(&mut self, agent: &mut Agent) -> bool {
        let Some(index) = self.current() else {
            return true;
        };
        self.flush_cache();
        delete(agent, self.object, index)
    }

    fn valid_cached_node(
        &self,
        agent: &Agent,
        handle: SparseStorageIndex,
        index: u32,
    ) -> Option<NodeRef> {
        let (cached_handle, node) = self.cached?;
        if cached_handle != handle {
            return None;
        }
        // A freed or reused node no longer carries this index.
        (agent[handle].node_index(node) == index).then_some(node)
    }

    fn seek_at_or_above(&mut self, agent: &Agent, from: u32) -> Option<u32> {
        match self.object.indexed_properties(agent) {
            IndexedProperties::None => None,
            IndexedProperties::Compact(handle) => {
                let storage = &agent[handle];
                (from..storage.top()).find(|&index| storage.get(index).is_present())
            }
            IndexedProperties::Sparse(handle) => {
                let storage = &agent[handle];
                let node = match self.valid_cached_node(agent, handle, from.wrapping_sub(1)) {
                    Some(cached) => storage.successor(cached),
                    None => storage.lower_bound(from),
                };
                self.cached = node.map(|node| (handle, node));
                node.map(|node| storage.node_index(node))
            }
            #[cfg(feature = "array-buffer")]
            IndexedProperties::ByteArray(_) | IndexedProperties::TypedArray(_) => {
                (from < super::get_used(agent, self.object)).then_some(from)
            }
        }
    }

    fn seek_below(&mut self, agent: &Agent, below: u32) -> Option<u32> {
        match self.object.indexed_properties(agent) {
            IndexedProperties::None => None,
            IndexedProperties::Compact(handle) => {
                let storage = &agent[handle];
                (0..below.min(storage.top()))
                    .rev()
                    .find(|&index| storage.get(index).is_present())
            }
            IndexedProperties::Sparse(handle) => {
                let storage = &agent[handle];
                let node = match self.valid_cached_node(agent, handle, below) {
                    Some(cached) => storage.predecessor(cached),
                    None => {
                        if below == u32::MAX {
                            storage.last()
                        } else if below == 0 {
                            None
                        } else {
                            storage.upper_bound(below - 1)
                        }
                    }
                };
                self.cached = node.map(|node| (handle, node));
                node.map(|node| storage.node_index(node))
            }
            #[cfg(feature = "array-buffer")]
            IndexedProperties::ByteArray(_) | IndexedProperties::TypedArray(_) => {
                let used = super::get_used(agent, self.object);
                if below == 0 || used == 0 {
                    None
                } else {
                    Some(below.min(used) - 1)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::types::ObjectHeapData;
    use crate::heap::indexed_properties::{
        change_attribute, put, slot::PropertyAttributes, truncate,
    };
    use crate::heap::CreateHeapData;

    fn object_with(agent: &mut Agent, indices: &[u32]) -> Object {
        let object = Object::Object(agent.heap.create(ObjectHeapData::default()));
        for &index in indices {
            put(agent, object, index, Value::Integer(index as i32)).unwrap();
        }
        object
    }

    #[test]
    fn walks_compact_in_both_directions() {
        let mut agent = Agent::default();
        let object = object_with(&mut agent, &[0, 3, 7]);
        let mut iterator = IndexedPropertyIterator::new(object);
        assert_eq!(iterator.next(&agent), Some(0));
        assert_eq!(iterator.next(&agent), Some(3));
        assert_eq!(iterator.next(&agent), Some(7));
        assert_eq!(iterator.next(&agent), None);

        iterator.reset();
        assert_eq!(iterator.previous(&agent), Some(7));
        assert_eq!(iterator.previous(&agent), Some(3));
        assert_eq!(iterator.previous(&agent), Some(0));
        assert_eq!(iterator.previous(&agent), None);
    }

    #[test]
    fn walks_sparse_with_node_cache() {
        let mut agent = Agent::default();
        let object = object_with(&mut agent, &[1000, 2000, 3000000]);
        let mut iterator = IndexedPropertyIterator::new(object);
        assert_eq!(iterator.next(&agent), Some(1000));
        assert_eq!(iterator.next(&agent), Some(2000));
        assert_eq!(iterator.next(&agent), Some(3000000));
        assert_eq!(iterator.next(&agent), None);
    }

    #[test]
    fn bounds_position_the_iterator() {
        let mut agent = Agent::default();
        let object = object_with(&mut agent, &[2, 5, 9]);
        let mut iterator = IndexedPropertyIterator::new(object);
        assert_eq!(iterator.lower_bound(&agent, 3), Some(5));
        assert_eq!(iterator.next(&agent), Some(9));
        assert_eq!(iterator.upper_bound(&agent, 8), Some(5));
        assert_eq!(iterator.previous(&agent), Some(2));
        assert_eq!(iterator.lower_bound(&agent, 0), Some(2));
        assert_eq!(iterator.upper_bound(&agent, 1), None);
    }

    #[test]
    fn survives_representation_change_mid_walk() {
        let mut agent = Agent::default();
        let object = object_with(&mut agent, &[0, 1, 2]);
        let mut iterator = IndexedPropertyIterator::new(object);
        assert_eq!(iterator.next(&agent), Some(0));
        // Force a compact-to-sparse conversion between steps.
        put(&mut agent, object, 5000000, Value::Integer(-1)).unwrap();
        iterator.flush_cache();
        assert_eq!(iterator.next(&agent), Some(1));
        assert_eq!(iterator.next(&agent), Some(2));
        assert_eq!(iterator.next(&agent), Some(5000000));
        assert_eq!(iterator.next(&agent), None);
    }

    #[test]
    fn skips_dont_enum_entries_when_enumerating() {
        let mut agent = Agent::default();
        let object = object_with(&mut agent, &[0, 1, 2]);
        change_attribute(
            &mut agent,
            object,
            1,
            PropertyAttributes::new(PropertyAttributes::DONT_ENUM),
        );
        let mut iterator = IndexedPropertyIterator::new_enumerating(object);
        assert_eq!(iterator.next(&agent), Some(0));
        assert_eq!(iterator.next(&agent), Some(2));
        assert_eq!(iterator.next(&agent), None);
        iterator.reset();
        assert_eq!(iterator.previous(&agent), Some(2));
        assert_eq!(iterator.previous(&agent), Some(0));
        assert_eq!(iterator.previous(&agent), None);
    }

    #[test]
    fn delete_value_removes_current_entry() {
        let mut agent = Agent::default();
        let object = object_with(&mut agent, &[4, 8]);
        let mut iterator = IndexedPropertyIterator::new(object);
        assert_eq!(iterator.next(&agent), Some(4));
        assert!(iterator.delete_value(&mut agent));
        assert_eq!(iterator.get_value(&mut agent).unwrap(), None);
        assert_eq!(iterator.next(&agent), Some(8));
        assert_eq!(
            iterator.get_value(&mut agent).unwrap(),
            Some(Value::Integer(8))
        );
    }

    #[test]
    fn truncation_between_steps_is_observed() {
        let mut agent = Agent::default();
        let object = object_with(&mut agent, &[0, 1, 2, 3]);
        let mut iterator = IndexedPropertyIterator::new(object);
        assert_eq!(iterator.next(&agent), Some(0));
        truncate(&mut agent, object, 1, 3);
        iterator.flush_cache();
        assert_eq!(iterator.next(&agent), Some(3));
    }
}
