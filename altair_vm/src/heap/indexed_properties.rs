// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Indexed property storage.
//!
//! Every object carries an [`IndexedProperties`] cell describing how its
//! array-indexed properties are stored right now: not at all, densely,
//! as an ordered tree, or as fixed-shape buffer-backed storage. The
//! functions here dispatch operations to the active representation and
//! decide representation transitions, writing the (possibly different)
//! cell back to the owner exactly once per operation.

pub mod chain;
pub mod compact;
pub mod iterator;
pub mod slot;
pub mod sparse;

#[cfg(feature = "array-buffer")]
use crate::ecmascript::builtins::typed_array::{typed_array_get_element, typed_array_set_element};
use crate::ecmascript::{
    abstract_operations::operations_on_objects::call,
    builtins::accessor::{Accessor, AccessorHeapData},
    execution::{Agent, JsResult},
    types::{Object, Value},
};
#[cfg(feature = "array-buffer")]
use crate::heap::indexes::{ArrayBufferIndex, TypedArrayIndex};
use crate::heap::{
    indexes::{CompactStorageIndex, SparseStorageIndex},
    CreateHeapData,
};
use compact::{
    appropriate_capacity, should_be_compact, should_grow_compact, CompactStorage,
    ALWAYS_COMPACT_LIMIT, DENSITY_SAMPLING_CAPACITY, MAX_COMPACT_INDEX,
};
use slot::{PropertyAttributes, PropertySlot};
use sparse::SparseStorage;

/// The indexed storage cell attached to an object.
///
/// ByteArray and TypedArray are terminal states: buffer-backed storage
/// never transitions to or from the dense and sparse representations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexedProperties {
    #[default]
    None,
    Compact(CompactStorageIndex),
    Sparse(SparseStorageIndex),
    #[cfg(feature = "array-buffer")]
    ByteArray(ArrayBufferIndex),
    #[cfg(feature = "array-buffer")]
    TypedArray(TypedArrayIndex),
}

impl IndexedProperties {
    pub fn is_none(self) -> bool {
        matches!(self, IndexedProperties::None)
    }
}

/// First-write representation choice: small indices get dense storage
/// sized to cover them, large ones start sparse immediately.
fn make_initial(
    agent: &mut Agent,
    index: u32,
    slot: PropertySlot,
    attributes: PropertyAttributes,
) -> IndexedProperties {
    if index < ALWAYS_COMPACT_LIMIT {
        let mut storage = CompactStorage::new(index + 1);
        if attributes.is_default() {
            storage.put(index, slot);
        } else {
            storage.put_with_attributes(index, slot, attributes);
        }
        IndexedProperties::Compact(agent.heap.create(storage))
    } else {
        let mut storage = SparseStorage::new();
        storage.insert(index, slot, attributes);
        IndexedProperties::Sparse(agent.heap.create(storage))
    }
}

/// Guarantee exclusive ownership of a compact storage before an in-place
/// write; a shared storage is cloned and the owner repointed at the
/// clone.
fn make_exclusive(
    agent: &mut Agent,
    object: Object,
    handle: CompactStorageIndex,
) -> CompactStorageIndex {
    if !agent[handle].is_shared() {
        return handle;
    }
    let clone = agent[handle].clone();
    let new_handle = agent.heap.create(clone);
    object.set_indexed_properties(agent, IndexedProperties::Compact(new_handle));
    new_handle
}

/// Mark the owner's storage as shared and return the cell the sharer
/// should store, as array-literal cloning does. Only compact storage is
/// shared copy-on-write; a sparse tree is cloned eagerly.
pub fn share(agent: &mut Agent, object: Object) -> IndexedProperties {
    match object.indexed_properties(agent) {
        IndexedProperties::Compact(handle) => {
            agent[handle].mark_shared();
            IndexedProperties::Compact(handle)
        }
        IndexedProperties::Sparse(handle) => {
            let clone = agent[handle].clone();
            IndexedProperties::Sparse(agent.heap.create(clone))
        }
        cell => cell,
    }
}

fn free_compact(agent: &mut Agent, handle: CompactStorageIndex) {
    if !agent[handle].is_shared() {
        agent.heap.compact_storages[handle.into_index()] = None;
    }
}

fn free_sparse(agent: &mut Agent, handle: SparseStorageIndex) {
    agent.heap.sparse_storages[handle.into_index()] = None;
}

/// Turn a compact storage into the sparse representation. Returns the
/// new cell, or None when the compact storage held nothing.
fn convert_to_sparse(agent: &mut Agent, handle: CompactStorageIndex) -> IndexedProperties {
    let sparse = SparseStorage::from_compact(&agent[handle]);
    free_compact(agent, handle);
    match sparse {
        Some(storage) => IndexedProperties::Sparse(agent.heap.create(storage)),
        None => IndexedProperties::None,
    }
}

/// Turn a sparse storage into the dense representation. The caller has
/// already made the density check.
fn convert_to_compact(agent: &mut Agent, handle: SparseStorageIndex) -> IndexedProperties {
    let compact = agent[handle].to_compact();
    free_sparse(agent, handle);
    IndexedProperties::Compact(agent.heap.create(compact))
}

fn verify_if_enabled(agent: &Agent, handle: SparseStorageIndex) {
    if agent.options.verify_storage_integrity {
        agent[handle].verify();
    }
}

/// Read the slot at `index` without invoking accessors.
pub fn get_own_slot(agent: &mut Agent, object: Object, index: u32) -> PropertySlot {
    match object.indexed_properties(agent) {
        IndexedProperties::None => PropertySlot::Hole,
        IndexedProperties::Compact(handle) => agent[handle].get(index),
        IndexedProperties::Sparse(handle) => agent[handle].get(index),
        #[cfg(feature = "array-buffer")]
        IndexedProperties::ByteArray(buffer) => match agent[buffer].data.as_ref() {
            Some(block) => block
                .get::<u8>(index)
                .map_or(PropertySlot::Hole, |byte| {
                    PropertySlot::Data(Value::Integer(byte as i32))
                }),
            None => PropertySlot::Hole,
        },
        #[cfg(feature = "array-buffer")]
        IndexedProperties::TypedArray(view) => typed_array_get_element(agent, view, index)
            .map_or(PropertySlot::Hole, PropertySlot::Data),
    }
}

/// Read the property at `index`, running its getter if the slot is an
/// accessor. Three-way result: found, absent, or failed in user code.
pub fn get(agent: &mut Agent, object: Object, index: u32) -> JsResult<Option<Value>> {
    match get_own_slot(agent, object, index) {
        PropertySlot::Hole => Ok(None),
        PropertySlot::Data(value) => Ok(Some(value)),
        PropertySlot::Accessor(accessor) => {
            get_through_accessor(agent, object, accessor).map(Some)
        }
    }
}

fn get_through_accessor(agent: &mut Agent, object: Object, accessor: Accessor) -> JsResult<Value> {
    match accessor.getter(agent) {
        None => Ok(Value::Undefined),
        Some(getter) => call(agent, getter, object.into_value(), &[]),
    }
}

/// Read the property at `index` as seen by `object`, consulting the
/// prototype chain for indices the receiver does not own. Getters run
/// with the receiver as their this value.
pub fn get_from_chain(agent: &mut Agent, object: Object, index: u32) -> JsResult<Option<Value>> {
    let mut current = Some(object);
    while let Some(link) = current {
        match get_own_slot(agent, link, index) {
            PropertySlot::Hole => {}
            PropertySlot::Data(value) => return Ok(Some(value)),
            PropertySlot::Accessor(accessor) => {
                return get_through_accessor(agent, object, accessor).map(Some);
            }
        }
        current = link.prototype(agent);
    }
    Ok(None)
}

pub fn has_property(agent: &Agent, object: Object, index: u32) -> bool {
    match object.indexed_properties(agent) {
        IndexedProperties::None => false,
        IndexedProperties::Compact(handle) => agent[handle].has_property(index),
        IndexedProperties::Sparse(handle) => agent[handle].has_property(index),
        #[cfg(feature = "array-buffer")]
        IndexedProperties::ByteArray(buffer) => {
            agent[buffer].data.as_ref().is_some_and(|block| index < block.len())
        }
        #[cfg(feature = "array-buffer")]
        IndexedProperties::TypedArray(view) => index < agent[view].array_length,
    }
}

pub fn get_attributes(agent: &Agent, object: Object, index: u32) -> PropertyAttributes {
    match object.indexed_properties(agent) {
        IndexedProperties::Compact(handle) => agent[handle].attributes(index),
        IndexedProperties::Sparse(handle) => agent[handle].attributes(index),
        _ => PropertyAttributes::default(),
    }
}

/// Write the property at `index`, running the setter when the slot holds
/// an accessor. Returns false when the write is rejected (read-only
/// entry, or an accessor without a setter); the caller decides whether
/// rejection surfaces as a TypeError.
pub fn put(agent: &mut Agent, object: Object, index: u32, value: Value) -> JsResult<bool> {
    match object.indexed_properties(agent) {
        IndexedProperties::None => {
            let cell = make_initial(
                agent,
                index,
                PropertySlot::Data(value),
                PropertyAttributes::default(),
            );
            object.set_indexed_properties(agent, cell);
            Ok(true)
        }
        IndexedProperties::Compact(handle) => {
            match agent[handle].get(index) {
                PropertySlot::Accessor(accessor) => {
                    return put_through_accessor(agent, object, accessor, value);
                }
                PropertySlot::Data(_) if agent[handle].attributes(index).is_read_only() => {
                    return Ok(false);
                }
                _ => {}
            }
            let handle = make_exclusive(agent, object, handle);
            compact_put(agent, object, handle, index, PropertySlot::Data(value), None);
            Ok(true)
        }
        IndexedProperties::Sparse(handle) => {
            if let Some(node) = agent[handle].find(index) {
                match agent[handle].node_slot(node) {
                    PropertySlot::Accessor(accessor) => {
                        return put_through_accessor(agent, object, accessor, value);
                    }
                    _ => {
                        if agent[handle].node_attributes(node).is_read_only() {
                            return Ok(false);
                        }
                        agent[handle].set_node_slot(node, PropertySlot::Data(value));
                        return Ok(true);
                    }
                }
            }
            sparse_insert(
                agent,
                object,
                handle,
                index,
                PropertySlot::Data(value),
                PropertyAttributes::default(),
            );
            Ok(true)
        }
        #[cfg(feature = "array-buffer")]
        IndexedProperties::ByteArray(buffer) => {
            use crate::ecmascript::{
                abstract_operations::type_conversion::to_number_f64, types::Viewable,
            };
            // Coerce first: the conversion may fail even when the write
            // itself would be dropped.
            let byte = <u8 as Viewable>::from_f64(to_number_f64(agent, value)?);
            if let Some(block) = agent[buffer].data.as_mut() {
                block.set::<u8>(index, byte);
            }
            Ok(true)
        }
        #[cfg(feature = "array-buffer")]
        IndexedProperties::TypedArray(view) => {
            typed_array_set_element(agent, view, index, value)?;
            Ok(true)
        }
    }
}

fn put_through_accessor(
    agent: &mut Agent,
    object: Object,
    accessor: Accessor,
    value: Value,
) -> JsResult<bool> {
    match accessor.setter(agent) {
        None => Ok(false),
        Some(setter) => {
            call(agent, setter, object.into_value(), &[value])?;
            Ok(true)
        }
    }
}

/// Write into exclusive compact storage, growing or converting to sparse
/// when the index is not covered by the allocation.
fn compact_put(
    agent: &mut Agent,
    object: Object,
    handle: CompactStorageIndex,
    index: u32,
    slot: PropertySlot,
    attributes: Option<PropertyAttributes>,
) {
    let capacity = agent[handle].capacity();
    if index >= capacity {
        // Decide between growth and a sparse conversion.
        let go_sparse = if index >= MAX_COMPACT_INDEX {
            true
        } else if capacity >= DENSITY_SAMPLING_CAPACITY && agent[handle].is_too_sparse_by_sampling()
        {
            true
        } else {
            !should_grow_compact(capacity, appropriate_capacity(index + 1))
        };
        if go_sparse {
            let cell = match convert_to_sparse(agent, handle) {
                IndexedProperties::Sparse(sparse) => {
                    agent[sparse].insert(index, slot, attributes.unwrap_or_default());
                    verify_if_enabled(agent, sparse);
                    IndexedProperties::Sparse(sparse)
                }
                IndexedProperties::None => make_initial(
                    agent,
                    index,
                    slot,
                    attributes.unwrap_or_default(),
                ),
                _ => unreachable!(),
            };
            object.set_indexed_properties(agent, cell);
            return;
        }
        agent[handle].grow_to_cover(index);
    }
    let storage = &mut agent[handle];
    match attributes {
        Some(attributes) => storage.put_with_attributes(index, slot, attributes),
        None => storage.put(index, slot),
    }
}

/// Insert a new key into sparse storage, demoting to compact first when
/// the tree would need a new node block and the result would be dense.
fn sparse_insert(
    agent: &mut Agent,
    object: Object,
    handle: SparseStorageIndex,
    index: u32,
    slot: PropertySlot,
    attributes: PropertyAttributes,
) {
    if agent[handle].needs_block() {
        let storage = &agent[handle];
        let max_index = storage
            .last()
            .map_or(index, |node| storage.node_index(node).max(index));
        let used = storage.used() + 1;
        if max_index < MAX_COMPACT_INDEX
            && should_be_compact(appropriate_capacity(max_index + 1), used)
        {
            let cell = convert_to_compact(agent, handle);
            let IndexedProperties::Compact(compact) = cell else {
                unreachable!()
            };
            object.set_indexed_properties(agent, cell);
            compact_put(agent, object, compact, index, slot, Some(attributes));
            return;
        }
    }
    agent[handle].insert(index, slot, attributes);
    verify_if_enabled(agent, handle);
}

/// Define-style write: installs the slot and attributes directly, never
/// invoking setters and ignoring read-only.
pub fn put_with_attributes(
    agent: &mut Agent,
    object: Object,
    index: u32,
    slot: PropertySlot,
    attributes: PropertyAttributes,
) {
    match object.indexed_properties(agent) {
        IndexedProperties::None => {
            let cell = make_initial(agent, index, slot, attributes);
            object.set_indexed_properties(agent, cell);
        }
        IndexedProperties::Compact(handle) => {
            let handle = make_exclusive(agent, object, handle);
            compact_put(agent, object, handle, index, slot, Some(attributes));
        }
        IndexedProperties::Sparse(handle) => {
            if let Some(node) = agent[handle].find(index) {
                agent[handle].set_node_slot(node, slot);
                agent[handle].set_node_attributes(node, attributes);
            } else {
                sparse_insert(agent, object, handle, index, slot, attributes);
            }
        }
        #[cfg(feature = "array-buffer")]
        IndexedProperties::ByteArray(_) | IndexedProperties::TypedArray(_) => {
            // Fixed-shape storage has no attributes or accessor slots.
        }
    }
}

/// Append fast path used by dense construction: requires exclusive
/// compact storage with spare capacity and `index == top`.
pub fn can_put_simple_new(agent: &Agent, object: Object, index: u32) -> bool {
    match object.indexed_properties(agent) {
        IndexedProperties::Compact(handle) => {
            let storage = &agent[handle];
            !storage.is_shared() && index == storage.top() && index < storage.capacity()
        }
        _ => false,
    }
}

pub fn put_simple_new(agent: &mut Agent, object: Object, index: u32, value: Value) {
    debug_assert!(can_put_simple_new(agent, object, index));
    let IndexedProperties::Compact(handle) = object.indexed_properties(agent) else {
        unreachable!()
    };
    agent[handle].put_simple_new(index, PropertySlot::Data(value));
}

/// Change the attributes of an existing entry. Returns false when the
/// index holds no property.
pub fn change_attribute(
    agent: &mut Agent,
    object: Object,
    index: u32,
    attributes: PropertyAttributes,
) -> bool {
    match object.indexed_properties(agent) {
        IndexedProperties::Compact(handle) => {
            if !agent[handle].has_property(index) {
                return false;
            }
            let handle = make_exclusive(agent, object, handle);
            agent[handle].set_attributes(index, attributes);
            true
        }
        IndexedProperties::Sparse(handle) => match agent[handle].find(index) {
            Some(node) => {
                agent[handle].set_node_attributes(node, attributes);
                true
            }
            None => false,
        },
        _ => false,
    }
}

/// Install or update the getter half of an accessor at `index`.
pub fn define_getter(agent: &mut Agent, object: Object, index: u32, getter: Value) {
    define_accessor_half(agent, object, index, getter, true);
}

/// Install or update the setter half of an accessor at `index`.
pub fn define_setter(agent: &mut Agent, object: Object, index: u32, setter: Value) {
    define_accessor_half(agent, object, index, setter, false);
}

fn define_accessor_half(
    agent: &mut Agent,
    object: Object,
    index: u32,
    function: Value,
    is_getter: bool,
) {
    if let PropertySlot::Accessor(accessor) = get_own_slot(agent, object, index) {
        // An existing pair is mutated in place.
        let data = &mut agent[accessor];
        if is_getter {
            data.getter = Some(function);
        } else {
            data.setter = Some(function);
        }
        return;
    }
    let attributes = get_attributes(agent, object, index);
    let accessor = agent.heap.create(if is_getter {
        AccessorHeapData {
            getter: Some(function),
            setter: None,
        }
    } else {
        AccessorHeapData {
            getter: None,
            setter: Some(function),
        }
    });
    put_with_attributes(agent, object, index, PropertySlot::Accessor(accessor), attributes);
}

/// Delete the property at `index`. Returns false when a dont-delete
/// attribute blocks the removal. Removing the last present entry drops
/// the storage entirely.
pub fn delete(agent: &mut Agent, object: Object, index: u32) -> bool {
    match object.indexed_properties(agent) {
        IndexedProperties::None => true,
        IndexedProperties::Compact(handle) => {
            if !agent[handle].has_property(index) {
                return true;
            }
            if agent[handle].attributes(index).is_dont_delete() {
                return false;
            }
            let handle = make_exclusive(agent, object, handle);
            let deleted = agent[handle].delete(index);
            debug_assert!(deleted);
            drop_if_empty(agent, object);
            true
        }
        IndexedProperties::Sparse(handle) => {
            let deleted = agent[handle].delete(index);
            if deleted {
                verify_if_enabled(agent, handle);
                drop_if_empty(agent, object);
            }
            deleted
        }
        #[cfg(feature = "array-buffer")]
        IndexedProperties::ByteArray(_) | IndexedProperties::TypedArray(_) => {
            // Buffer-backed elements are not configurable.
            !has_property(agent, object, index)
        }
    }
}

fn drop_if_empty(agent: &mut Agent, object: Object) {
    match object.indexed_properties(agent) {
        IndexedProperties::Compact(handle) => {
            if !agent[handle].has_used(u32::MAX) {
                free_compact(agent, handle);
                object.set_indexed_properties(agent, IndexedProperties::None);
            }
        }
        IndexedProperties::Sparse(handle) => {
            if agent[handle].used() == 0 {
                free_sparse(agent, handle);
                object.set_indexed_properties(agent, IndexedProperties::None);
            }
        }
        _ => {}
    }
}

/// Remove all deletable entries in `[start, end)`, scanning downward.
/// Returns the adjusted end: `start` when everything went, otherwise one
/// past the highest surviving dont-delete entry. A sparse survivor set
/// dense enough for compact storage is demoted on the way out.
pub fn truncate(agent: &mut Agent, object: Object, start: u32, end: u32) -> u32 {
    match object.indexed_properties(agent) {
        IndexedProperties::None => start,
        IndexedProperties::Compact(handle) => {
            let handle = make_exclusive(agent, object, handle);
            let adjusted = agent[handle].truncate(start, end);
            drop_if_empty(agent, object);
            adjusted
        }
        IndexedProperties::Sparse(handle) => {
            let adjusted = agent[handle].truncate(start, end);
            verify_if_enabled(agent, handle);
            let storage = &agent[handle];
            if storage.used() == 0 {
                free_sparse(agent, handle);
                object.set_indexed_properties(agent, IndexedProperties::None);
            } else {
                let max_index = storage.node_index(storage.last().unwrap());
                if max_index < MAX_COMPACT_INDEX
                    && should_be_compact(appropriate_capacity(max_index + 1), storage.used())
                {
                    let cell = convert_to_compact(agent, handle);
                    object.set_indexed_properties(agent, cell);
                }
            }
            adjusted
        }
        #[cfg(feature = "array-buffer")]
        IndexedProperties::ByteArray(_) | IndexedProperties::TypedArray(_) => end,
    }
}

/// Drop the whole storage.
pub fn clear(agent: &mut Agent, object: Object) {
    match object.indexed_properties(agent) {
        IndexedProperties::None => {}
        IndexedProperties::Compact(handle) => {
            free_compact(agent, handle);
            object.set_indexed_properties(agent, IndexedProperties::None);
        }
        IndexedProperties::Sparse(handle) => {
            free_sparse(agent, handle);
            object.set_indexed_properties(agent, IndexedProperties::None);
        }
        #[cfg(feature = "array-buffer")]
        IndexedProperties::ByteArray(_) | IndexedProperties::TypedArray(_) => {}
    }
}

/// Shift the entries in `[index, index + length)` by `delta`, moving the
/// stored slots wholesale. Storage that holds accessor slots moves them
/// as opaque values; use [`renumber_special`] when getters must run.
pub fn renumber(agent: &mut Agent, object: Object, index: u32, length: u32, delta: i64) {
    if delta == 0 || length == 0 {
        return;
    }
    match object.indexed_properties(agent) {
        IndexedProperties::None => {}
        IndexedProperties::Compact(handle) => {
            let handle = make_exclusive(agent, object, handle);
            if delta > 0 {
                let target_end = index as i64 + length as i64 + delta;
                let capacity = agent[handle].capacity();
                if target_end > capacity as i64 {
                    let go_sparse = target_end > MAX_COMPACT_INDEX as i64
                        || !should_grow_compact(
                            capacity,
                            appropriate_capacity(target_end as u32),
                        );
                    if go_sparse {
                        let cell = convert_to_sparse(agent, handle);
                        if let IndexedProperties::Sparse(sparse) = cell {
                            agent[sparse].renumber(index, length, delta);
                            verify_if_enabled(agent, sparse);
                        }
                        object.set_indexed_properties(agent, cell);
                        return;
                    }
                    agent[handle].grow_to_cover(target_end as u32 - 1);
                }
            }
            agent[handle].renumber(index, length, delta);
        }
        IndexedProperties::Sparse(handle) => {
            agent[handle].renumber(index, length, delta);
            verify_if_enabled(agent, handle);
        }
        #[cfg(feature = "array-buffer")]
        IndexedProperties::ByteArray(_) | IndexedProperties::TypedArray(_) => {}
    }
}

/// Shift the entries in `[index, index + length)` by `delta` while
/// observing accessors: each moved value is read through its getter and
/// re-stored through a put at the target index. Moves run
/// back-to-front for a positive delta and front-to-back for a negative
/// one so targets never collide with unprocessed sources. Returns
/// false when a read-only target rejected one of the moves.
pub fn renumber_special(
    agent: &mut Agent,
    object: Object,
    index: u32,
    length: u32,
    delta: i64,
) -> JsResult<bool> {
    if delta == 0 || length == 0 {
        return Ok(true);
    }
    let end = index.saturating_add(length);
    let mut iterator = iterator::IndexedPropertyIterator::new(object);
    let mut position = if delta > 0 {
        iterator.upper_bound(agent, end - 1)
    } else {
        iterator.lower_bound(agent, index)
    };
    let mut landed = true;
    while let Some(source) = position {
        if source < index || source >= end {
            break;
        }
        let value = iterator.get_value(agent)?;
        if let Some(value) = value {
            iterator.delete_value(agent);
            let target = (source as i64 + delta) as u32;
            landed &= put(agent, object, target, value)?;
            iterator.flush_cache();
        }
        position = if delta > 0 {
            iterator.previous(agent)
        } else {
            iterator.next(agent)
        };
    }
    Ok(landed)
}

/// After an own-storage renumber, fill the holes the prototype chain
/// can see: for every inherited index in `[index, index + length)`
/// whose shifted target is not an own property, the pre-shift value is
/// read from the chain (getters run against the holding prototype) and
/// stored at the target. A failed read leaves a fresh hole at the
/// target and propagates the failure. Runs after the own move so it
/// never overwrites a moved own entry.
pub fn renumber_from_prototype(
    agent: &mut Agent,
    object: Object,
    index: u32,
    length: u32,
    delta: i64,
) -> JsResult<()> {
    if delta == 0 || length == 0 {
        return Ok(());
    }
    let Some(prototype) = object.prototype(agent) else {
        return Ok(());
    };
    let end = index.saturating_add(length);
    let mut iterator = chain::ArrayPropertyIterator::new(agent, prototype);
    let mut position = iterator.lower_bound(agent, index);
    while let Some(source) = position {
        if source >= end {
            break;
        }
        let target = (source as i64 + delta) as u32;
        if !has_property(agent, object, target) {
            match iterator.get_value(agent) {
                Ok(value) => {
                    put_with_attributes(
                        agent,
                        object,
                        target,
                        PropertySlot::Data(value.unwrap_or(Value::Undefined)),
                        PropertyAttributes::default(),
                    );
                }
                Err(error) => {
                    put_with_attributes(
                        agent,
                        object,
                        target,
                        PropertySlot::Data(Value::Undefined),
                        PropertyAttributes::default(),
                    );
                    delete(agent, object, target);
                    return Err(error);
                }
            }
            iterator.flush_cache();
        }
        position = iterator.next(agent);
    }
    Ok(())
}

/// Full renumber as the array mutators need it: move the own entries
/// (observing accessors when the storage holds any), then materialize
/// the values the prototype chain contributed to the moved range.
/// Returns false when a read-only target rejected one of the moves.
pub fn renumber_for_array(
    agent: &mut Agent,
    object: Object,
    index: u32,
    length: u32,
    delta: i64,
) -> JsResult<bool> {
    let landed = if has_indexed_getters_or_setters(agent, object) {
        renumber_special(agent, object, index, length, delta)?
    } else {
        renumber(agent, object, index, length, delta);
        true
    };
    let mut chain_has_indexed = false;
    let mut link = object.prototype(agent);
    while let Some(prototype) = link {
        if has_indexed_properties(agent, prototype) {
            chain_has_indexed = true;
            break;
        }
        link = prototype.prototype(agent);
    }
    if chain_has_indexed {
        renumber_from_prototype(agent, object, index, length, delta)?;
    }
    Ok(landed)
}

/// Reverse the entries below `length` without running user code. The
/// caller has checked that the storage holds no accessors; the generic
/// read-swap-write loop handles those.
pub fn reverse(agent: &mut Agent, object: Object, length: u32) {
    debug_assert!(!has_indexed_getters_or_setters(agent, object));
    match object.indexed_properties(agent) {
        IndexedProperties::None => {}
        IndexedProperties::Compact(handle) => {
            let handle = make_exclusive(agent, object, handle);
            let storage = &mut agent[handle];
            for low in 0..length / 2 {
                let high = length - low - 1;
                let low_slot = storage.get(low);
                let low_attributes = storage.attributes(low);
                let high_slot = storage.get(high);
                let high_attributes = storage.attributes(high);
                if high_slot.is_present() {
                    storage.put_with_attributes(low, high_slot, high_attributes);
                } else if low_slot.is_present() {
                    storage.delete(low);
                }
                if low_slot.is_present() {
                    storage.put_with_attributes(high, low_slot, low_attributes);
                } else if high_slot.is_present() {
                    storage.delete(high);
                }
            }
        }
        IndexedProperties::Sparse(handle) => {
            // Rebuild with mirrored keys; entries at or above `length`
            // keep their positions.
            let storage = agent.heap.sparse_storages[handle.into_index()]
                .take()
                .expect("SparseStorage slot empty");
            let mut reversed = SparseStorage::new();
            storage.for_each_present(|index, slot, attributes| {
                let new_index = if index < length {
                    length - index - 1
                } else {
                    index
                };
                reversed.insert(new_index, slot, attributes);
            });
            let new_handle = agent.heap.create(reversed);
            object.set_indexed_properties(agent, IndexedProperties::Sparse(new_handle));
            verify_if_enabled(agent, new_handle);
        }
        #[cfg(feature = "array-buffer")]
        IndexedProperties::ByteArray(buffer) => {
            if let Some(block) = agent[buffer].data.as_mut() {
                let mut low = 0;
                let mut high = block.len();
                while low + 1 < high {
                    high -= 1;
                    let low_byte = block.get::<u8>(low).unwrap();
                    let high_byte = block.get::<u8>(high).unwrap();
                    block.set::<u8>(low, high_byte);
                    block.set::<u8>(high, low_byte);
                    low += 1;
                }
            }
        }
        #[cfg(feature = "array-buffer")]
        IndexedProperties::TypedArray(view) => {
            crate::ecmascript::builtins::typed_array::typed_array_reverse(agent, view);
        }
    }
}

pub fn get_used(agent: &Agent, object: Object) -> u32 {
    match object.indexed_properties(agent) {
        IndexedProperties::None => 0,
        IndexedProperties::Compact(handle) => agent[handle].get_used(),
        IndexedProperties::Sparse(handle) => agent[handle].used(),
        #[cfg(feature = "array-buffer")]
        IndexedProperties::ByteArray(buffer) => {
            agent[buffer].data.as_ref().map_or(0, |block| block.len())
        }
        #[cfg(feature = "array-buffer")]
        IndexedProperties::TypedArray(view) => agent[view].array_length,
    }
}

/// True if any present index is strictly below `limit`.
pub fn has_used(agent: &Agent, object: Object, limit: u32) -> bool {
    match object.indexed_properties(agent) {
        IndexedProperties::None => false,
        IndexedProperties::Compact(handle) => agent[handle].has_used(limit),
        IndexedProperties::Sparse(handle) => {
            let storage = &agent[handle];
            storage
                .first()
                .is_some_and(|node| storage.node_index(node) < limit)
        }
        #[cfg(feature = "array-buffer")]
        IndexedProperties::ByteArray(_) | IndexedProperties::TypedArray(_) => {
            limit > 0 && get_used(agent, object) > 0
        }
    }
}

pub fn capacity(agent: &Agent, object: Object) -> u32 {
    match object.indexed_properties(agent) {
        IndexedProperties::None => 0,
        IndexedProperties::Compact(handle) => agent[handle].capacity(),
        IndexedProperties::Sparse(handle) => agent[handle].used(),
        #[cfg(feature = "array-buffer")]
        IndexedProperties::ByteArray(_) | IndexedProperties::TypedArray(_) => {
            get_used(agent, object)
        }
    }
}

/// One past the highest present index.
pub fn top(agent: &Agent, object: Object) -> u32 {
    match object.indexed_properties(agent) {
        IndexedProperties::None => 0,
        IndexedProperties::Compact(handle) => agent[handle].top(),
        IndexedProperties::Sparse(handle) => {
            let storage = &agent[handle];
            storage
                .last()
                .map_or(0, |node| storage.node_index(node) + 1)
        }
        #[cfg(feature = "array-buffer")]
        IndexedProperties::ByteArray(_) | IndexedProperties::TypedArray(_) => {
            get_used(agent, object)
        }
    }
}

pub fn has_indexed_properties(agent: &Agent, object: Object) -> bool {
    !object.indexed_properties(agent).is_none()
}

pub fn has_indexed_getters_or_setters(agent: &Agent, object: Object) -> bool {
    match object.indexed_properties(agent) {
        IndexedProperties::Compact(handle) => agent[handle].has_special(),
        IndexedProperties::Sparse(handle) => agent[handle].has_special(),
        _ => false,
    }
}

pub fn has_read_only_properties(agent: &Agent, object: Object) -> bool {
    match object.indexed_properties(agent) {
        IndexedProperties::Compact(handle) => agent[handle].has_read_only(),
        IndexedProperties::Sparse(handle) => agent[handle].has_read_only(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::types::ObjectHeapData;

    fn new_object(agent: &mut Agent) -> Object {
        Object::Object(agent.heap.create(ObjectHeapData::default()))
    }

    #[test]
    fn first_write_picks_representation_by_index() {
        let mut agent = Agent::default();
        let small = new_object(&mut agent);
        put(&mut agent, small, 3, Value::Integer(1)).unwrap();
        assert!(matches!(
            small.indexed_properties(&agent),
            IndexedProperties::Compact(_)
        ));

        let large = new_object(&mut agent);
        put(&mut agent, large, 100000, Value::Integer(2)).unwrap();
        assert!(matches!(
            large.indexed_properties(&agent),
            IndexedProperties::Sparse(_)
        ));
        assert_eq!(
            get(&mut agent, large, 100000).unwrap(),
            Some(Value::Integer(2))
        );
    }

    #[test]
    fn wasteful_growth_converts_to_sparse() {
        let mut agent = Agent::default();
        let object = new_object(&mut agent);
        put(&mut agent, object, 0, Value::Integer(10)).unwrap();
        put(&mut agent, object, 1, Value::Integer(11)).unwrap();
        put(&mut agent, object, 1000000, Value::Integer(12)).unwrap();
        assert!(matches!(
            object.indexed_properties(&agent),
            IndexedProperties::Sparse(_)
        ));
        assert_eq!(
            get(&mut agent, object, 0).unwrap(),
            Some(Value::Integer(10))
        );
        assert_eq!(
            get(&mut agent, object, 1000000).unwrap(),
            Some(Value::Integer(12))
        );
        assert_eq!(get(&mut agent, object, 2).unwrap(), None);
    }

    #[test]
    fn dense_fill_of_sparse_promotes_to_compact() {
        let mut agent = Agent::default();
        let object = new_object(&mut agent);
        put(&mut agent, object, 400, Value::Integer(0)).unwrap();
        assert!(matches!(
            object.indexed_properties(&agent),
            IndexedProperties::Sparse(_)
        ));
        for index in 0..400 {
            put(&mut agent, object, index, Value::Integer(index as i32)).unwrap();
        }
        assert!(matches!(
            object.indexed_properties(&agent),
            IndexedProperties::Compact(_)
        ));
        for index in 0..=400 {
            assert!(has_property(&agent, object, index), "missing {index}");
        }
    }

    #[test]
    fn copy_on_write_isolates_sharers() {
        let mut agent = Agent::default();
        let original = new_object(&mut agent);
        put(&mut agent, original, 0, Value::Integer(1)).unwrap();
        put(&mut agent, original, 1, Value::Integer(2)).unwrap();

        let clone = new_object(&mut agent);
        let shared = share(&mut agent, original);
        clone.set_indexed_properties(&mut agent, shared);
        assert_eq!(
            original.indexed_properties(&agent),
            clone.indexed_properties(&agent)
        );

        put(&mut agent, clone, 0, Value::Integer(99)).unwrap();
        assert_ne!(
            original.indexed_properties(&agent),
            clone.indexed_properties(&agent)
        );
        assert_eq!(
            get(&mut agent, original, 0).unwrap(),
            Some(Value::Integer(1))
        );
        assert_eq!(get(&mut agent, clone, 0).unwrap(), Some(Value::Integer(99)));
        assert_eq!(get(&mut agent, clone, 1).unwrap(), Some(Value::Integer(2)));
    }

    #[test]
    fn read_only_rejects_put() {
        let mut agent = Agent::default();
        let object = new_object(&mut agent);
        put_with_attributes(
            &mut agent,
            object,
            0,
            PropertySlot::Data(Value::Integer(1)),
            PropertyAttributes::new(PropertyAttributes::READ_ONLY),
        );
        assert!(!put(&mut agent, object, 0, Value::Integer(2)).unwrap());
        assert_eq!(get(&mut agent, object, 0).unwrap(), Some(Value::Integer(1)));
    }

    #[test]
    fn deleting_last_entry_drops_storage() {
        let mut agent = Agent::default();
        let object = new_object(&mut agent);
        put(&mut agent, object, 5, Value::Integer(1)).unwrap();
        assert!(delete(&mut agent, object, 5));
        assert!(object.indexed_properties(&agent).is_none());
    }

    #[test]
    fn explicit_undefined_is_present() {
        let mut agent = Agent::default();
        let object = new_object(&mut agent);
        put(&mut agent, object, 1, Value::Undefined).unwrap();
        assert!(has_property(&agent, object, 1));
        assert_eq!(get(&mut agent, object, 1).unwrap(), Some(Value::Undefined));
        assert_eq!(get(&mut agent, object, 0).unwrap(), None);
    }

    #[test]
    fn truncate_respects_dont_delete_across_representations() {
        let mut agent = Agent::default();
        let object = new_object(&mut agent);
        for index in 0..10 {
            put(&mut agent, object, index, Value::Integer(index as i32)).unwrap();
        }
        change_attribute(
            &mut agent,
            object,
            6,
            PropertyAttributes::new(PropertyAttributes::DONT_DELETE),
        );
        assert_eq!(truncate(&mut agent, object, 2, 10), 7);
        assert!(has_property(&agent, object, 6));
        assert!(!has_property(&agent, object, 7));
        assert!(has_property(&agent, object, 1));
    }

    #[test]
    fn renumber_round_trip() {
        let mut agent = Agent::default();
        let object = new_object(&mut agent);
        for index in 0..4 {
            put(&mut agent, object, index, Value::Integer(index as i32 * 10)).unwrap();
        }
        renumber(&mut agent, object, 0, 4, 2);
        assert_eq!(get(&mut agent, object, 0).unwrap(), None);
        assert_eq!(get(&mut agent, object, 2).unwrap(), Some(Value::Integer(0)));
        renumber(&mut agent, object, 2, 4, -2);
        for index in 0..4 {
            assert_eq!(
                get(&mut agent, object, index).unwrap(),
                Some(Value::Integer(index as i32 * 10))
            );
        }
    }
}
