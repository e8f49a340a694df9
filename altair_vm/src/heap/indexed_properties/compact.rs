// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::slot::{AttributeArray, PropertyAttributes, PropertySlot};

/// Smallest capacity a compact store is ever allocated with.
pub const MIN_COMPACT_CAPACITY: u32 = 4;

/// Storages at or below this capacity always stay compact, regardless of
/// how sparsely they are used.
pub const ALWAYS_COMPACT_LIMIT: u32 = 256;

/// Above [`ALWAYS_COMPACT_LIMIT`], a storage stays compact only while
/// `capacity / used` is strictly below this level.
pub const COMPACT_USAGE_LEVEL: u32 = 2;

/// Capacity at which growth starts sampling occupancy density before
/// committing to a larger dense allocation.
pub const DENSITY_SAMPLING_CAPACITY: u32 = 131072;

/// Indices at or above this never get dense storage; a dense allocation
/// covering them would be absurd even when fully used.
pub const MAX_COMPACT_INDEX: u32 = i32::MAX as u32;

/// Capacity to allocate for a store that must hold `needed` slots: at
/// least the minimum, rounded up to a power of two.
pub const fn appropriate_capacity(needed: u32) -> u32 {
    let capacity = needed.next_power_of_two();
    if capacity < MIN_COMPACT_CAPACITY {
        MIN_COMPACT_CAPACITY
    } else {
        capacity
    }
}

/// Growth policy: growing from `old_capacity` to `new_capacity` keeps the
/// storage compact when the target is small, or when it is at most a
/// doubling of the current allocation.
pub fn should_grow_compact(old_capacity: u32, new_capacity: u32) -> bool {
    new_capacity <= ALWAYS_COMPACT_LIMIT || new_capacity as u64 <= old_capacity as u64 * 2
}

/// Demotion/promotion policy shared by sparse-to-compact conversion and
/// truncation: a storage of `capacity` slots with `used` present entries
/// deserves the dense representation.
pub fn should_be_compact(capacity: u32, used: u32) -> bool {
    capacity <= ALWAYS_COMPACT_LIMIT || (used != 0 && capacity / used < COMPACT_USAGE_LEVEL)
}

/// Dense array-backed indexed property storage.
///
/// Slots above `top` are guaranteed holes. The attribute side-array is
/// allocated only once some entry carries non-default attributes.
#[derive(Debug, PartialEq)]
pub struct CompactStorage {
    slots: Vec<PropertySlot>,
    attributes: Option<AttributeArray>,
    /// One past the highest present index.
    top: u32,
    /// Physically shared with another owner; mutation must clone first.
    needs_copy_on_write: bool,
    /// Some slot holds or has held an accessor pair.
    has_special: bool,
    /// Some entry carries or has carried the read-only attribute.
    has_read_only: bool,
}

impl Clone for CompactStorage {
    /// Cloning produces an exclusively owned storage; the copy-on-write
    /// mark never travels with the copy.
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            attributes: self.attributes.clone(),
            top: self.top,
            needs_copy_on_write: false,
            has_special: self.has_special,
            has_read_only: self.has_read_only,
        }
    }
}

impl CompactStorage {
    pub fn new(minimum_capacity: u32) -> Self {
        let capacity = appropriate_capacity(minimum_capacity);
        Self {
            slots: vec![PropertySlot::Hole; capacity as usize],
            attributes: None,
            top: 0,
            needs_copy_on_write: false,
            has_special: false,
            has_read_only: false,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn top(&self) -> u32 {
        self.top
    }

    pub fn is_shared(&self) -> bool {
        self.needs_copy_on_write
    }

    pub fn mark_shared(&mut self) {
        self.needs_copy_on_write = true;
    }

    pub fn has_special(&self) -> bool {
        self.has_special
    }

    pub fn has_read_only(&self) -> bool {
        self.has_read_only
    }

    pub fn has_attributes(&self) -> bool {
        self.attributes.is_some()
    }

    pub fn get(&self, index: u32) -> PropertySlot {
        if index < self.top {
            self.slots[index as usize]
        } else {
            PropertySlot::Hole
        }
    }

    pub fn attributes(&self, index: u32) -> PropertyAttributes {
        match &self.attributes {
            Some(array) if index < self.top => array.get(index),
            _ => PropertyAttributes::default(),
        }
    }

    pub fn has_property(&self, index: u32) -> bool {
        index < self.top && self.slots[index as usize].is_present()
    }

    /// Number of present slots. Compact storage does not track this
    /// incrementally; callers that need it pay for the walk.
    pub fn get_used(&self) -> u32 {
        self.slots[..self.top as usize]
            .iter()
            .filter(|slot| slot.is_present())
            .count() as u32
    }

    /// True if any present index is strictly below `limit`.
    pub fn has_used(&self, limit: u32) -> bool {
        let end = limit.min(self.top) as usize;
        self.slots[..end].iter().any(|slot| slot.is_present())
    }

    /// Write a slot at an index already covered by the allocation.
    /// The caller has made the storage exclusive and grown it as needed.
    pub fn put(&mut self, index: u32, slot: PropertySlot) {
        debug_assert!(!self.needs_copy_on_write);
        debug_assert!(index < self.capacity());
        if matches!(slot, PropertySlot::Accessor(_)) {
            self.has_special = true;
        }
        self.slots[index as usize] = slot;
        if index >= self.top {
            self.top = index + 1;
        }
    }

    pub fn put_with_attributes(
        &mut self,
        index: u32,
        slot: PropertySlot,
        attributes: PropertyAttributes,
    ) {
        self.put(index, slot);
        self.set_attributes(index, attributes);
    }

    pub fn set_attributes(&mut self, index: u32, attributes: PropertyAttributes) {
        debug_assert!(!self.needs_copy_on_write);
        if attributes.is_default() && self.attributes.is_none() {
            return;
        }
        if attributes.is_read_only() {
            self.has_read_only = true;
        }
        let capacity = self.capacity();
        self.attributes
            .get_or_insert_with(|| AttributeArray::with_capacity(capacity))
            .set(index, attributes);
    }

    /// Dense append fast path: the index extends the storage by exactly
    /// one and nothing in the storage needs the slow path.
    pub fn put_simple_new(&mut self, index: u32, slot: PropertySlot) {
        debug_assert!(!self.needs_copy_on_write);
        debug_assert!(index == self.top && index < self.capacity());
        debug_assert!(matches!(slot, PropertySlot::Data(_)));
        self.slots[index as usize] = slot;
        self.top = index + 1;
    }

    /// Remove the entry at `index`. Returns false when a dont-delete
    /// attribute blocks removal. May halve the allocation when the
    /// deletion empties the upper half.
    pub fn delete(&mut self, index: u32) -> bool {
        debug_assert!(!self.needs_copy_on_write);
        if index >= self.top || self.slots[index as usize].is_hole() {
            return true;
        }
        if self.attributes(index).is_dont_delete() {
            return false;
        }
        self.slots[index as usize] = PropertySlot::Hole;
        if let Some(array) = &mut self.attributes {
            array.set(index, PropertyAttributes::default());
        }
        self.lower_top();
        let capacity = self.capacity();
        if capacity > ALWAYS_COMPACT_LIMIT
            && index == capacity / 2
            && !self.slots[(capacity / 2) as usize..]
                .iter()
                .any(|slot| slot.is_present())
        {
            self.resize_capacity(capacity / 2);
        }
        true
    }

    /// Remove all deletable entries in `[start, end)`, scanning downward.
    /// Returns the adjusted end: `start` if everything went, otherwise one
    /// past the highest surviving dont-delete entry.
    pub fn truncate(&mut self, start: u32, end: u32) -> u32 {
        debug_assert!(!self.needs_copy_on_write);
        let end = end.min(self.top);
        let mut index = end;
        while index > start {
            index -= 1;
            if self.slots[index as usize].is_present() && self.attributes(index).is_dont_delete() {
                self.lower_top();
                return index + 1;
            }
            self.slots[index as usize] = PropertySlot::Hole;
            if let Some(array) = &mut self.attributes {
                array.set(index, PropertyAttributes::default());
            }
        }
        self.lower_top();
        start
    }

    /// Shift the entries in `[index, index + length)` by `delta`. The
    /// caller guarantees the target range fits the allocation and does not
    /// collide with untouched present entries.
    pub fn renumber(&mut self, index: u32, length: u32, delta: i64) {
        debug_assert!(!self.needs_copy_on_write);
        if delta == 0 || length == 0 {
            return;
        }
        let length = length.min(self.top.saturating_sub(index));
        if length == 0 {
            return;
        }
        let target = (index as i64 + delta) as u32;
        debug_assert!((target as u64 + length as u64) <= self.capacity() as u64);
        if delta < 0 {
            for offset in 0..length {
                self.move_slot(index + offset, target + offset);
            }
            // Clear whatever the move uncovered at the high end.
            let vacated_start = (target + length).max(index);
            for i in vacated_start..index + length {
                self.clear_slot(i);
            }
        } else {
            for offset in (0..length).rev() {
                self.move_slot(index + offset, target + offset);
            }
            let vacated_end = target.min(index + length);
            for i in index..vacated_end {
                self.clear_slot(i);
            }
        }
        self.recompute_top();
        // Shifting down may leave the upper half of a large allocation
        // unused; reclaim it.
        if delta < 0 {
            let capacity = self.capacity();
            if capacity > ALWAYS_COMPACT_LIMIT
                && self.top <= capacity / 2
                && capacity / 2 >= MIN_COMPACT_CAPACITY
            {
                self.resize_capacity(appropriate_capacity(self.top));
            }
        }
    }

    /// Grow the allocation in place to cover `index`. The caller has
    /// already decided growth (rather than a sparse conversion) is right.
    pub fn grow_to_cover(&mut self, index: u32) {
        debug_assert!(!self.needs_copy_on_write);
        let needed = appropriate_capacity(index.checked_add(1).unwrap());
        if needed > self.capacity() {
            self.resize_capacity(needed);
        }
    }

    /// Occupancy sampling for very large storages: probe 16 evenly spaced
    /// slots of every 1024-slot window; the storage is too sparse to keep
    /// growing densely when fewer than a quarter of the probes hit.
    pub fn is_too_sparse_by_sampling(&self) -> bool {
        debug_assert!(self.capacity() >= DENSITY_SAMPLING_CAPACITY);
        let mut searched = 0u32;
        let mut found = 0u32;
        let mut window = 0u32;
        while window < self.top {
            let mut probe = window;
            let end = (window + 1024).min(self.top);
            while probe < end {
                searched += 1;
                if self.slots[probe as usize].is_present() {
                    found += 1;
                }
                probe += 64;
            }
            window += 1024;
        }
        found * 4 < searched
    }

    /// Visit every present entry in ascending index order.
    pub fn for_each_present(&self, mut f: impl FnMut(u32, PropertySlot, PropertyAttributes)) {
        for index in 0..self.top {
            let slot = self.slots[index as usize];
            if slot.is_present() {
                f(index, slot, self.attributes(index));
            }
        }
    }

    pub fn clear(&mut self) {
        debug_assert!(!self.needs_copy_on_write);
        self.slots.fill(PropertySlot::Hole);
        self.attributes = None;
        self.top = 0;
    }

    fn move_slot(&mut self, from: u32, to: u32) {
        self.slots[to as usize] = self.slots[from as usize];
        if let Some(array) = &mut self.attributes {
            let attributes = array.get(from);
            array.set(to, attributes);
        }
    }

    fn clear_slot(&mut self, index: u32) {
        self.slots[index as usize] = PropertySlot::Hole;
        if let Some(array) = &mut self.attributes {
            array.set(index, PropertyAttributes::default());
        }
    }

    fn lower_top(&mut self) {
        while self.top > 0 && self.slots[self.top as usize - 1].is_hole() {
            self.top -= 1;
        }
    }

    fn recompute_top(&mut self) {
        self.top = self.capacity();
        self.lower_top();
    }

    fn resize_capacity(&mut self, capacity: u32) {
        let capacity = capacity.max(appropriate_capacity(self.top));
        self.slots.resize(capacity as usize, PropertySlot::Hole);
        self.slots.shrink_to_fit();
        if let Some(array) = &mut self.attributes {
            array.resize(capacity);
        }
    }
}
