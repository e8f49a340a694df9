// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::{builtins::accessor::Accessor, types::Value};

/// A single indexed property slot.
///
/// `Hole` means the index is absent from the storage even though the
/// backing store has capacity for it. This is distinct from a present
/// property whose value is `undefined`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PropertySlot {
    #[default]
    Hole,
    Data(Value),
    Accessor(Accessor),
}

const _SLOT_IS_SMALL: () = assert!(size_of::<PropertySlot>() <= 16);

impl PropertySlot {
    #[inline]
    pub fn is_hole(self) -> bool {
        matches!(self, PropertySlot::Hole)
    }

    #[inline]
    pub fn is_present(self) -> bool {
        !self.is_hole()
    }

    /// Returns the stored value of a data slot, or None for holes and
    /// accessor slots.
    #[inline]
    pub fn data_value(self) -> Option<Value> {
        match self {
            PropertySlot::Data(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn accessor(self) -> Option<Accessor> {
        match self {
            PropertySlot::Accessor(accessor) => Some(accessor),
            _ => None,
        }
    }
}

/// Per-property attribute bits, matching the classic ECMAScript
/// attribute triple in its negative formulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyAttributes(u8);

impl PropertyAttributes {
    pub const READ_ONLY: u8 = 0b001;
    pub const DONT_ENUM: u8 = 0b010;
    pub const DONT_DELETE: u8 = 0b100;

    /// Width of one packed attribute entry in an attribute word.
    pub const BITS: u32 = 3;
    /// Entries stored per packed u32 word.
    pub const PER_WORD: u32 = 10;
    pub const MASK: u32 = 0b111;

    pub const fn new(bits: u8) -> Self {
        Self(bits & 0b111)
    }

    pub const fn writable_enumerable_configurable() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_read_only(self) -> bool {
        self.0 & Self::READ_ONLY != 0
    }

    pub const fn is_dont_enum(self) -> bool {
        self.0 & Self::DONT_ENUM != 0
    }

    pub const fn is_dont_delete(self) -> bool {
        self.0 & Self::DONT_DELETE != 0
    }

    pub const fn is_default(self) -> bool {
        self.0 == 0
    }
}

/// Packed attribute words for a compact store. Allocated lazily: storages
/// whose every property carries default attributes have no word array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeArray {
    words: Vec<u32>,
}

impl AttributeArray {
    pub fn with_capacity(indices: u32) -> Self {
        Self {
            words: vec![0; Self::word_count(indices)],
        }
    }

    fn word_count(indices: u32) -> usize {
        indices.div_ceil(PropertyAttributes::PER_WORD) as usize
    }

    pub fn resize(&mut self, indices: u32) {
        self.words.resize(Self::word_count(indices), 0);
    }

    pub fn get(&self, index: u32) -> PropertyAttributes {
        let word = (index / PropertyAttributes::PER_WORD) as usize;
        let shift = (index % PropertyAttributes::PER_WORD) * PropertyAttributes::BITS;
        let bits = self
            .words
            .get(word)
            .map_or(0, |w| (w >> shift) & PropertyAttributes::MASK);
        PropertyAttributes::new(bits as u8)
    }

    pub fn set(&mut self, index: u32, attributes: PropertyAttributes) {
        let word = (index / PropertyAttributes::PER_WORD) as usize;
        let shift = (index % PropertyAttributes::PER_WORD) * PropertyAttributes::BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let w = &mut self.words[word];
        *w = (*w & !(PropertyAttributes::MASK << shift))
            | ((attributes.bits() as u32 & PropertyAttributes::MASK) << shift);
    }

    /// True if every packed entry is the default attribute set.
    pub fn is_all_default(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hole_is_not_present() {
        assert!(PropertySlot::Hole.is_hole());
        assert!(PropertySlot::Data(Value::Undefined).is_present());
        assert_eq!(
            PropertySlot::Data(Value::Undefined).data_value(),
            Some(Value::Undefined)
        );
        assert_eq!(PropertySlot::Hole.data_value(), None);
    }

    #[test]
    fn attribute_packing_round_trips() {
        let mut array = AttributeArray::with_capacity(32);
        array.set(0, PropertyAttributes::new(PropertyAttributes::READ_ONLY));
        array.set(9, PropertyAttributes::new(PropertyAttributes::DONT_ENUM));
        array.set(
            10,
            PropertyAttributes::new(PropertyAttributes::DONT_DELETE | PropertyAttributes::READ_ONLY),
        );
        array.set(31, PropertyAttributes::new(0b111));
        assert!(array.get(0).is_read_only());
        assert!(!array.get(0).is_dont_enum());
        assert!(array.get(9).is_dont_enum());
        assert!(array.get(10).is_dont_delete());
        assert!(array.get(10).is_read_only());
        assert_eq!(array.get(31).bits(), 0b111);
        assert!(array.get(5).is_default());
        assert!(!array.is_all_default());
    }

    #[test]
    fn attribute_array_grows_on_set() {
        let mut array = AttributeArray::default();
        assert!(array.get(100).is_default());
        array.set(100, PropertyAttributes::new(PropertyAttributes::DONT_ENUM));
        assert!(array.get(100).is_dont_enum());
        assert!(array.get(99).is_default());
    }
}
