// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod indexed_properties;
pub mod indexes;

use std::ops::{Index, IndexMut};

#[cfg(feature = "array-buffer")]
use crate::ecmascript::builtins::{
    array_buffer::ArrayBufferHeapData, data_view::DataViewHeapData, typed_array::TypedArrayHeapData,
};
use crate::ecmascript::{
    builtins::{
        accessor::AccessorHeapData, array::ArrayHeapData,
        builtin_function::BuiltinFunctionHeapData, error::ErrorHeapData,
    },
    execution::Agent,
    types::{ObjectHeapData, StringHeapData, Value},
};
#[cfg(feature = "array-buffer")]
use indexes::{ArrayBufferIndex, DataViewIndex, TypedArrayIndex};
use indexed_properties::{compact::CompactStorage, sparse::SparseStorage};
use indexes::{
    AccessorIndex, ArrayIndex, CompactStorageIndex, NumberHeapData, NumberIndex, ObjectIndex,
    SparseStorageIndex, StringIndex,
};

/// Arena-allocated engine heap. Handles are typed indexes into the
/// per-type vectors; slots are `Option` so a future collector can free
/// them without reshuffling live indexes.
#[derive(Debug, Default)]
pub struct Heap {
    pub accessors: Vec<Option<AccessorHeapData>>,
    #[cfg(feature = "array-buffer")]
    pub array_buffers: Vec<Option<ArrayBufferHeapData>>,
    pub arrays: Vec<Option<ArrayHeapData>>,
    pub builtin_functions: Vec<Option<BuiltinFunctionHeapData>>,
    pub compact_storages: Vec<Option<CompactStorage>>,
    #[cfg(feature = "array-buffer")]
    pub data_views: Vec<Option<DataViewHeapData>>,
    pub errors: Vec<Option<ErrorHeapData>>,
    pub numbers: Vec<Option<NumberHeapData>>,
    pub objects: Vec<Option<ObjectHeapData>>,
    pub sparse_storages: Vec<Option<SparseStorage>>,
    pub strings: Vec<Option<StringHeapData>>,
    #[cfg(feature = "array-buffer")]
    pub typed_arrays: Vec<Option<TypedArrayHeapData>>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_string(&mut self, message: &str) -> Value {
        Value::String(self.create(StringHeapData::from_str(message)))
    }

    pub fn alloc_number(&mut self, number: f64) -> Value {
        self.create(NumberHeapData::new(number))
    }
}

pub trait CreateHeapData<T, F> {
    /// Creates a [`Value`] from the given data. Allocating the data is
    /// **infallible**.
    fn create(&mut self, data: T) -> F;
}

macro_rules! impl_heap_arena {
    ($name: literal, $data: ty, $index: ty, $field: ident) => {
        impl Index<$index> for Agent {
            type Output = $data;

            fn index(&self, index: $index) -> &Self::Output {
                &self.heap.$field[index]
            }
        }

        impl IndexMut<$index> for Agent {
            fn index_mut(&mut self, index: $index) -> &mut Self::Output {
                &mut self.heap.$field[index]
            }
        }

        impl Index<$index> for Vec<Option<$data>> {
            type Output = $data;

            fn index(&self, index: $index) -> &Self::Output {
                self.get(index.into_index())
                    .expect(concat!($name, " out of bounds"))
                    .as_ref()
                    .expect(concat!($name, " slot empty"))
            }
        }

        impl IndexMut<$index> for Vec<Option<$data>> {
            fn index_mut(&mut self, index: $index) -> &mut Self::Output {
                self.get_mut(index.into_index())
                    .expect(concat!($name, " out of bounds"))
                    .as_mut()
                    .expect(concat!($name, " slot empty"))
            }
        }
    };
}

impl_heap_arena!("Accessor", AccessorHeapData, AccessorIndex, accessors);
#[cfg(feature = "array-buffer")]
impl_heap_arena!(
    "ArrayBuffer",
    ArrayBufferHeapData,
    ArrayBufferIndex,
    array_buffers
);
impl_heap_arena!("Array", ArrayHeapData, ArrayIndex, arrays);
impl_heap_arena!(
    "CompactStorage",
    CompactStorage,
    CompactStorageIndex,
    compact_storages
);
#[cfg(feature = "array-buffer")]
impl_heap_arena!("DataView", DataViewHeapData, DataViewIndex, data_views);
impl_heap_arena!("Number", NumberHeapData, NumberIndex, numbers);
impl_heap_arena!("Object", ObjectHeapData, ObjectIndex, objects);
impl_heap_arena!(
    "SparseStorage",
    SparseStorage,
    SparseStorageIndex,
    sparse_storages
);
impl_heap_arena!("String", StringHeapData, StringIndex, strings);
#[cfg(feature = "array-buffer")]
impl_heap_arena!("TypedArray", TypedArrayHeapData, TypedArrayIndex, typed_arrays);

impl CreateHeapData<StringHeapData, StringIndex> for Heap {
    fn create(&mut self, data: StringHeapData) -> StringIndex {
        self.strings.push(Some(data));
        StringIndex::last(&self.strings)
    }
}

impl CreateHeapData<NumberHeapData, Value> for Heap {
    fn create(&mut self, data: NumberHeapData) -> Value {
        self.numbers.push(Some(data));
        Value::Number(NumberIndex::last(&self.numbers))
    }
}

impl CreateHeapData<ObjectHeapData, ObjectIndex> for Heap {
    fn create(&mut self, data: ObjectHeapData) -> ObjectIndex {
        self.objects.push(Some(data));
        ObjectIndex::last(&self.objects)
    }
}

impl CreateHeapData<CompactStorage, CompactStorageIndex> for Heap {
    fn create(&mut self, data: CompactStorage) -> CompactStorageIndex {
        self.compact_storages.push(Some(data));
        CompactStorageIndex::last(&self.compact_storages)
    }
}

impl CreateHeapData<SparseStorage, SparseStorageIndex> for Heap {
    fn create(&mut self, data: SparseStorage) -> SparseStorageIndex {
        self.sparse_storages.push(Some(data));
        SparseStorageIndex::last(&self.sparse_storages)
    }
}
